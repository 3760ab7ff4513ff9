use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use studykit::analyzer;
use studykit::directive::path_to_lib_name;
use studykit::export::{ExportOptions, Exporter};

#[derive(Parser)]
#[command(name = "studykit")]
#[command(version = "0.1.0")]
#[command(about = "JavaScript source analyzer and library/web-page exporter", long_about = None)]
struct Cli {
    /// Directory holding the built-in libraries (exp_lib) and the
    /// injection helper script
    #[arg(long, default_value = ".", global = true)]
    resources: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the structure of a source file
    Analyze {
        file: PathBuf,

        /// Emit the full analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check that every declared dependency of a file (or of every
    /// script under a directory) is readable
    Check { path: PathBuf },
    /// Wrap a source file as a reusable library module
    ExportLib {
        file: PathBuf,

        /// Namespace for the generated module (defaults to a name
        /// inferred from the file name)
        #[arg(short, long)]
        namespace: Option<String>,

        /// Output path (defaults to <stem>.lib.js next to the source)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Inline @use dependencies into the module
        #[arg(long)]
        include_use: bool,
    },
    /// Assemble a runnable web page from a source file
    ExportPage {
        file: PathBuf,

        /// Output directory for index.html and copied assets
        #[arg(short, long)]
        out_dir: PathBuf,

        /// Prepend the instrumentation helper script
        #[arg(long)]
        inject: bool,

        /// Treat the source as an unsaved buffer: resolve dependencies
        /// only against the built-in library directory
        #[arg(long)]
        ephemeral: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut exporter = Exporter::new(&cli.resources);

    match cli.command {
        Commands::Analyze { file, json } => {
            let source = read_source(&file)?;
            let analysis = analyzer::analyze(&source);
            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                if !analysis.success {
                    println!("(source has syntax errors; structure is best-effort)");
                }
                println!("functions: {}", analysis.function_spans.len());
                println!("if chains: {}", analysis.if_spans.len());
                println!("for loops: {}", analysis.for_spans.len());
                println!("declared names: {}", analysis.declared_names.join(", "));
            }
        }
        Commands::Check { path } => {
            if path.is_dir() {
                let results = exporter.check_directory(&path);
                let mut failures = 0;
                for (file, outcome) in &results {
                    match outcome {
                        Ok(()) => println!("ok      {}", file.display()),
                        Err(missing) => {
                            failures += 1;
                            println!("missing {} (needs {})", file.display(), missing);
                        }
                    }
                }
                if failures > 0 {
                    bail!("{failures} of {} files have unreadable dependencies", results.len());
                }
            } else {
                let source = read_source(&path)?;
                if let Err(missing) = exporter.check_library_readable(&source, Some(&path)) {
                    bail!("cannot read dependency: {missing}");
                }
                println!("all dependencies readable");
            }
        }
        Commands::ExportLib {
            file,
            namespace,
            out,
            include_use,
        } => {
            let source = read_source(&file)?;
            let analysis = analyzer::analyze(&source);
            let namespace = namespace
                .unwrap_or_else(|| path_to_lib_name(&file.to_string_lossy()));
            let out = out.unwrap_or_else(|| file.with_extension("lib.js"));
            let options = ExportOptions {
                include_used_declarations: include_use,
                ..Default::default()
            };
            let written = exporter.export_as_library(&source, &out, &namespace, &analysis, options)?;
            println!("exported library to {}", written.display());
        }
        Commands::ExportPage {
            file,
            out_dir,
            inject,
            ephemeral,
        } => {
            let source = read_source(&file)?;
            let source_path = if ephemeral { None } else { Some(file.as_path()) };
            let options = ExportOptions {
                inject_helper: inject,
                ..Default::default()
            };
            let written = exporter.export_as_web_page(&source, source_path, &out_dir, options)?;
            println!(
                "exported web page to {} (user code at offset {})",
                written.display(),
                exporter.user_code_offset()
            );
        }
    }

    Ok(())
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
