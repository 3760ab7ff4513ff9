//! Export engine for Studykit.
//!
//! Turns a user script and its declared dependencies into one of two
//! artifacts:
//!
//! - a **library module** (`.lib.js`): the source wrapped in a
//!   namespaced self-invoking factory exposing its declared names;
//! - a **web page**: an `index.html` referencing every resolved
//!   dependency and inlining the source.
//!
//! Dependencies are declared with `@use`/`@need`/`@import` comment
//! directives (see [`crate::directive`]). Paths resolve first next to
//! the source file, then under the built-in library directory
//! (`exp_lib/`) inside the exporter's resource directory.
//!
//! All failures come back as values: the first unresolvable path, a
//! remote library that cannot be wrapped, or the write that failed. No
//! operation panics or raises across the module boundary.

pub mod fsops;
pub mod library;
pub(crate) mod webpage;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::analyzer::{analyze, Analysis};
use crate::directive::{extract_directives, Directive};

pub use library::wrap_as_library;

/// Line ending used in every generated artifact.
pub(crate) const EXPORT_EOL: &str = "\r\n";

/// Built-in library directory name inside the resource directory.
pub const LIB_DIR: &str = "exp_lib";

/// Instrumentation helper injected into live-run pages.
pub const INJECTION: &str = "injection.js";

const HTTP_PREFIX: &str = "http";

/// Errors an export operation reports to its caller.
#[derive(Error, Debug)]
pub enum ExportError {
    /// A directive path that could not be read anywhere it was looked
    /// for. The first failure wins; the remaining directives are not
    /// checked.
    #[error("cannot read dependency: {0}")]
    UnreadableDependency(String),

    /// `@use` of a remote script where wrapping into a local library is
    /// required.
    #[error("remote library cannot be wrapped: {0}")]
    RemoteLibrary(String),

    /// A write that failed for a reason other than a missing directory.
    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Flags for export operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    /// Library export: read each `@use` dependency, inline it as a
    /// nested module, and add its namespace to the exported symbols.
    pub include_used_declarations: bool,
    /// Web-page export: copy the instrumentation helper into the output
    /// directory and reference it ahead of every other script.
    pub inject_helper: bool,
}

/// The export engine.
///
/// Holds the resource directory (containing `exp_lib/` and
/// `injection.js`) and the user-code offset recorded by the most recent
/// web-page export. The offset is call-scoped output: read it right
/// after the export returns, and do not interleave exports of different
/// sources on one instance.
pub struct Exporter {
    resource_dir: PathBuf,
    user_code_offset: usize,
}

impl Exporter {
    pub fn new(resource_dir: impl Into<PathBuf>) -> Self {
        Self {
            resource_dir: resource_dir.into(),
            user_code_offset: 0,
        }
    }

    /// The built-in library directory.
    pub fn lib_dir(&self) -> PathBuf {
        self.resource_dir.join(LIB_DIR)
    }

    /// Offset of the first user-source character in the page produced
    /// by the last [`Self::export_as_web_page`] call.
    pub fn user_code_offset(&self) -> usize {
        self.user_code_offset
    }

    // ---------------------------------------------------------------

    /// Check that every directive path in `source` is readable.
    ///
    /// Paths starting with `http` are network resources and count as
    /// satisfied. Everything else must be readable next to the source
    /// file (when a path is known) or under `exp_lib/`. The first
    /// unreadable path is returned immediately.
    pub fn check_library_readable(
        &self,
        source: &str,
        source_path: Option<&Path>,
    ) -> Result<(), String> {
        let base = source_path.and_then(|p| p.parent());

        for directive in extract_directives(source) {
            let path = directive.path();
            if path.starts_with(HTTP_PREFIX) {
                continue;
            }
            let mut content = base.and_then(|b| fsops::read_text(&b.join(path)));
            if content.is_none() {
                content = fsops::read_text(&self.lib_dir().join(path));
            }
            if content.is_none() {
                return Err(path.to_string());
            }
        }
        Ok(())
    }

    /// Run the readability check over every script below `root`.
    ///
    /// Files that cannot be read at all are skipped with a warning;
    /// unreadable dependencies are reported per file, not fatal.
    pub fn check_directory(&self, root: &Path) -> Vec<(PathBuf, Result<(), String>)> {
        let mut results = Vec::new();

        for entry in WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| !is_ignored_dir(e))
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if !matches!(ext, "js" | "mjs" | "cjs") {
                continue;
            }
            match fsops::read_text(path) {
                Some(text) => {
                    let outcome = self.check_library_readable(&text, Some(path));
                    results.push((path.to_path_buf(), outcome));
                }
                None => {
                    eprintln!("Warning: failed to read {}", path.display());
                }
            }
        }
        results
    }

    // ---------------------------------------------------------------

    /// Wrap `source` as a library module and write it to `dest`.
    ///
    /// The exported symbols are `analysis.declared_names`; with
    /// `include_used_declarations` each `@use` dependency (resolved
    /// relative to `dest`) is inlined one indent level deeper and its
    /// namespace is appended to the list. Nothing is written when a
    /// dependency cannot be read.
    pub fn export_as_library(
        &self,
        source: &str,
        dest: &Path,
        namespace: &str,
        analysis: &Analysis,
        options: ExportOptions,
    ) -> ExportResult<PathBuf> {
        let mut exported = analysis.declared_names.clone();
        let mut inlined = String::new();

        if options.include_used_declarations {
            let base = dest.parent().unwrap_or_else(|| Path::new(""));
            let mut blocks = Vec::new();
            for directive in extract_directives(source) {
                let Directive::Use { path, namespace: lib_ns } = directive else {
                    continue;
                };
                let block = self
                    .read_as_library_code(&base.join(&path), &lib_ns, 1)
                    .ok_or(ExportError::UnreadableDependency(path))?;
                blocks.push(block);
                exported.push(lib_ns);
            }
            inlined = blocks.join(EXPORT_EOL);
        }

        let code = wrap_as_library(source, &exported, namespace, 0, &inlined);
        fs::write(dest, code).map_err(|e| ExportError::Write {
            path: dest.to_path_buf(),
            source: e,
        })?;
        Ok(dest.to_path_buf())
    }

    /// Read a dependency file and wrap it for inlining.
    fn read_as_library_code(&self, path: &Path, namespace: &str, indent: usize) -> Option<String> {
        let text = fsops::read_text(path)?;
        let analysis = analyze(&text);
        Some(wrap_as_library(&text, &analysis.declared_names, namespace, indent, ""))
    }

    /// Read a `@use` dependency, wrap it, and write it as a standalone
    /// `.lib.js` file.
    fn write_library_immediately(
        &self,
        orig: &Path,
        namespace: &str,
        dest: &Path,
    ) -> ExportResult<()> {
        let code = self
            .read_as_library_code(orig, namespace, 0)
            .ok_or_else(|| ExportError::UnreadableDependency(orig.display().to_string()))?;
        fs::write(dest, code).map_err(|e| ExportError::Write {
            path: dest.to_path_buf(),
            source: e,
        })
    }

    // ---------------------------------------------------------------

    /// Assemble a runnable web page in `out_dir`.
    ///
    /// With a known `source_path`, `@use` dependencies are wrapped into
    /// `<name>.lib.js` files (remote ones are rejected) and plain
    /// dependencies are copied, trying the source directory first and
    /// `exp_lib/` second. Without one (an unsaved buffer), every local
    /// dependency must come from `exp_lib/` and `@use` entries are
    /// referenced as plain script tags.
    ///
    /// On success the page is written as `out_dir/index.html` and the
    /// user-code offset is recorded on the exporter.
    pub fn export_as_web_page(
        &mut self,
        source: &str,
        source_path: Option<&Path>,
        out_dir: &Path,
        options: ExportOptions,
    ) -> ExportResult<PathBuf> {
        let directives = extract_directives(source);
        let mut tags: Vec<String> = Vec::new();

        if options.inject_helper {
            // A missing helper only affects live-run instrumentation,
            // not the exported program, so the copy is best effort.
            fsops::copy_text_file(&self.resource_dir.join(INJECTION), &out_dir.join(INJECTION));
            tags.push(webpage::script_tag(INJECTION));
        }

        if let Some(source_path) = source_path {
            let base = source_path.parent().unwrap_or_else(|| Path::new(""));
            for directive in &directives {
                match directive {
                    Directive::Use { path, namespace } => {
                        if path.starts_with(HTTP_PREFIX) {
                            return Err(ExportError::RemoteLibrary(path.clone()));
                        }
                        let stem = Path::new(path)
                            .file_stem()
                            .and_then(|s| s.to_str())
                            .unwrap_or(path.as_str());
                        let dest_name = format!("{stem}.lib.js");
                        self.write_library_immediately(
                            &base.join(path),
                            namespace,
                            &out_dir.join(&dest_name),
                        )
                        .map_err(|e| match e {
                            ExportError::UnreadableDependency(_) => {
                                ExportError::UnreadableDependency(path.clone())
                            }
                            other => other,
                        })?;
                        tags.push(webpage::script_tag(&dest_name));
                    }
                    Directive::NeedOrImport(path) => {
                        if !path.starts_with(HTTP_PREFIX) {
                            let copied =
                                fsops::copy_text_file(&base.join(path), &out_dir.join(path))
                                    || fsops::copy_text_file(
                                        &self.lib_dir().join(path),
                                        &out_dir.join(path),
                                    );
                            if !copied {
                                return Err(ExportError::UnreadableDependency(path.clone()));
                            }
                        }
                        tags.push(webpage::script_tag(path));
                    }
                }
            }
        } else {
            for directive in &directives {
                let path = directive.path();
                if !path.starts_with(HTTP_PREFIX)
                    && !fsops::copy_text_file(&self.lib_dir().join(path), &out_dir.join(path))
                {
                    return Err(ExportError::UnreadableDependency(path.to_string()));
                }
                tags.push(webpage::script_tag(path));
            }
        }

        let title = webpage::page_title(source_path);
        let (page, offset) = webpage::assemble(&title, &tags, source);
        self.user_code_offset = offset;

        let dest = out_dir.join("index.html");
        fs::write(&dest, page).map_err(|e| ExportError::Write {
            path: dest.clone(),
            source: e,
        })?;
        Ok(dest)
    }
}

/// Check if a directory should be ignored during traversal.
fn is_ignored_dir(entry: &walkdir::DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }

    let name = entry.file_name().to_string_lossy();
    matches!(
        name.as_ref(),
        "node_modules" | ".git" | "dist" | "build" | "coverage"
    )
}
