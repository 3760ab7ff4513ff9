//! Dependency declaration directives.
//!
//! User scripts declare their dependencies in specially formatted line
//! comments:
//!
//! ```text
//! // @need "path.js"
//! // @import path1.js path2.js
//! // @use "turtle.js" as TURTLE
//! ```
//!
//! The keyword must immediately follow `//` and `@`; one or more
//! space-separated, optionally quoted tokens follow, and a trailing `;`
//! is tolerated. Lines that do not match are silently ignored, so the
//! extractor can be fed whole source files.

/// A single dependency declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// A plain script dependency (`@need` / `@import`), referenced
    /// verbatim by the exporter.
    NeedOrImport(String),
    /// A library dependency (`@use`), wrapped under `namespace` when
    /// bundled.
    Use { path: String, namespace: String },
}

impl Directive {
    /// The path component, regardless of directive kind.
    pub fn path(&self) -> &str {
        match self {
            Directive::NeedOrImport(path) => path,
            Directive::Use { path, .. } => path,
        }
    }
}

const COMMENT: &str = "//";
const SP_CHAR: char = '@';
const USE: &str = "@use";
const NEED: &str = "@need";
const IMPORT: &str = "@import";
const AS: &str = "as";
const EXT: &str = ".js";

/// Extract every dependency directive from `source`, in document order.
///
/// Duplicate paths are not deduplicated; a path may legitimately appear
/// more than once and the exporter emits one tag per occurrence.
pub fn extract_directives(source: &str) -> Vec<Directive> {
    let mut result = Vec::new();

    for line in source.split('\n') {
        let Some((keyword, params)) = special_comment(line) else {
            continue;
        };
        let tokens: Vec<String> = split_space_separated(&params)
            .iter()
            .map(|t| unwrap_quote(t))
            .collect();

        match keyword.as_str() {
            NEED | IMPORT => {
                for token in tokens {
                    result.push(Directive::NeedOrImport(with_suffix(token)));
                }
            }
            USE => {
                let mut last: Option<usize> = None;
                let mut i = 0;
                while i < tokens.len() {
                    if tokens[i] == AS {
                        // `as NAME` renames the entry pushed just before it.
                        if let Some(index) = last {
                            if i + 1 < tokens.len() {
                                if let Directive::Use { namespace, .. } = &mut result[index] {
                                    *namespace = tokens[i + 1].clone();
                                }
                                i += 1;
                            }
                        }
                    } else {
                        result.push(Directive::Use {
                            path: with_suffix(tokens[i].clone()),
                            namespace: String::new(),
                        });
                        last = Some(result.len() - 1);
                    }
                    i += 1;
                }
                // Entries without an explicit `as NAME` fall back to a
                // namespace inferred from the file name.
                for directive in result.iter_mut() {
                    if let Directive::Use { path, namespace } = directive {
                        if namespace.is_empty() {
                            *namespace = path_to_lib_name(path);
                        }
                    }
                }
            }
            _ => {}
        }
    }
    result
}

/// Split a directive comment into `(keyword, parameter-string)`.
fn special_comment(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    let rest = line.strip_prefix(COMMENT)?.trim();

    if !rest.starts_with(SP_CHAR) {
        return None;
    }
    let pos = rest.find(char::is_whitespace)?;

    let keyword = rest[..pos].to_string();
    let mut params = rest[pos..].trim();
    if let Some(stripped) = params.strip_suffix(';') {
        params = stripped.trim();
    }
    Some((keyword, params.to_string()))
}

/// Split on spaces, honoring single- and double-quoted runs. Quote
/// characters are consumed; there is no escape handling inside quotes,
/// and an unterminated quote drops the pending token.
fn split_space_separated(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        match quote {
            None => match ch {
                '"' | '\'' => quote = Some(ch),
                ' ' => {
                    if !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                    }
                }
                _ => current.push(ch),
            },
            Some(q) => {
                if ch == q {
                    quote = None;
                } else {
                    current.push(ch);
                }
            }
        }
    }
    if quote.is_none() && !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Strip one matching pair of surrounding quotes, if present.
fn unwrap_quote(token: &str) -> String {
    for q in ['\'', '"'] {
        if token.len() >= 2 && token.starts_with(q) && token.ends_with(q) {
            return token[1..token.len() - 1].to_string();
        }
    }
    token.to_string()
}

fn with_suffix(mut path: String) -> String {
    if !path.ends_with(EXT) {
        path.push_str(EXT);
    }
    path
}

/// Infer a library namespace from its path: the final non-empty segment,
/// cut at the first `.`, upper-cased.
///
/// Only the first occurrence of a disallowed character is replaced with
/// `_`. Downstream projects depend on the exact namespaces this
/// produces, so the single substitution stays.
pub fn path_to_lib_name(path: &str) -> String {
    let mut stem = String::new();
    for segment in path.rsplit(['/', '\\']) {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let cut = segment.find('.').unwrap_or(segment.len());
        stem = segment[..cut].to_uppercase();
        break;
    }

    if let Some(pos) = stem.find([' ', '-', '+', '\\', '.']) {
        stem.replace_range(pos..pos + 1, "_");
    }
    stem
}
