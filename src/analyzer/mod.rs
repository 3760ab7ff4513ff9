//! Source structure analysis for Studykit.
//!
//! This module analyzes a single JavaScript source text into the
//! structural summary the editor front end consumes: function and class
//! spans for code folding and gutter numbering, `if`/`for` spans for
//! inline markers, and every bound name for the library exporter.
//!
//! The analyzer is tolerant of broken source. It is expected to run
//! while the user is mid-edit, so syntax errors are routine: the result
//! is then recovered from a fault-tolerant parse and flagged with
//! `success = false`.
//!
//! # Example
//!
//! ```ignore
//! use studykit::analyzer::analyze;
//!
//! let analysis = analyze("function setup() {\n}\n");
//! assert!(analysis.success);
//! assert_eq!(analysis.declared_names, vec!["setup"]);
//! ```

pub mod structure;
pub mod types;

// Re-export commonly used items for convenience
pub use structure::analyze;
pub use types::{Analysis, DeclarationSpan, SourcePosition, SpanEntry};
