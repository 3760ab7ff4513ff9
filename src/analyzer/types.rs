//! Shared types for source structure analysis.
//!
//! These structures describe where functions, classes, branches, and
//! variable bindings live inside a JavaScript source text. Positions
//! follow the usual parser convention: 1-indexed lines, 0-indexed
//! columns.

use serde::{Deserialize, Serialize};

/// A single point in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePosition {
    /// Line number, 1-indexed.
    pub line: usize,
    /// Column number, 0-indexed.
    pub column: usize,
}

impl SourcePosition {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// The extent of a syntactic construct.
///
/// For `if`/`else if`/`else` chains a single entry covers the whole
/// chain: `start` is the first `if`, `end` is the last branch's end, and
/// `branch_starts` holds the start of each `else`/`else if` branch so a
/// consumer can render inline markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanEntry {
    pub start: SourcePosition,
    pub end: SourcePosition,
    /// Start positions of subsequent branches in an `else` chain.
    /// Empty for functions, methods, and loops.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branch_starts: Vec<SourcePosition>,
}

impl SpanEntry {
    pub fn new(start: SourcePosition, end: SourcePosition) -> Self {
        Self {
            start,
            end,
            branch_starts: Vec::new(),
        }
    }
}

/// The source range of a single bound identifier in a `var`/`let`/`const`
/// declaration (the name only, not the whole statement).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationSpan {
    pub start: SourcePosition,
    pub end: SourcePosition,
}

/// Structural summary of one JavaScript source text.
///
/// `success` is `false` when the source did not parse cleanly and the
/// summary was recovered from a fault-tolerant parse; the data is then
/// best-effort rather than exact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Analysis {
    pub success: bool,
    /// Spans of function declarations, function-valued bindings and
    /// assignments, and class methods, in document order.
    pub function_spans: Vec<SpanEntry>,
    /// 0-indexed start lines, one per top-level function body. Nested
    /// closures inside an already listed span are skipped.
    pub function_start_lines: Vec<usize>,
    /// One entry per `if` chain (see [`SpanEntry`]).
    pub if_spans: Vec<SpanEntry>,
    /// Spans of `for` statements.
    pub for_spans: Vec<SpanEntry>,
    /// Every function/class/variable name bound at any scope, in
    /// insertion order.
    pub declared_names: Vec<String>,
    /// Identifier ranges of `var` bindings.
    pub var_decl_spans: Vec<DeclarationSpan>,
    /// Identifier ranges of `let` bindings.
    pub let_decl_spans: Vec<DeclarationSpan>,
    /// Identifier ranges of `const` bindings.
    pub const_decl_spans: Vec<DeclarationSpan>,
}
