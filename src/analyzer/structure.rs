//! Structure analysis using tree-sitter for JavaScript.
//!
//! Walks a parsed syntax tree once and records the spans and bound names
//! an editor needs for gutter numbering and inline decoration. The
//! analyzer is meant to run on every keystroke of a live editing session,
//! so it never fails: syntax errors simply flip the `success` flag and
//! the summary is recovered from tree-sitter's error-tolerant tree.

use std::collections::HashSet;

use tree_sitter::{Node, Parser, Point, TreeCursor};

use super::types::{Analysis, DeclarationSpan, SourcePosition, SpanEntry};

/// Analyze one JavaScript source text.
///
/// Never panics and never returns an error. `Analysis::success` is
/// `true` only when the source parsed without syntax errors; otherwise
/// the returned summary is the best-effort result of a fault-tolerant
/// parse. Conditions that are not syntax errors (a parser that yields no
/// tree at all) are reported on stderr.
pub fn analyze(source: &str) -> Analysis {
    let mut parser = Parser::new();
    if parser
        .set_language(&tree_sitter_javascript::LANGUAGE.into())
        .is_err()
    {
        eprintln!("Warning: JavaScript grammar failed to initialize");
        return Analysis::default();
    }

    let Some(tree) = parser.parse(source, None) else {
        eprintln!("Warning: parser produced no tree for source");
        return Analysis::default();
    };

    let mut collector = Collector::default();
    let mut cursor = tree.root_node().walk();
    collector.visit(&mut cursor, source);
    collector.finish(!tree.root_node().has_error())
}

fn position(point: Point) -> SourcePosition {
    SourcePosition::new(point.row + 1, point.column)
}

fn span_of(node: &Node) -> SpanEntry {
    SpanEntry::new(position(node.start_position()), position(node.end_position()))
}

fn is_function_expression(kind: &str) -> bool {
    matches!(
        kind,
        "function_expression" | "generator_function" | "arrow_function"
    )
}

fn node_text<'a>(node: &Node, source: &'a str) -> Option<&'a str> {
    source.get(node.start_byte()..node.end_byte())
}

/// Per-call working state for one traversal.
#[derive(Default)]
struct Collector {
    function_spans: Vec<SpanEntry>,
    if_spans: Vec<SpanEntry>,
    for_spans: Vec<SpanEntry>,
    declared_names: Vec<String>,
    var_decl_spans: Vec<DeclarationSpan>,
    let_decl_spans: Vec<DeclarationSpan>,
    const_decl_spans: Vec<DeclarationSpan>,
    /// Start bytes of `if` statements already absorbed into a chain
    /// entry, so they are not re-emitted when the walk reaches them.
    visited_chain_links: HashSet<usize>,
}

impl Collector {
    /// Visit a node, then descend into its children.
    fn visit(&mut self, cursor: &mut TreeCursor, source: &str) {
        let node = cursor.node();

        match node.kind() {
            "class_declaration" => self.on_class_declaration(&node, source),
            "variable_declaration" | "lexical_declaration" => {
                self.on_variable_declaration(&node, source)
            }
            "function_declaration" | "generator_function_declaration" => {
                self.on_function_declaration(&node, source)
            }
            "assignment_expression" => self.on_assignment(&node, source),
            // Class members only; object literals reuse the same node kind.
            "method_definition" => {
                if node.parent().map(|p| p.kind()) == Some("class_body") {
                    self.function_spans.push(span_of(&node));
                }
            }
            "if_statement" => self.on_if_statement(&node),
            "for_statement" => self.for_spans.push(span_of(&node)),
            _ => {}
        }

        if cursor.goto_first_child() {
            loop {
                self.visit(cursor, source);
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
            cursor.goto_parent();
        }
    }

    fn on_class_declaration(&mut self, node: &Node, source: &str) {
        if let Some(name) = node.child_by_field_name("name") {
            if let Some(text) = node_text(&name, source) {
                self.declared_names.push(text.to_string());
            }
        }
    }

    /// `const f = function () {...};` and friends.
    fn on_variable_declaration(&mut self, node: &Node, source: &str) {
        // The leading keyword token decides which span list receives the
        // bound identifiers.
        let keyword = node
            .child(0)
            .and_then(|token| node_text(&token, source).map(|t| t.to_string()))
            .unwrap_or_default();

        let mut cursor = node.walk();
        for declarator in node.named_children(&mut cursor) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let name = declarator.child_by_field_name("name");
            let value = declarator.child_by_field_name("value");

            if let Some(value) = &value {
                if is_function_expression(value.kind()) {
                    // Absorb the keyword's width into the span when the
                    // statement and the declarator start on the same line.
                    let start = if node.start_position().row == declarator.start_position().row {
                        node.start_position()
                    } else {
                        declarator.start_position()
                    };
                    self.function_spans.push(SpanEntry::new(
                        position(start),
                        position(declarator.end_position()),
                    ));
                }
                if is_function_expression(value.kind()) || value.kind() == "class" {
                    if let Some(name) = &name {
                        if name.kind() == "identifier" {
                            if let Some(text) = node_text(name, source) {
                                self.declared_names.push(text.to_string());
                            }
                        }
                    }
                }
            }

            if let Some(name) = &name {
                let span = DeclarationSpan {
                    start: position(name.start_position()),
                    end: position(name.end_position()),
                };
                match keyword.as_str() {
                    "var" => self.var_decl_spans.push(span),
                    "let" => self.let_decl_spans.push(span),
                    "const" => self.const_decl_spans.push(span),
                    _ => {}
                }
            }
        }
    }

    /// `function f() {...}`
    fn on_function_declaration(&mut self, node: &Node, source: &str) {
        self.function_spans.push(span_of(node));
        if let Some(name) = node.child_by_field_name("name") {
            if let Some(text) = node_text(&name, source) {
                self.declared_names.push(text.to_string());
            }
        }
    }

    /// `f = function () {...};` and `obj.f = function () {...};`
    fn on_assignment(&mut self, node: &Node, source: &str) {
        let Some(left) = node.child_by_field_name("left") else {
            return;
        };
        let Some(right) = node.child_by_field_name("right") else {
            return;
        };

        let left_is_target = matches!(left.kind(), "identifier" | "member_expression");
        if left_is_target && is_function_expression(right.kind()) {
            self.function_spans.push(span_of(node));
        }
        if left.kind() == "identifier"
            && (is_function_expression(right.kind()) || right.kind() == "class")
        {
            if let Some(text) = node_text(&left, source) {
                self.declared_names.push(text.to_string());
            }
        }
    }

    /// Collapse an `if`/`else if`/`else` chain into a single entry.
    fn on_if_statement(&mut self, node: &Node) {
        if self.visited_chain_links.contains(&node.start_byte()) {
            return;
        }

        let mut entry = span_of(node);
        let mut current = *node;
        loop {
            let Some(branch) = alternate_branch(&current) else {
                break;
            };
            entry.branch_starts.push(position(branch.start_position()));
            if branch.kind() == "if_statement" {
                current = branch;
                entry.end = position(current.end_position());
                self.visited_chain_links.insert(current.start_byte());
            } else {
                break;
            }
        }
        self.if_spans.push(entry);
    }

    fn finish(self, success: bool) -> Analysis {
        // One gutter entry per top-level function body: a span whose end
        // line does not reach past the previously emitted span is nested
        // inside it and is skipped.
        let mut function_start_lines = Vec::new();
        let mut last_end: isize = -1;
        for span in &self.function_spans {
            let end = span.end.line as isize - 1;
            if last_end < end {
                function_start_lines.push(span.start.line - 1);
                last_end = end;
            }
        }

        Analysis {
            success,
            function_spans: self.function_spans,
            function_start_lines,
            if_spans: self.if_spans,
            for_spans: self.for_spans,
            declared_names: self.declared_names,
            var_decl_spans: self.var_decl_spans,
            let_decl_spans: self.let_decl_spans,
            const_decl_spans: self.const_decl_spans,
        }
    }
}

/// The statement following `else`, skipping any interleaved comment.
fn alternate_branch<'tree>(node: &Node<'tree>) -> Option<Node<'tree>> {
    let else_clause = node.child_by_field_name("alternative")?;
    let mut cursor = else_clause.walk();
    let branch = else_clause
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment");
    branch
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===== Function and name collection =====

    #[test]
    fn test_function_declaration_span_and_name() {
        let analysis = analyze("function setup() {\n    return 1;\n}\n");

        assert!(analysis.success);
        assert_eq!(analysis.declared_names, vec!["setup"]);
        assert_eq!(analysis.function_spans.len(), 1);
        assert_eq!(analysis.function_spans[0].start, SourcePosition::new(1, 0));
        assert_eq!(analysis.function_spans[0].end.line, 3);
    }

    #[test]
    fn test_const_arrow_function_absorbs_keyword() {
        let analysis = analyze("const draw = () => {\n};\n");

        // The span starts at `const`, not at `draw`.
        assert_eq!(analysis.function_spans.len(), 1);
        assert_eq!(analysis.function_spans[0].start, SourcePosition::new(1, 0));
        assert_eq!(analysis.declared_names, vec!["draw"]);
    }

    #[test]
    fn test_declarator_on_later_line_keeps_own_start() {
        let analysis = analyze("const\ndraw = () => {\n};\n");

        assert_eq!(analysis.function_spans.len(), 1);
        assert_eq!(analysis.function_spans[0].start.line, 2);
    }

    #[test]
    fn test_class_declaration_records_name_only() {
        let analysis = analyze("class Turtle {\n}\n");

        assert_eq!(analysis.declared_names, vec!["Turtle"]);
        assert!(analysis.function_spans.is_empty());
    }

    #[test]
    fn test_class_expression_binding_records_name() {
        let analysis = analyze("const Turtle = class {\n};\n");

        assert_eq!(analysis.declared_names, vec!["Turtle"]);
        // A class expression contributes no function span.
        assert!(analysis.function_spans.is_empty());
    }

    #[test]
    fn test_method_definition_span() {
        let analysis = analyze("class Turtle {\n    move(d) {\n    }\n}\n");

        assert_eq!(analysis.declared_names, vec!["Turtle"]);
        assert_eq!(analysis.function_spans.len(), 1);
        assert_eq!(analysis.function_spans[0].start.line, 2);
    }

    #[test]
    fn test_object_literal_method_is_not_a_function_span() {
        let analysis = analyze("const cfg = {\n    run() {\n    }\n};\n");

        assert!(analysis.function_spans.is_empty());
        assert!(analysis.function_start_lines.is_empty());
        assert_eq!(analysis.const_decl_spans.len(), 1);
    }

    #[test]
    fn test_assignment_to_identifier_records_span_and_name() {
        let analysis = analyze("f = function () {\n};\n");

        assert_eq!(analysis.function_spans.len(), 1);
        assert_eq!(analysis.declared_names, vec!["f"]);
    }

    #[test]
    fn test_assignment_to_member_records_span_only() {
        let analysis = analyze("obj.f = function () {\n};\n");

        assert_eq!(analysis.function_spans.len(), 1);
        assert!(analysis.declared_names.is_empty());
    }

    #[test]
    fn test_declared_names_keep_insertion_order() {
        let source = "function a() {}\nconst b = () => {};\nclass C {}\nvar d = function () {};\n";
        let analysis = analyze(source);

        assert_eq!(analysis.declared_names, vec!["a", "b", "C", "d"]);
    }

    // ===== If chains =====

    #[test]
    fn test_if_else_chain_collapses_to_one_entry() {
        let source = "if (a) {\n} else if (b) {\n} else {\n}\n";
        let analysis = analyze(source);

        assert_eq!(analysis.if_spans.len(), 1);
        let entry = &analysis.if_spans[0];
        assert_eq!(entry.start.line, 1);
        assert_eq!(entry.end.line, 4);
        assert_eq!(entry.branch_starts.len(), 2);
        assert_eq!(entry.branch_starts[0].line, 2);
        assert_eq!(entry.branch_starts[1].line, 3);
    }

    #[test]
    fn test_plain_if_has_no_branch_markers() {
        let analysis = analyze("if (a) {\n}\n");

        assert_eq!(analysis.if_spans.len(), 1);
        assert!(analysis.if_spans[0].branch_starts.is_empty());
    }

    #[test]
    fn test_if_nested_in_consequence_is_separate_entry() {
        let analysis = analyze("if (a) {\n    if (b) {\n    }\n}\n");

        assert_eq!(analysis.if_spans.len(), 2);
    }

    #[test]
    fn test_long_else_if_chain() {
        let source = "if (a) {\n} else if (b) {\n} else if (c) {\n} else {\n}\n";
        let analysis = analyze(source);

        assert_eq!(analysis.if_spans.len(), 1);
        assert_eq!(analysis.if_spans[0].branch_starts.len(), 3);
        assert_eq!(analysis.if_spans[0].end.line, 5);
    }

    // ===== Loops =====

    #[test]
    fn test_for_statement_span() {
        let analysis = analyze("for (let i = 0; i < 3; i += 1) {\n}\n");

        assert_eq!(analysis.for_spans.len(), 1);
        assert_eq!(analysis.for_spans[0].start.line, 1);
        assert_eq!(analysis.for_spans[0].end.line, 2);
    }

    // ===== Variable binding spans =====

    #[test]
    fn test_binding_spans_cover_identifiers_only() {
        let analysis = analyze("var a = 1;\nlet bb = 2;\nconst ccc = 3;\n");

        assert_eq!(analysis.var_decl_spans.len(), 1);
        assert_eq!(analysis.let_decl_spans.len(), 1);
        assert_eq!(analysis.const_decl_spans.len(), 1);

        let a = &analysis.var_decl_spans[0];
        assert_eq!(a.start, SourcePosition::new(1, 4));
        assert_eq!(a.end, SourcePosition::new(1, 5));

        let ccc = &analysis.const_decl_spans[0];
        assert_eq!(ccc.start.column, 6);
        assert_eq!(ccc.end.column, 9);
    }

    #[test]
    fn test_multiple_declarators_each_get_a_span() {
        let analysis = analyze("let a = 1, b = 2, c = 3;\n");

        assert_eq!(analysis.let_decl_spans.len(), 3);
    }

    // ===== Gutter start lines =====

    #[test]
    fn test_function_start_lines_skip_nested_closures() {
        let source = concat!(
            "function outer() {\n",      // line 1
            "    const inner = () => {\n", // nested, same region
            "    };\n",
            "}\n",
            "function after() {\n",      // line 5
            "}\n",
        );
        let analysis = analyze(source);

        assert_eq!(analysis.function_start_lines, vec![0, 4]);
    }

    #[test]
    fn test_two_functions_on_one_line_emit_once() {
        let analysis = analyze("const a = () => 1; const b = () => 2;\n");

        assert_eq!(analysis.function_spans.len(), 2);
        assert_eq!(analysis.function_start_lines, vec![0]);
    }

    // ===== Fault tolerance =====

    #[test]
    fn test_truncated_source_never_fails() {
        let analysis = analyze("function (");

        assert!(!analysis.success);
    }

    #[test]
    fn test_partial_source_still_reports_valid_parts() {
        let source = "function good() {\n}\nfunction (\n";
        let analysis = analyze(source);

        assert!(!analysis.success);
        assert!(analysis.declared_names.contains(&"good".to_string()));
    }

    #[test]
    fn test_empty_source() {
        let analysis = analyze("");

        assert!(analysis.success);
        assert!(analysis.function_spans.is_empty());
        assert!(analysis.declared_names.is_empty());
    }
}
