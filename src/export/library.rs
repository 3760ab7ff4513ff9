//! Library module codegen.
//!
//! A library export wraps user code inside a namespaced self-invoking
//! factory returning an object literal that maps each exported symbol to
//! itself:
//!
//! ```text
//! var TURTLE = (function () {
//!     ...user code...
//!     return {home: home, move: move};
//! }());
//! ```
//!
//! The wrapper can be indented one level deeper for nesting inside
//! another library, and dependency blocks can be inlined ahead of the
//! body.

use super::EXPORT_EOL;

/// Wrap `source` as a library module exposing `exported_symbols` under
/// `namespace`. Lines are re-indented by one tab inside the wrapper and
/// trailing whitespace is trimmed. `inlined` holds already wrapped
/// dependency blocks, inserted right after the factory opening.
pub fn wrap_as_library(
    source: &str,
    exported_symbols: &[String],
    namespace: &str,
    indent: usize,
    inlined: &str,
) -> String {
    let exports = exported_symbols
        .iter()
        .map(|name| format!("{name}: {name}"))
        .collect::<Vec<_>>()
        .join(", ");
    let ind = "\t".repeat(indent);

    let head = format!("{ind}var {namespace} = (function () {{");
    let body = source
        .split('\n')
        .map(|line| format!("{ind}\t{}", line.trim_end()))
        .collect::<Vec<_>>()
        .join(EXPORT_EOL);
    let ret = format!("{ind}\treturn {{{exports}}};");
    let foot = format!("{ind}}}());");

    if inlined.is_empty() {
        [head, body, ret, foot].join(EXPORT_EOL)
    } else {
        [head, inlined.to_string(), body, ret, foot].join(EXPORT_EOL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze;

    fn symbols(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_wrapper_shape() {
        let code = wrap_as_library("const a = 1;", &symbols(&["a"]), "M", 0, "");
        let lines: Vec<&str> = code.split(EXPORT_EOL).collect();

        assert_eq!(lines[0], "var M = (function () {");
        assert_eq!(lines[1], "\tconst a = 1;");
        assert_eq!(lines[2], "\treturn {a: a};");
        assert_eq!(lines[3], "}());");
    }

    #[test]
    fn test_exported_symbols_map_to_themselves() {
        let code = wrap_as_library("", &symbols(&["home", "turn", "move"]), "T", 0, "");

        assert!(code.contains("return {home: home, turn: turn, move: move};"));
    }

    #[test]
    fn test_empty_export_list_yields_empty_object() {
        let code = wrap_as_library("let x = 0;", &[], "M", 0, "");

        assert!(code.contains("return {};"));
    }

    #[test]
    fn test_indent_level_prefixes_every_line() {
        let code = wrap_as_library("let x = 0;", &symbols(&["x"]), "M", 1, "");

        for line in code.split(EXPORT_EOL) {
            assert!(line.starts_with('\t'), "line not indented: {line:?}");
        }
        assert!(code.starts_with("\tvar M = (function () {"));
    }

    #[test]
    fn test_inlined_block_comes_before_body() {
        let nested = wrap_as_library("let y = 2;", &symbols(&["y"]), "N", 1, "");
        let code = wrap_as_library("let x = 1;", &symbols(&["x", "N"]), "M", 0, &nested);

        let nested_pos = code.find("var N").unwrap();
        let body_pos = code.find("let x = 1;").unwrap();
        assert!(nested_pos < body_pos);
        assert!(code.contains("return {x: x, N: N};"));
    }

    #[test]
    fn test_trailing_whitespace_is_trimmed() {
        let code = wrap_as_library("let x = 1;   \nlet y = 2;\t", &[], "M", 0, "");

        assert!(code.contains("\tlet x = 1;\r\n"));
        assert!(code.ends_with("let y = 2;\r\n\treturn {};\r\n}());"));
    }

    #[test]
    fn test_wrapper_defines_exactly_one_top_level_binding() {
        let source = "function home() {\n}\nfunction move(d) {\n}\n";
        let names = analyze(source).declared_names;
        let code = wrap_as_library(source, &names, "TURTLE", 0, "");

        let analysis = analyze(&code);
        assert!(analysis.success);
        // The namespace is the only top-level `var` binding.
        assert_eq!(analysis.var_decl_spans.len(), 1);
        assert!(code.contains("return {home: home, move: move};"));
    }
}
