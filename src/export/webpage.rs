//! Web page assembly.
//!
//! A web-page export is a single `index.html`: a fixed head with a
//! derived title, one `<script src>` tag per resolved dependency, then
//! the user source inlined verbatim in an inline script block. The
//! character offset where user code begins is returned alongside the
//! page so runtime stack traces can be mapped back to user-code lines.

use std::path::Path;

use super::EXPORT_EOL;

pub(crate) const HTML_HEAD1: &str =
    "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>%TITLE%</title>";
pub(crate) const HTML_HEAD2: &str = "</head><body><script>";
pub(crate) const HTML_FOOT: &str = "</script></body>";
const TITLE_PLACEHOLDER: &str = "%TITLE%";
const DEFAULT_TITLE: &str = "Studykit";

/// A `<script src>` reference tag.
pub(crate) fn script_tag(src: &str) -> String {
    format!("<script src=\"{src}\"></script>")
}

/// Page title: the capitalized stem of the source file, or a fixed
/// placeholder for unsaved buffers.
pub(crate) fn page_title(source_path: Option<&Path>) -> String {
    let Some(stem) = source_path.and_then(|p| p.file_stem()).and_then(|s| s.to_str()) else {
        return DEFAULT_TITLE.to_string();
    };
    let mut chars = stem.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => DEFAULT_TITLE.to_string(),
    }
}

/// Assemble the page text. Returns the page and the exact offset of the
/// first user-source character within it.
pub(crate) fn assemble(title: &str, tags: &[String], source: &str) -> (String, usize) {
    let head = HTML_HEAD1.replacen(TITLE_PLACEHOLDER, title, 1);
    let tag_str = tags.concat();
    let offset = head.len() + tag_str.len() + HTML_HEAD2.len();

    let body = source.split('\n').collect::<Vec<_>>().join(EXPORT_EOL);
    let page = [head.as_str(), &tag_str, HTML_HEAD2, &body, HTML_FOOT].concat();
    (page, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_substitution() {
        let (page, _) = assemble("Main", &[], "console.log(1);");

        assert!(page.contains("<title>Main</title>"));
        assert!(!page.contains(TITLE_PLACEHOLDER));
    }

    #[test]
    fn test_user_code_offset_is_exact() {
        let tags = vec![script_tag("other.js")];
        let (page, offset) = assemble("Sketch", &tags, "console.log(1);\n");

        assert_eq!(page.find("console.log"), Some(offset));
    }

    #[test]
    fn test_offset_accounts_for_title_length() {
        let (short_page, short_offset) = assemble("A", &[], "x;");
        let (long_page, long_offset) = assemble("AlongerTitle", &[], "x;");

        assert_eq!(short_page.find("x;"), Some(short_offset));
        assert_eq!(long_page.find("x;"), Some(long_offset));
        assert_eq!(long_offset - short_offset, "AlongerTitle".len() - "A".len());
    }

    #[test]
    fn test_tags_appear_before_inline_script() {
        let tags = vec![script_tag("a.js"), script_tag("b.js")];
        let (page, _) = assemble("T", &tags, "x;");

        let a = page.find("<script src=\"a.js\"></script>").unwrap();
        let b = page.find("<script src=\"b.js\"></script>").unwrap();
        let inline = page.find(HTML_HEAD2).unwrap();
        assert!(a < b);
        assert!(b < inline);
    }

    #[test]
    fn test_source_lines_are_rejoined_with_crlf() {
        let (page, offset) = assemble("T", &[], "a;\nb;\n");

        assert!(page[offset..].starts_with("a;\r\nb;"));
        assert!(page.ends_with(HTML_FOOT));
    }

    #[test]
    fn test_page_title_from_file_stem() {
        assert_eq!(page_title(Some(Path::new("/proj/main.js"))), "Main");
        assert_eq!(page_title(Some(Path::new("sketch01.js"))), "Sketch01");
    }

    #[test]
    fn test_page_title_placeholder_without_path() {
        assert_eq!(page_title(None), "Studykit");
    }
}
