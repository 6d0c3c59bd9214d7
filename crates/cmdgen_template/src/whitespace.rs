//! Whitespace normalization for generated text.
//!
//! Regenerating the same descriptors must produce byte-identical files, and
//! small descriptor edits should produce small diffs. Fragments therefore never
//! have to care about trailing spaces or stray blank lines; [`normalize`]
//! fixes those up once at the end of a render.

/// Spaces per indentation level.
pub const INDENT_WIDTH: usize = 4;

/// Indents every non-empty line of `text` by `depth` levels.
///
/// Blank lines stay empty so that indentation never introduces trailing
/// whitespace.
#[must_use]
pub fn indent(text: &str, depth: usize) -> String {
    if depth == 0 {
        return text.to_string();
    }
    let prefix = " ".repeat(depth * INDENT_WIDTH);
    let mut out = String::with_capacity(text.len() + text.lines().count() * prefix.len());
    for line in text.split_inclusive('\n') {
        if !line.trim().is_empty() {
            out.push_str(&prefix);
        }
        out.push_str(line);
    }
    out
}

/// Normalizes rendered output.
///
/// - `\r\n` becomes `\n`
/// - trailing whitespace is removed from every line
/// - leading blank lines are dropped and runs of blank lines collapse to one
/// - non-empty output ends with exactly one newline
#[must_use]
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_blank = false;

    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            pending_blank = !out.is_empty();
            continue;
        }
        if pending_blank {
            out.push('\n');
            pending_blank = false;
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_skips_blank_lines() {
        let text = "a\n\n  b\n";
        assert_eq!(indent(text, 1), "    a\n\n      b\n");
    }

    #[test]
    fn test_indent_without_trailing_newline() {
        assert_eq!(indent("a\nb", 2), "        a\n        b");
    }

    #[test]
    fn test_normalize_trims_and_collapses() {
        let text = "\n\nstruct A  \r\n{\n\n\n    int x; \t\n}\n\n";
        assert_eq!(normalize(text), "struct A\n{\n\n    int x;\n}\n");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("\n \n\t\n"), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let text = "a\n\n\nb   \nc";
        let once = normalize(text);
        assert_eq!(normalize(&once), once);
    }
}
