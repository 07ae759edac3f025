//! Line and column helpers
//!
//! Pure functions over the text of a single line. Columns are 0-indexed byte
//! offsets, which is what tree-sitter points use.

/// Whether a line contains only whitespace
pub fn is_blank(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}

/// Byte column of the first non-blank character (count of leading spaces/tabs)
pub fn leading_whitespace(text: &str) -> usize {
    text.bytes()
        .take_while(|&b| b == b' ' || b == b'\t')
        .count()
}

/// Byte column of the last non-whitespace character, `None` for blank lines
pub fn last_char_column(text: &str) -> Option<usize> {
    text.char_indices()
        .rev()
        .find(|(_, c)| !c.is_whitespace())
        .map(|(idx, _)| idx)
}

/// Display width of a line's leading whitespace, tabs advancing to the next tab stop
pub fn indent_width(text: &str, tab_size: usize) -> usize {
    let tab_size = tab_size.max(1);
    let mut width = 0;
    for b in text.bytes() {
        match b {
            b' ' => width += 1,
            b'\t' => width += tab_size - (width % tab_size),
            _ => break,
        }
    }
    width
}

/// Replace the leading whitespace of `text` with `columns` spaces
pub fn reindent(text: &str, columns: usize) -> String {
    let body = &text[leading_whitespace(text)..];
    if body.is_empty() {
        return String::new();
    }
    format!("{}{}", " ".repeat(columns), body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_columns() {
        assert_eq!(leading_whitespace("    foo(a, b);  "), 4);
        assert_eq!(leading_whitespace("\t x"), 2);
        assert_eq!(last_char_column("    foo(a, b);  "), Some(13));
        assert_eq!(last_char_column("   "), None);
        assert_eq!(last_char_column(""), None);
    }

    #[test]
    fn test_indent_width_expands_tabs() {
        assert_eq!(indent_width("\tx", 4), 4);
        assert_eq!(indent_width("  \tx", 4), 4);
        assert_eq!(indent_width("     \tx", 4), 8);
        assert_eq!(indent_width("x", 4), 0);
    }

    #[test]
    fn test_reindent() {
        assert_eq!(reindent("\t  foo", 4), "    foo");
        assert_eq!(reindent("   ", 4), "");
    }

    proptest! {
        #[test]
        fn prop_reindent_sets_leading_whitespace(
            indent in 0usize..12,
            body in "[a-z(){};]{1,10}",
            columns in 0usize..16,
        ) {
            let line = format!("{}{}", " ".repeat(indent), body);
            let out = reindent(&line, columns);
            prop_assert_eq!(leading_whitespace(&out), columns);
            prop_assert_eq!(&out[columns..], body.as_str());
        }

        #[test]
        fn prop_last_char_is_not_whitespace(line in "[ a-z\t]{0,20}") {
            match last_char_column(&line) {
                Some(col) => {
                    prop_assert!(!line[col..].starts_with(char::is_whitespace));
                    prop_assert!(line[col..].chars().skip(1).all(char::is_whitespace));
                }
                None => prop_assert!(is_blank(&line)),
            }
        }
    }
}
