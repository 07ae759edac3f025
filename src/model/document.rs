//! In-memory text buffer used by the indent calculator
//!
//! The calculator only needs line-level access: the literal text of a line
//! and the indent the editor has already resolved for it. Hosts with their
//! own buffer implement [`LineSource`]; [`Document`] is the simple owned
//! implementation used by the CLI and tests.

use crate::error::{IndentError, Result};
use crate::primitives::line_text;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique buffer identity, part of the capture cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u64);

impl BufferId {
    /// Allocate a fresh id
    pub fn next() -> Self {
        Self(NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Line-level text access required by the indent calculator
pub trait LineSource {
    /// Identity of the buffer (stable across edits)
    fn buffer_id(&self) -> BufferId;

    /// Full text, as handed to the parser
    fn text(&self) -> &str;

    /// Number of lines (a trailing newline starts one more, empty, line)
    fn line_count(&self) -> usize;

    /// Text of a 1-indexed line without its terminator
    fn line(&self, line: usize) -> Option<&str>;

    /// Indent already present on a 1-indexed line, in columns
    fn line_indent(&self, line: usize, tab_size: usize) -> usize {
        self.line(line)
            .map(|text| line_text::indent_width(text, tab_size))
            .unwrap_or(0)
    }

    /// Closest line before `line` with any non-blank text
    fn prev_nonblank(&self, line: usize) -> Option<usize> {
        (1..line).rev().find(|&candidate| {
            self.line(candidate)
                .is_some_and(|text| !line_text::is_blank(text))
        })
    }
}

/// Owned text buffer with a line index
#[derive(Debug, Clone)]
pub struct Document {
    id: BufferId,
    text: String,
    /// Byte offset where each line starts
    line_starts: Vec<usize>,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let line_starts = Self::index_lines(&text);
        Self {
            id: BufferId::next(),
            text,
            line_starts,
        }
    }

    /// Read a file into a new document
    pub fn open(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| IndentError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self::new(text))
    }

    fn index_lines(text: &str) -> Vec<usize> {
        std::iter::once(0)
            .chain(text.match_indices('\n').map(|(idx, _)| idx + 1))
            .collect()
    }

    /// Replace the whole text, keeping the buffer identity
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.line_starts = Self::index_lines(&self.text);
    }

    /// Byte range of a 1-indexed line, excluding the terminator
    fn line_range(&self, line: usize) -> Option<std::ops::Range<usize>> {
        if line == 0 || line > self.line_starts.len() {
            return None;
        }
        let start = self.line_starts[line - 1];
        let mut end = self
            .line_starts
            .get(line)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        if end > start && self.text.as_bytes()[end - 1] == b'\r' {
            end -= 1;
        }
        Some(start..end)
    }

    /// Byte offset of the start of a 1-indexed line
    pub fn line_start_byte(&self, line: usize) -> Option<usize> {
        self.line_range(line).map(|range| range.start)
    }

    /// Replace the leading whitespace of a line with `columns` spaces.
    ///
    /// Blank lines are left empty. Returns false when the line does not exist.
    pub fn set_line_indent(&mut self, line: usize, columns: usize) -> bool {
        let Some(range) = self.line_range(line) else {
            return false;
        };
        let replaced = line_text::reindent(&self.text[range.clone()], columns);
        self.text.replace_range(range, &replaced);
        self.line_starts = Self::index_lines(&self.text);
        true
    }
}

impl LineSource for Document {
    fn buffer_id(&self) -> BufferId {
        self.id
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    fn line(&self, line: usize) -> Option<&str> {
        self.line_range(line).map(|range| &self.text[range])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lines() {
        let doc = Document::new("int x;\r\n  y\n\n");
        assert_eq!(doc.line_count(), 4);
        assert_eq!(doc.line(1), Some("int x;"));
        assert_eq!(doc.line(2), Some("  y"));
        assert_eq!(doc.line(3), Some(""));
        assert_eq!(doc.line(4), Some(""));
        assert_eq!(doc.line(5), None);
        assert_eq!(doc.line_start_byte(2), Some(8));
    }

    #[test]
    fn test_line_indent_uses_tab_size() {
        let doc = Document::new("\tfoo\n  bar");
        assert_eq!(doc.line_indent(1, 8), 8);
        assert_eq!(doc.line_indent(2, 8), 2);
        assert_eq!(doc.line_indent(9, 8), 0);
    }

    #[test]
    fn test_set_line_indent_keeps_identity() {
        let mut doc = Document::new("a {\nb\n}");
        let id = doc.buffer_id();
        assert!(doc.set_line_indent(2, 4));
        assert_eq!(doc.text(), "a {\n    b\n}");
        assert_eq!(doc.buffer_id(), id);
        assert!(!doc.set_line_indent(7, 4));
    }

    #[test]
    fn test_open_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.c");
        std::fs::write(&path, "int x;\n").unwrap();

        let doc = Document::open(&path).unwrap();
        assert_eq!(doc.line(1), Some("int x;"));

        let missing = Document::open(&dir.path().join("missing.c"));
        assert!(matches!(missing, Err(IndentError::Io { .. })));
    }

    #[test]
    fn test_prev_nonblank_skips_whitespace_lines() {
        let doc = Document::new("a\n\n  \nb\n");
        assert_eq!(doc.prev_nonblank(4), Some(1));
        assert_eq!(doc.prev_nonblank(5), Some(4));
        assert_eq!(doc.prev_nonblank(1), None);
        assert_eq!(Document::new("\n\n").prev_nonblank(3), None);
    }

    #[test]
    fn test_buffer_ids_are_unique() {
        assert_ne!(Document::new("").buffer_id(), Document::new("").buffer_id());
    }
}
