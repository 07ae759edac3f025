//! Locate the open/close delimiters of an `align` node

use crate::indent::captures::{CaptureKind, CaptureMap, Directives};
use crate::model::document::LineSource;
use regex::Regex;
use std::cell::RefCell;
use std::collections::HashMap;
use tree_sitter::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterEdge {
    Open,
    Close,
}

impl DelimiterEdge {
    fn capture_kind(self) -> CaptureKind {
        match self {
            DelimiterEdge::Open => CaptureKind::OpenDelimiter,
            DelimiterEdge::Close => CaptureKind::CloseDelimiter,
        }
    }

    fn expected<'d>(self, directives: &'d Directives) -> Option<&'d str> {
        match self {
            DelimiterEdge::Open => directives.open_delimiter.as_deref(),
            DelimiterEdge::Close => directives.close_delimiter.as_deref(),
        }
    }
}

/// A delimiter child and whether nothing but whitespace (or more of the
/// same delimiter characters) follows it on its line
#[derive(Debug, Clone, Copy)]
pub struct Delimiter<'t> {
    pub node: Node<'t>,
    pub last_in_line: bool,
}

/// Find the first direct child of `node` acting as its `edge` delimiter.
///
/// A child qualifies when its kind equals the `indent.{edge}_delimiter`
/// directive or when it is itself captured as `@indent.{edge}_delimiter`.
pub fn find_delimiter<'t>(
    edge: DelimiterEdge,
    node: Node<'t>,
    directives: &Directives,
    captures: &CaptureMap,
    buffer: &dyn LineSource,
) -> Option<Delimiter<'t>> {
    let expected = edge.expected(directives);
    let capture_kind = edge.capture_kind();

    let mut cursor = node.walk();
    let child = node.children(&mut cursor).find(|child| {
        expected.is_some_and(|kind| child.kind() == kind) || captures.contains(capture_kind, child)
    })?;

    let delimiter = expected.unwrap_or(child.kind());
    let line = buffer
        .line(child.start_position().row + 1)
        .unwrap_or_default();
    let after = line.get(child.end_position().column..).unwrap_or_default();

    Some(Delimiter {
        node: child,
        last_in_line: only_delimiter_chars(after, delimiter),
    })
}

thread_local! {
    /// Compiled `only_delimiter_chars` patterns, keyed by delimiter
    static DELIMITER_PATTERNS: RefCell<HashMap<String, Option<Regex>>> =
        RefCell::new(HashMap::new());
}

/// Whether `text` holds nothing but whitespace and characters of `delimiter`
fn only_delimiter_chars(text: &str, delimiter: &str) -> bool {
    DELIMITER_PATTERNS.with(|patterns| {
        let mut patterns = patterns.borrow_mut();
        let pattern = patterns
            .entry(delimiter.to_string())
            .or_insert_with(|| compile_delimiter_pattern(delimiter));
        match pattern {
            Some(re) => re.is_match(text),
            None => text.trim().is_empty(),
        }
    })
}

fn compile_delimiter_pattern(delimiter: &str) -> Option<Regex> {
    let class: String = delimiter
        .chars()
        .map(|c| regex::escape(&c.to_string()))
        .collect();
    match Regex::new(&format!(r"^[\s{class}]*$")) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!("Bad delimiter pattern for {:?}: {}", delimiter, e);
            None
        }
    }
}
