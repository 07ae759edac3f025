//! Locate the syntax node at the start or end of a line

use crate::model::document::LineSource;
use crate::primitives::line_text;
use tree_sitter::{Node, Point};

/// Smallest node covering the single column `col` of 0-indexed `row`.
///
/// Falls back to `root` when nothing below it covers the range, which also
/// covers positions past the end of the line or of the tree.
pub fn node_at<'t>(root: Node<'t>, row: usize, col: usize) -> Node<'t> {
    root.descendant_for_point_range(
        Point { row, column: col },
        Point {
            row,
            column: col + 1,
        },
    )
    .unwrap_or(root)
}

/// Node that starts a 1-indexed line.
///
/// `col` defaults to the line's leading whitespace, i.e. the first
/// non-blank character.
pub fn first_node_at_line<'t>(
    root: Node<'t>,
    buffer: &dyn LineSource,
    line: usize,
    col: Option<usize>,
) -> Node<'t> {
    let col = col.unwrap_or_else(|| {
        buffer
            .line(line)
            .map(line_text::leading_whitespace)
            .unwrap_or(0)
    });
    node_at(root, line.saturating_sub(1), col)
}

/// Node that ends a 1-indexed line.
///
/// `col` defaults to the last non-blank character; a blank line has none
/// and is looked up at column 0.
pub fn last_node_at_line<'t>(
    root: Node<'t>,
    buffer: &dyn LineSource,
    line: usize,
    col: Option<usize>,
) -> Node<'t> {
    let col = col.unwrap_or_else(|| {
        buffer
            .line(line)
            .and_then(line_text::last_char_column)
            .unwrap_or(0)
    });
    node_at(root, line.saturating_sub(1), col)
}
