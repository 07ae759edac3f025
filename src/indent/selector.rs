//! Pick the language tree that drives indentation for a line
//!
//! With injections several trees overlap a line. The most specific one (the
//! smallest root span) wins, except that comment-only grammars such as
//! documentation-comment sublanguages never drive code indentation.

use crate::primitives::syntax_forest::{LanguageTree, SyntaxForest};
use tree_sitter::Node;

/// Whether the start (column 0) of 0-indexed `row` falls inside `node`.
///
/// The last row counts as covered even when the node ends at its column 0,
/// so an empty final line still belongs to the tree ending with a newline.
pub fn covers_line_start(node: &Node<'_>, row: usize) -> bool {
    let start = node.start_position();
    let end = node.end_position();
    let after_start = row > start.row || (row == start.row && start.column == 0);
    after_start && row <= end.row
}

/// Smallest non-comment tree whose root covers the start of 1-indexed `line`.
///
/// Ties keep the first tree found (the host precedes its injections).
pub fn select_tree(forest: &SyntaxForest, line: usize) -> Option<&LanguageTree> {
    let row = line.saturating_sub(1);
    let mut selected: Option<&LanguageTree> = None;

    for tree in forest.trees() {
        if tree.is_comment_only() {
            continue;
        }
        if !covers_line_start(&tree.root(), row) {
            continue;
        }
        let better = selected.map_or(true, |current| tree.byte_span() < current.byte_span());
        if better {
            selected = Some(tree);
        }
    }

    if let Some(tree) = selected {
        tracing::trace!("Line {} uses {} tree", line, tree.language());
    }
    selected
}
