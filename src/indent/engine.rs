//! Indent inference over the ancestor chain
//!
//! # Algorithm
//!
//! 1. **Anchor**: the node starting the target line. For a blank line it is
//!    the node under the last character of the previous non-blank line,
//!    skipping a trailing comment. If that node (or an ancestor) is captured
//!    `@indent.end`, the blank line starts fresh and is anchored like a
//!    non-blank one.
//! 2. **Zero**: an anchor captured `@indent.zero` pins the line to column 0.
//! 3. **Walk** from the anchor to the root, accumulating indent:
//!    - `@indent.auto` / `@indent.ignore` around the line end the walk with
//!      "auto" / column 0
//!    - `@indent.branch` starting on the line and `@indent.dedent` starting
//!      before it remove one level
//!    - `@indent.begin` adds one level (or its `indent.increment`)
//!    - inside error-recovered code, a child's `@indent.align` is promoted to
//!      its parent
//!    - `@indent.align` either hangs one level below an open delimiter that
//!      ends its line, or pins the line to the delimiter's column. A pinned
//!      column is absolute and ends the walk.
//!
//! Each source row contributes at most once: several ancestors starting on
//! the same row (e.g. `if_statement` and its `compound_statement`) must not
//! stack. Rows are marked after all rules of a node have run, so begin and
//! error promotion can both fire for the same node.

use crate::indent::captures::{CaptureKind, CaptureMap, Directives};
use crate::indent::delimiter::{find_delimiter, DelimiterEdge};
use crate::indent::locator::{first_node_at_line, last_node_at_line};
use crate::indent::IndentResult;
use crate::model::document::LineSource;
use crate::primitives::line_text;
use std::collections::{HashMap, HashSet};
use tree_sitter::Node;

/// Everything a single indent computation reads
pub struct WalkContext<'a, 't> {
    pub root: Node<'t>,
    /// Whether `root` belongs to an injected tree
    pub injected: bool,
    pub captures: &'a CaptureMap,
    pub buffer: &'a dyn LineSource,
    pub shift_width: usize,
    pub tab_size: usize,
}

/// Transient per-call state
struct IndentState {
    indent: i64,
    processed_rows: HashSet<usize>,
    /// Align directives promoted from a child onto an error-recovered node
    promoted_align: HashMap<usize, Directives>,
}

impl IndentState {
    fn new(base: usize) -> Self {
        Self {
            indent: base as i64,
            processed_rows: HashSet::new(),
            promoted_align: HashMap::new(),
        }
    }

    fn is_processed(&self, row: usize) -> bool {
        self.processed_rows.contains(&row)
    }
}

/// Outcome of the align rule for one node
enum AlignOutcome {
    /// Indent adjusted relatively; ancestors keep contributing
    Relative,
    /// Indent pinned to a delimiter column; nothing may adjust it further
    Absolute,
    /// No open delimiter: the node does not align
    Skipped,
}

impl<'a, 't> WalkContext<'a, 't> {
    fn sw(&self) -> i64 {
        self.shift_width as i64
    }

    fn is(&self, kind: CaptureKind, node: &Node<'_>) -> bool {
        self.captures.contains(kind, node)
    }

    /// Compute the indent of a 1-indexed line
    pub fn compute(&self, line: usize) -> IndentResult {
        let row = line.saturating_sub(1);
        let anchor = self.anchor(line);
        tracing::debug!(
            "Indent anchor for line {}: {} at {:?}",
            line,
            anchor.kind(),
            anchor.start_position()
        );

        if self.is(CaptureKind::Zero, &anchor) {
            return IndentResult::Column(0);
        }

        let mut state = IndentState::new(self.base_indent());
        let mut current = Some(anchor);

        while let Some(node) = current {
            let srow = node.start_position().row;
            let erow = node.end_position().row;
            let is_begin = self.is(CaptureKind::Begin, &node);
            let inside = srow < row && row <= erow;

            if !is_begin
                && !self.is(CaptureKind::Align, &node)
                && self.is(CaptureKind::Auto, &node)
                && inside
            {
                tracing::debug!("Line {} inside @indent.auto {}", line, node.kind());
                return IndentResult::Auto;
            }

            if !is_begin && self.is(CaptureKind::Ignore, &node) && inside {
                tracing::debug!("Line {} inside @indent.ignore {}", line, node.kind());
                return IndentResult::Column(0);
            }

            let parent = node.parent();
            let in_error = parent.is_some_and(|p| p.has_error());
            let should_process = !state.is_processed(srow);
            let mut processed = false;

            if should_process
                && ((self.is(CaptureKind::Branch, &node) && srow == row)
                    || (self.is(CaptureKind::Dedent, &node) && srow != row))
            {
                state.indent -= self.sw();
                processed = true;
            }

            if should_process {
                if let Some(begin) = self.captures.get(CaptureKind::Begin, &node) {
                    let spans_rows = srow != erow || in_error || begin.immediate();
                    let starts_elsewhere = srow != row || begin.start_at_same_line();
                    if spans_rows && starts_elsewhere {
                        state.indent += begin.increment.map(i64::from).unwrap_or(self.sw());
                        if !begin.propagate() {
                            processed = true;
                        }
                    }
                }
            }

            if should_process && in_error && self.align_directives(&state, &node).is_none() {
                self.promote_child_align(&mut state, &node);
            }

            if should_process && (srow != erow || in_error) && srow != row {
                let align = self.align_directives(&state, &node).cloned();
                if let Some(align) = align {
                    match self.apply_align(&mut state, &node, &align, row) {
                        AlignOutcome::Absolute => {
                            tracing::debug!(
                                "Line {} aligned to column {} by {}",
                                line,
                                state.indent,
                                node.kind()
                            );
                            return IndentResult::Column(state.indent.max(0) as usize);
                        }
                        AlignOutcome::Relative => {
                            if !align.propagate() {
                                processed = true;
                            }
                        }
                        AlignOutcome::Skipped => {}
                    }
                }
            }

            tracing::trace!(
                "{} [{}-{}] -> indent {}",
                node.kind(),
                srow,
                erow,
                state.indent
            );

            if processed {
                state.processed_rows.insert(srow);
            }
            current = parent;
        }

        IndentResult::Column(state.indent.max(0) as usize)
    }

    /// Indent the root itself sits at; non-zero only for injected trees.
    /// A host root past byte 0 still gets no base indent.
    fn base_indent(&self) -> usize {
        if !self.injected || self.root.start_byte() == 0 {
            return 0;
        }
        self.buffer
            .line_indent(self.root.start_position().row + 1, self.tab_size)
    }

    /// Node whose ancestors decide the indent of `line`
    fn anchor(&self, line: usize) -> Node<'t> {
        let text = self.buffer.line(line).unwrap_or_default();
        if !line_text::is_blank(text) {
            return first_node_at_line(self.root, self.buffer, line, None);
        }

        let Some(prev) = self.buffer.prev_nonblank(line) else {
            return first_node_at_line(self.root, self.buffer, line, None);
        };
        let prev_text = self.buffer.line(prev).unwrap_or_default();
        let mut node = last_node_at_line(self.root, self.buffer, prev, None);

        if node.kind().contains("comment") && node.start_position().row == prev - 1 {
            let indent = line_text::leading_whitespace(prev_text);
            let first = first_node_at_line(self.root, self.buffer, prev, Some(indent));
            if first.id() != node.id() {
                // Trailing comment: look at the code before it instead
                let code = prev_text
                    .get(..node.start_position().column)
                    .unwrap_or(prev_text);
                if let Some(col) = line_text::last_char_column(code) {
                    node = last_node_at_line(self.root, self.buffer, prev, Some(col));
                }
            }
        }

        let mut ancestor = Some(node);
        while let Some(candidate) = ancestor {
            if self.is(CaptureKind::End, &candidate) {
                tracing::trace!("Blank line {} follows @indent.end {}", line, candidate.kind());
                return first_node_at_line(self.root, self.buffer, line, None);
            }
            ancestor = candidate.parent();
        }

        node
    }

    fn align_directives<'s>(
        &'s self,
        state: &'s IndentState,
        node: &Node<'_>,
    ) -> Option<&'s Directives> {
        self.captures
            .get(CaptureKind::Align, node)
            .or_else(|| state.promoted_align.get(&node.id()))
    }

    /// Copy the first aligned child's directives onto an error-recovered node
    fn promote_child_align(&self, state: &mut IndentState, node: &Node<'_>) {
        let mut cursor = node.walk();
        let promoted = node
            .children(&mut cursor)
            .find_map(|child| self.captures.get(CaptureKind::Align, &child));
        if let Some(directives) = promoted {
            tracing::trace!("Promoting child @indent.align onto {}", node.kind());
            state.promoted_align.insert(node.id(), directives.clone());
        }
    }

    fn apply_align(
        &self,
        state: &mut IndentState,
        node: &Node<'t>,
        align: &Directives,
        row: usize,
    ) -> AlignOutcome {
        let Some(open) = find_delimiter(
            DelimiterEdge::Open,
            *node,
            align,
            self.captures,
            self.buffer,
        ) else {
            return AlignOutcome::Skipped;
        };
        let close = find_delimiter(
            DelimiterEdge::Close,
            *node,
            align,
            self.captures,
            self.buffer,
        );

        let open_pos = open.node.start_position();
        let close_row = close.map(|c| c.node.start_position().row);
        let close_last_in_line = close.is_some_and(|c| c.last_in_line);
        let mut absolute = false;

        if open.last_in_line && !align.align_hanging() {
            // Hanging indent: the open delimiter ends its line
            state.indent += self.sw();
            if close_last_in_line && close_row.is_some_and(|r| r < row) {
                state.indent = (state.indent - self.sw()).max(0);
            }
        } else if row > open_pos.row {
            if close_last_in_line && close_row.is_some_and(|r| r != open_pos.row && r < row) {
                // The line is past the close delimiter's own line
                state.indent = (state.indent - self.sw()).max(0);
            } else {
                state.indent = open_pos.column as i64 + i64::from(align.increment.unwrap_or(1));
                absolute = true;
            }
        }

        let closes_on_line = close_row.is_some_and(|r| r == row && r != open_pos.row);
        if closes_on_line && align.avoid_last_matching_next() {
            // Keep the closing line from lining up with the body that follows
            let open_line_indent = self.buffer.line_indent(open_pos.row + 1, self.tab_size) as i64;
            if state.indent <= open_line_indent + self.sw() {
                state.indent += self.sw();
            }
        }

        if absolute {
            AlignOutcome::Absolute
        } else {
            AlignOutcome::Relative
        }
    }
}
