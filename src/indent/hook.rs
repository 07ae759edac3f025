//! Per-buffer indent hook registration
//!
//! A buffer switched to tree-driven indentation remembers the indent
//! expression it had before, so detaching puts the editor back exactly where
//! it was.

use crate::model::document::BufferId;
use std::collections::HashMap;

/// Buffers whose indent hook is routed to the indent calculator
#[derive(Debug, Default)]
pub struct IndentHooks {
    /// Previously configured indent expression per attached buffer
    attached: HashMap<BufferId, Option<String>>,
}

impl IndentHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a buffer's indent hook to the calculator.
    ///
    /// Attaching twice keeps the first saved expression; the second
    /// `previous` would already be the calculator's own hook.
    pub fn attach(&mut self, buffer: BufferId, previous: Option<String>) {
        if self.attached.contains_key(&buffer) {
            tracing::debug!("Indent hook already attached to {:?}", buffer);
            return;
        }
        tracing::debug!("Attaching indent hook to {:?}", buffer);
        self.attached.insert(buffer, previous);
    }

    /// Restore a buffer's previous hook and return it.
    ///
    /// `None` when the buffer was never attached; `Some(None)` when it had no
    /// expression before.
    pub fn detach(&mut self, buffer: BufferId) -> Option<Option<String>> {
        let previous = self.attached.remove(&buffer);
        if previous.is_some() {
            tracing::debug!("Detached indent hook from {:?}", buffer);
        }
        previous
    }

    pub fn is_attached(&self, buffer: BufferId) -> bool {
        self.attached.contains_key(&buffer)
    }

    pub fn len(&self) -> usize {
        self.attached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }
}
