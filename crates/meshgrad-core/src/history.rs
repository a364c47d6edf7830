use std::collections::VecDeque;

use crate::config::DEFAULT_HISTORY_LIMIT;
use crate::state::MeshState;

/// A full-state snapshot tagged with the action that replaced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub label: &'static str,
    pub state: MeshState,
}

/// Linear undo/redo timeline: `past | present | future`.
///
/// `past` runs oldest to newest; `future` holds redo candidates with the next
/// one at the front. Each stack is capped at `limit`, dropping the oldest entry.
#[derive(Debug, Clone)]
pub struct History {
    past: VecDeque<Snapshot>,
    future: VecDeque<Snapshot>,
    limit: usize,
}

impl History {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    /// Record the pre-mutation state. Any new action invalidates the redo stack.
    pub fn record(&mut self, label: &'static str, previous: MeshState) {
        self.past.push_back(Snapshot {
            label,
            state: previous,
        });
        if self.past.len() > self.limit {
            self.past.pop_front();
        }
        self.future.clear();
    }

    /// Step back. Returns the state to restore, or `None` when there is nothing to undo.
    pub fn undo(&mut self, current: MeshState) -> Option<MeshState> {
        let Snapshot { label, state } = self.past.pop_back()?;
        self.future.push_front(Snapshot {
            label,
            state: current,
        });
        if self.future.len() > self.limit {
            self.future.pop_back();
        }
        Some(state)
    }

    /// Step forward. Returns the state to restore, or `None` when there is nothing to redo.
    pub fn redo(&mut self, current: MeshState) -> Option<MeshState> {
        let Snapshot { label, state } = self.future.pop_front()?;
        self.past.push_back(Snapshot {
            label,
            state: current,
        });
        if self.past.len() > self.limit {
            self.past.pop_front();
        }
        Some(state)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_label(&self) -> Option<&str> {
        self.past.back().map(|s| s.label)
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.future.front().map(|s| s.label)
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
