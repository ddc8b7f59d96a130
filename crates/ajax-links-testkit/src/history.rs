//! In-memory history stack
//!
//! Follows the [`HistoryEffects`] notification contract: pushes and
//! traversal notify subscribers, replaces do not.

use ajax_links_core::effects::{HistoryEffects, StateListener};
use ajax_links_core::{HistoryEntry, HistoryState, Result};
use std::cell::RefCell;
use std::rc::Rc;

/// Write performed through [`HistoryEffects`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryOp {
    /// `push_state`
    Push(HistoryEntry),
    /// `replace_state`
    Replace(HistoryEntry),
}

struct Stack {
    entries: Vec<HistoryState>,
    index: usize,
    ops: Vec<HistoryOp>,
    listeners: Vec<StateListener>,
}

/// Shared history stack
#[derive(Clone)]
pub struct MemoryHistory {
    stack: Rc<RefCell<Stack>>,
}

impl std::fmt::Debug for MemoryHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stack = self.stack.borrow();
        f.debug_struct("MemoryHistory")
            .field("entries", &stack.entries)
            .field("index", &stack.index)
            .finish()
    }
}

impl MemoryHistory {
    /// Stack holding one untracked entry for `initial_url`
    pub fn new(initial_url: &str) -> Self {
        Self {
            stack: Rc::new(RefCell::new(Stack {
                entries: vec![HistoryState::untracked(initial_url)],
                index: 0,
                ops: Vec::new(),
                listeners: Vec::new(),
            })),
        }
    }

    /// Step back one entry and notify. Returns `false` at the start.
    pub fn back(&self) -> bool {
        let moved = {
            let mut stack = self.stack.borrow_mut();
            if stack.index == 0 {
                false
            } else {
                stack.index -= 1;
                true
            }
        };
        if moved {
            self.notify();
        }
        moved
    }

    /// Step forward one entry and notify. Returns `false` at the end.
    pub fn forward(&self) -> bool {
        let moved = {
            let mut stack = self.stack.borrow_mut();
            if stack.index + 1 >= stack.entries.len() {
                false
            } else {
                stack.index += 1;
                true
            }
        };
        if moved {
            self.notify();
        }
        moved
    }

    /// Writes in order
    pub fn ops(&self) -> Vec<HistoryOp> {
        self.stack.borrow().ops.clone()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.stack.borrow().entries.len()
    }

    /// Always `false`; a stack starts with one entry
    pub fn is_empty(&self) -> bool {
        self.stack.borrow().entries.is_empty()
    }

    /// Current entry
    pub fn current(&self) -> HistoryState {
        let stack = self.stack.borrow();
        stack.entries[stack.index].clone()
    }

    /// Number of subscribers
    pub fn subscriber_count(&self) -> usize {
        self.stack.borrow().listeners.len()
    }

    fn notify(&self) {
        let listeners = self.stack.borrow().listeners.clone();
        for listener in listeners {
            listener();
        }
    }
}

impl HistoryEffects for MemoryHistory {
    fn state(&self) -> Result<HistoryState> {
        Ok(self.current())
    }

    fn push_state(&self, entry: &HistoryEntry, _title: &str) -> Result<()> {
        {
            let mut stack = self.stack.borrow_mut();
            let keep = stack.index + 1;
            stack.entries.truncate(keep);
            stack.entries.push(HistoryState::from_entry(entry));
            stack.index = keep;
            stack.ops.push(HistoryOp::Push(entry.clone()));
        }
        self.notify();
        Ok(())
    }

    fn replace_state(&self, entry: &HistoryEntry, _title: &str) -> Result<()> {
        let mut stack = self.stack.borrow_mut();
        let index = stack.index;
        stack.entries[index] = HistoryState::from_entry(entry);
        stack.ops.push(HistoryOp::Replace(entry.clone()));
        Ok(())
    }

    fn subscribe(&self, listener: StateListener) {
        self.stack.borrow_mut().listeners.push(listener);
    }
}
