//! History effect interface
//!
//! Mirrors the subset of a history library the bridge relies on. Notification
//! semantics: `push_state` and stack traversal notify subscribers,
//! `replace_state` does not.

use crate::errors::Result;
use crate::types::{HistoryEntry, HistoryState};
use std::rc::Rc;

/// Callback run after the current history state changes
pub type StateListener = Rc<dyn Fn()>;

/// Browser history abstraction
pub trait HistoryEffects {
    /// Current state and its visible URL
    fn state(&self) -> Result<HistoryState>;

    /// Push a new entry at `entry.url` and notify subscribers
    fn push_state(&self, entry: &HistoryEntry, title: &str) -> Result<()>;

    /// Overwrite the current entry without notifying subscribers
    fn replace_state(&self, entry: &HistoryEntry, title: &str) -> Result<()>;

    /// Register for state-change notifications
    fn subscribe(&self, listener: StateListener);
}
