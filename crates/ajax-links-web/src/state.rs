//! History state stored in `history.state`
//!
//! Entries are JSON strings. Element references only mean something within
//! the page load that created them, so each entry records the session token
//! of that load and the scope of the instance that wrote it.

use ajax_links_core::{ElementRef, HistoryEntry, HistoryState};
use serde::{Deserialize, Serialize};

/// Serialized form of an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredState {
    pub target: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub originating_element: Option<ElementRef>,
    pub scope: u64,
    pub session: String,
}

impl StoredState {
    pub(crate) fn new(entry: &HistoryEntry, scope: ElementRef, session: &str) -> Self {
        Self {
            target: entry.target.clone(),
            url: entry.url.clone(),
            originating_element: entry.originating_element,
            scope: scope.raw(),
            session: session.to_string(),
        }
    }

    pub(crate) fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// `None` for anything this crate did not write.
    pub(crate) fn from_json(json: &str) -> Option<Self> {
        serde_json::from_str(json).ok()
    }

    /// View of the entry for the instance scoped to `scope` in `session`.
    ///
    /// Entries of other instances read as untracked; entries of an earlier
    /// page load lose their element reference.
    pub(crate) fn view(self, scope: ElementRef, session: &str, current_url: &str) -> HistoryState {
        if self.scope != scope.raw() {
            return HistoryState::untracked(current_url);
        }
        let originating_element = if self.session == session {
            self.originating_element
        } else {
            None
        };
        HistoryState {
            target: Some(self.target),
            originating_element,
            clean_url: self.url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(origin: Option<ElementRef>) -> HistoryEntry {
        HistoryEntry {
            target: ".content".to_string(),
            url: "/page2".to_string(),
            originating_element: origin,
        }
    }

    #[test]
    fn same_session_keeps_origin() {
        let root = ElementRef::new(1);
        let stored = StoredState::new(&entry(Some(ElementRef::new(7))), root, "s1");
        let json = stored.to_json().unwrap();
        let state = StoredState::from_json(&json).unwrap().view(root, "s1", "/now");

        assert_eq!(state.target.as_deref(), Some(".content"));
        assert_eq!(state.originating_element, Some(ElementRef::new(7)));
        assert_eq!(state.clean_url, "/page2");
    }

    #[test]
    fn other_session_drops_origin() {
        let root = ElementRef::new(1);
        let stored = StoredState::new(&entry(Some(ElementRef::new(7))), root, "s1");
        let state = stored.view(root, "s2", "/now");

        assert_eq!(state.target.as_deref(), Some(".content"));
        assert_eq!(state.originating_element, None);
    }

    #[test]
    fn other_scope_reads_untracked() {
        let stored = StoredState::new(&entry(None), ElementRef::new(1), "s1");
        let state = stored.view(ElementRef::new(2), "s1", "/now");

        assert_eq!(state, HistoryState::untracked("/now"));
    }

    #[test]
    fn foreign_state_is_ignored() {
        assert_eq!(StoredState::from_json(r#"{"page":3}"#), None);
        assert_eq!(StoredState::from_json("not json"), None);
    }
}
