//! Data model shared by the interceptor, history bridge and engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to a DOM element, minted by a [`DomEffects`](crate::effects::DomEffects)
/// implementation. Equal handles name the same element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementRef(u64);

impl ElementRef {
    /// Wrap a raw handle value
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw handle value
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element#{}", self.0)
    }
}

/// Native action an element performs when activated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Anchor click
    Click,
    /// Form submission
    Submit,
}

impl ActionKind {
    /// DOM event name for this action
    pub fn event_name(self) -> &'static str {
        match self {
            ActionKind::Click => "click",
            ActionKind::Submit => "submit",
        }
    }
}

/// One intercepted navigation, consumed immediately by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    /// Selector naming where fetched content is merged
    pub target_selector: String,
    /// Fetch URL, including merged query parameters
    pub href: String,
    /// Link that triggered the request; forms never set this
    pub originating_element: Option<ElementRef>,
}

impl NavigationRequest {
    /// Create a request without an originating element
    pub fn new(target_selector: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            target_selector: target_selector.into(),
            href: href.into(),
            originating_element: None,
        }
    }

    /// Attach the originating element
    pub fn with_origin(mut self, origin: ElementRef) -> Self {
        self.originating_element = Some(origin);
        self
    }
}

/// Entry written to the history stack by the bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Target selector to restore on traversal
    pub target: String,
    /// URL the entry represents
    pub url: String,
    /// Link that created the entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub originating_element: Option<ElementRef>,
}

/// Current history state as reported by a [`HistoryEffects`](crate::effects::HistoryEffects)
/// implementation
///
/// `target` is `None` for the first entry of a page load and for entries
/// written by anyone other than the bridge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryState {
    /// Target selector carried by the entry
    pub target: Option<String>,
    /// Originating element carried by the entry
    pub originating_element: Option<ElementRef>,
    /// Visible URL of the entry
    pub clean_url: String,
}

impl HistoryState {
    /// State for an entry the bridge does not own
    pub fn untracked(clean_url: impl Into<String>) -> Self {
        Self {
            target: None,
            originating_element: None,
            clean_url: clean_url.into(),
        }
    }

    /// State for an entry carrying `entry`'s data
    pub fn from_entry(entry: &HistoryEntry) -> Self {
        Self {
            target: Some(entry.target.clone()),
            originating_element: entry.originating_element,
            clean_url: entry.url.clone(),
        }
    }
}

/// Response reduced to the content that gets merged
///
/// A missing body reaches the engine as `""`, so one predicate covers the
/// missing, zero-length and whitespace-only cases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment(String);

impl Fragment {
    /// Fragment holding `html`
    pub fn new(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    /// True when there is nothing worth merging
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Fragment markup
    pub fn as_html(&self) -> &str {
        &self.0
    }
}

/// Terminal state of one navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The fragment was merged and the interceptor re-applied
    Merged {
        /// Target the fragment went into
        target: ElementRef,
    },
    /// A full browser navigation was issued instead
    FallbackNavigated {
        /// URL navigated to
        href: String,
        /// Why the in-page merge was abandoned
        reason: FallbackReason,
    },
}

/// Why a navigation degraded to a full page load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// No page element matched the target selector
    TargetMissing,
    /// The fetched fragment was empty
    EmptyFragment,
    /// The transport failed
    FetchFailed,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                FallbackReason::TargetMissing => "target missing",
                FallbackReason::EmptyFragment => "empty fragment",
                FallbackReason::FetchFailed => "fetch failed",
            }
        )
    }
}
