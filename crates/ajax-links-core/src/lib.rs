//! # ajax-links core
//!
//! Settings, the query-string codec, the navigation data model and the effect
//! traits behind which the browser is hidden. The engine itself lives in the
//! `ajax-links` crate.

pub mod effects;
pub mod errors;
pub mod params;
pub mod settings;
pub mod types;

pub use errors::{AjaxLinksError, FetchError, Result};
pub use params::ParamMap;
pub use settings::{LoadType, Settings, SettingsOverrides};
pub use types::{
    ActionKind, ElementRef, FallbackReason, Fragment, HistoryEntry, HistoryState,
    NavigationOutcome, NavigationRequest,
};
