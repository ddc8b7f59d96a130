//! # ajax-links
//!
//! Turns plain links and forms inside a root element into in-place fragment
//! loads. Markup opts in with a target attribute naming where the fetched
//! content goes:
//!
//! ```html
//! <div class="content-wrap" data-bsp-ajax-links>
//!     <div class="content">
//!         <a href="page2.html" data-ajax-link-target=".content">Next</a>
//!     </div>
//! </div>
//! ```
//!
//! Clicking the link fetches `page2.html`, finds `.content` in the response
//! and replaces the page's `.content` with it. `append` and `loadMore` merge
//! strategies grow the target instead, and `history_replace` routes every
//! navigation through browser history so back/forward re-fetch.
//!
//! The browser is reached only through [`ajax_links_core::effects`]; pass any
//! [`HostEffects`] implementation to [`AjaxLinks::init`].

mod bridge;
mod context;
mod engine;
mod interceptor;

pub use ajax_links_core::{
    effects, params, ActionKind, AjaxLinksError, ElementRef, FallbackReason, FetchError, Fragment,
    HistoryEntry, HistoryState, LoadType, NavigationOutcome, NavigationRequest, Settings,
    SettingsOverrides,
};
pub use interceptor::form_href;

use ajax_links_core::effects::HostEffects;
use context::Shared;
use futures::future::LocalBoxFuture;
use std::rc::Rc;

/// One engine instance bound to one root element
///
/// Instances are independent: each owns its settings and the set of elements
/// it has bound. Dropping the handle disables its handlers.
pub struct AjaxLinks<H: HostEffects + 'static> {
    shared: Rc<Shared<H>>,
}

impl<H: HostEffects + 'static> AjaxLinks<H> {
    /// Resolve `overrides` and start intercepting under `root`.
    pub fn init(root: ElementRef, overrides: SettingsOverrides, host: H) -> Self {
        Self::with_settings(root, Settings::resolve(overrides), host)
    }

    /// Start intercepting under `root` with already-resolved settings.
    pub fn with_settings(root: ElementRef, settings: Settings, host: H) -> Self {
        tracing::debug!(root = %root, load_type = %settings.load_type, "initializing ajax links");
        let shared = Rc::new(Shared::new(root, settings, host));

        if shared.settings.history_replace {
            bridge::enable(&shared);
        }
        interceptor::activate(&shared, &[root]);

        Self { shared }
    }

    /// Run `request` in the background.
    pub fn navigate(&self, request: NavigationRequest) {
        engine::navigate(&self.shared, request);
    }

    /// Run the synchronous part of `request` now and return a future that
    /// completes the navigation.
    pub fn load(&self, request: NavigationRequest) -> LocalBoxFuture<'static, NavigationOutcome> {
        engine::load(&self.shared, request)
    }

    /// Bind navigable elements around `context`, as done after every merge.
    pub fn activate(&self, context: &[ElementRef]) {
        interceptor::activate(&self.shared, context);
    }

    /// Resolved settings
    pub fn settings(&self) -> &Settings {
        &self.shared.settings
    }

    /// Root element
    pub fn root(&self) -> ElementRef {
        self.shared.root
    }

    /// Host effects handler
    pub fn host(&self) -> &H {
        &self.shared.host
    }

    /// Whether this instance has bound `element`
    pub fn is_bound(&self, element: ElementRef) -> bool {
        self.shared.is_bound(element)
    }

    /// Number of elements this instance has bound
    pub fn bound_count(&self) -> usize {
        self.shared.bound_count()
    }
}

impl<H: HostEffects + 'static> std::fmt::Debug for AjaxLinks<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AjaxLinks")
            .field("root", &self.shared.root)
            .field("settings", &self.shared.settings)
            .field("bound", &self.shared.bound_count())
            .finish()
    }
}
