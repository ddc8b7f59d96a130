//! History bridge
//!
//! With `history_replace` on, intercepted actions write history instead of
//! fetching. The fetch happens when the history collaborator echoes the state
//! change back, which also makes back/forward re-fetch earlier states.

use crate::context::Shared;
use crate::engine;
use ajax_links_core::effects::{HostEffects, StateListener};
use ajax_links_core::{ElementRef, HistoryEntry, NavigationRequest, Result};
use std::rc::Rc;

/// Subscribe the instance to state-change notifications.
pub(crate) fn enable<H: HostEffects + 'static>(shared: &Rc<Shared<H>>) {
    let weak = Rc::downgrade(shared);
    let listener: StateListener = Rc::new(move || {
        if let Some(shared) = weak.upgrade() {
            on_state_change(&shared);
        }
    });
    shared.host.subscribe(listener);
}

fn on_state_change<H: HostEffects + 'static>(shared: &Rc<Shared<H>>) {
    let state = match shared.host.state() {
        Ok(state) => state,
        Err(err) => {
            tracing::warn!(error = %err, "history state unreadable");
            return;
        }
    };

    // home entries and foreign navigation carry no target
    let Some(target) = state.target else {
        tracing::trace!(url = %state.clean_url, "state without target; ignoring");
        return;
    };

    engine::navigate(
        shared,
        NavigationRequest {
            target_selector: target,
            href: state.clean_url,
            originating_element: state.originating_element,
        },
    );
}

/// Record a navigation in history.
///
/// The first push of a page load rewrites the current entry to carry
/// `target` as well, so traversing back to it restores the page in place.
pub(crate) fn push<H: HostEffects>(
    shared: &Rc<Shared<H>>,
    target: &str,
    href: &str,
    origin: Option<ElementRef>,
) -> Result<()> {
    let host = &shared.host;
    let current = host.state()?;

    if current.target.is_none() {
        tracing::debug!(url = %current.clean_url, "synthesizing home entry");
        host.replace_state(
            &HistoryEntry {
                target: target.to_string(),
                url: current.clean_url,
                originating_element: None,
            },
            "",
        )?;
    }

    host.push_state(
        &HistoryEntry {
            target: target.to_string(),
            url: href.to_string(),
            originating_element: origin,
        },
        "",
    )
}
