//! Transclusion engine
//!
//! Runs one [`NavigationRequest`]: resolve the target, mark it loading, apply
//! the pre-fetch mutation, fetch, reduce the response to a fragment and merge
//! it. Everything up to the fetch runs synchronously in the caller; the rest
//! is a task on the host's spawner.
//!
//! ```text
//! idle → loading → merged
//!                → fallback-navigated
//! ```

use crate::context::Shared;
use crate::interceptor;
use ajax_links_core::effects::HostEffects;
use ajax_links_core::{
    params, ElementRef, FallbackReason, Fragment, LoadType, NavigationOutcome, NavigationRequest,
};
use futures::future::{self, FutureExt, LocalBoxFuture};
use std::rc::Rc;

/// Fire-and-forget navigation.
pub(crate) fn navigate<H: HostEffects + 'static>(
    shared: &Rc<Shared<H>>,
    request: NavigationRequest,
) {
    let completion = load(shared, request);
    shared.host.spawn_local(completion.map(drop).boxed_local());
}

/// Run the synchronous half of a navigation and return its completion.
pub(crate) fn load<H: HostEffects + 'static>(
    shared: &Rc<Shared<H>>,
    request: NavigationRequest,
) -> LocalBoxFuture<'static, NavigationOutcome> {
    let host = &shared.host;
    let settings = &shared.settings;

    let Some(target) = resolve_target(shared, &request.target_selector) else {
        let outcome = fall_back(shared, &request.href, FallbackReason::TargetMissing);
        return future::ready(outcome).boxed_local();
    };

    host.add_class(target, &settings.loading_class);
    host.emit(shared.root, &settings.loading_event_name, &[target]);

    match settings.load_type {
        LoadType::Replace => host.set_inner_html(target, ""),
        LoadType::Append => {}
        LoadType::LoadMore => {
            // the clicked affordance goes before the fetch so it cannot be clicked twice
            if let Some(origin) = request.originating_element {
                host.remove(origin);
            }
        }
    }

    let url = params::append_params(&request.href, &settings.extra_params);
    tracing::debug!(
        selector = %request.target_selector,
        %url,
        load_type = %settings.load_type,
        "loading fragment"
    );

    let shared = Rc::clone(shared);
    async move {
        let body = match shared.host.get_html(&url).await {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(error = %err, "fragment fetch failed");
                return fall_back(&shared, &request.href, FallbackReason::FetchFailed);
            }
        };

        let fragment = reduce(&shared, &request.target_selector, body);
        if fragment.is_empty() {
            return fall_back(&shared, &request.href, FallbackReason::EmptyFragment);
        }

        merge(&shared, target, &fragment);
        NavigationOutcome::Merged { target }
    }
    .boxed_local()
}

/// The last document match wins, so pages that repeat a target keep
/// growing the newest one.
fn resolve_target<H: HostEffects>(shared: &Shared<H>, selector: &str) -> Option<ElementRef> {
    match shared.host.query_document(selector) {
        Ok(matches) => matches.last().copied(),
        Err(err) => {
            tracing::warn!(error = %err, "target selector rejected");
            None
        }
    }
}

/// Reduce a response body to the fragment that gets merged.
fn reduce<H: HostEffects>(shared: &Shared<H>, selector: &str, body: String) -> Fragment {
    if !shared.settings.full_page_ajax {
        return Fragment::new(body);
    }
    match shared.host.extract_inner_html(&body, selector) {
        Ok(Some(inner)) => Fragment::new(inner),
        Ok(None) => {
            // fullPageAjax is on but the server sent a partial
            tracing::debug!(%selector, "target absent from response; using whole body");
            Fragment::new(body)
        }
        Err(err) => {
            tracing::warn!(error = %err, "response could not be searched; using whole body");
            Fragment::new(body)
        }
    }
}

fn merge<H: HostEffects + 'static>(shared: &Rc<Shared<H>>, target: ElementRef, fragment: &Fragment) {
    let host = &shared.host;
    let settings = &shared.settings;

    host.remove_class(target, &settings.loading_class);

    match settings.load_type {
        LoadType::Replace => {
            host.set_inner_html(target, fragment.as_html());
            interceptor::activate(shared, &[target]);
        }
        LoadType::Append => {
            let inserted = host.append_html(target, fragment.as_html());
            activate_inserted(shared, target, &inserted);
        }
        LoadType::LoadMore => {
            match host.query_within(shared.root, &settings.load_more_selector()) {
                Ok(stale) => stale.into_iter().for_each(|element| host.remove(element)),
                Err(err) => tracing::warn!(error = %err, "load-more selector rejected"),
            }
            let inserted = host.append_html(target, fragment.as_html());
            activate_inserted(shared, target, &inserted);
        }
    }

    tracing::debug!(target_element = %target, load_type = %settings.load_type, "fragment merged");
}

/// Text-only fragments insert no elements; scan the target instead so the
/// loaded notification still fires.
fn activate_inserted<H: HostEffects + 'static>(
    shared: &Rc<Shared<H>>,
    target: ElementRef,
    inserted: &[ElementRef],
) {
    if inserted.is_empty() {
        interceptor::activate(shared, &[target]);
    } else {
        interceptor::activate(shared, inserted);
    }
}

fn fall_back<H: HostEffects>(shared: &Shared<H>, href: &str, reason: FallbackReason) -> NavigationOutcome {
    tracing::warn!(%href, %reason, "falling back to full navigation");
    shared.host.assign(href);
    NavigationOutcome::FallbackNavigated {
        href: href.to_string(),
        reason,
    }
}
