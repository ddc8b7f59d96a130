//! Action interceptor
//!
//! Finds elements flagged with the target attribute, classifies each as a link
//! or a form and replaces its native action with a navigation request.
//!
//! A scan always starts from the **parent** of the first context element. After
//! a merge the context is the freshly inserted content, and its container may
//! be the element carrying the target attribute.

use crate::context::Shared;
use crate::{bridge, engine};
use ajax_links_core::effects::{ActionHandler, HostEffects};
use ajax_links_core::{params, ActionKind, ElementRef, NavigationRequest};
use std::rc::Rc;

/// How a bound element navigates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BindingKind {
    /// Anchor: the `href` is read at click time
    Link,
    /// Form: the `action` plus serialized fields are read at submit time
    Form,
}

impl BindingKind {
    fn action(self) -> ActionKind {
        match self {
            BindingKind::Link => ActionKind::Click,
            BindingKind::Form => ActionKind::Submit,
        }
    }
}

/// Handler state for one bound element
///
/// Holds no href or target: both are re-read from the element every time it
/// fires, since markup may change after binding.
#[derive(Debug, Clone, Copy)]
struct ActionBinding {
    element: ElementRef,
    kind: BindingKind,
}

impl ActionBinding {
    /// `None` when the element has neither `href` nor `action`.
    fn classify<H: HostEffects>(host: &H, element: ElementRef) -> Option<Self> {
        let kind = if has_value(host.attribute(element, "href")) {
            BindingKind::Link
        } else if has_value(host.attribute(element, "action")) {
            BindingKind::Form
        } else {
            return None;
        };
        Some(Self { element, kind })
    }

    fn fire<H: HostEffects + 'static>(&self, shared: &Rc<Shared<H>>) {
        let host = &shared.host;
        let attribute = &shared.settings.target_attribute_name;

        let request = match self.kind {
            BindingKind::Link => {
                let Some(href) = host.attribute(self.element, "href").filter(|h| !h.is_empty())
                else {
                    tracing::trace!(element = %self.element, "link lost its href; ignoring click");
                    return;
                };
                let Some(target) = host.attribute(self.element, attribute) else {
                    tracing::warn!(element = %self.element, %href, "link lost its target; navigating");
                    host.assign(&href);
                    return;
                };
                NavigationRequest::new(target, href).with_origin(self.element)
            }
            BindingKind::Form => {
                let Some(action) = host.attribute(self.element, "action") else {
                    tracing::trace!(element = %self.element, "form lost its action; ignoring submit");
                    return;
                };
                let href = form_href(&action, &host.serialize_form(self.element));
                let Some(target) = host.attribute(self.element, attribute) else {
                    tracing::warn!(element = %self.element, %href, "form lost its target; navigating");
                    host.assign(&href);
                    return;
                };
                NavigationRequest::new(target, href)
            }
        };

        if shared.settings.history_replace {
            let NavigationRequest {
                target_selector,
                href,
                originating_element,
            } = request;
            if let Err(err) = bridge::push(shared, &target_selector, &href, originating_element) {
                tracing::warn!(error = %err, "history push failed; loading directly");
                engine::navigate(
                    shared,
                    NavigationRequest {
                        target_selector,
                        href,
                        originating_element,
                    },
                );
            }
        } else {
            engine::navigate(shared, request);
        }
    }
}

/// Scan the parent of `context[0]` and bind every new candidate inside the
/// root, then emit the loaded notification carrying `context`.
pub(crate) fn activate<H: HostEffects + 'static>(shared: &Rc<Shared<H>>, context: &[ElementRef]) {
    let host = &shared.host;
    let settings = &shared.settings;

    // merges detach earlier content; its handles are dead
    let dropped = shared.prune_bound(|element| host.is_connected(element));
    if dropped > 0 {
        tracing::trace!(dropped, "forgot detached elements");
    }

    if let Some(&first) = context.first() {
        let scope = host.parent(first).unwrap_or(first);
        let selector = settings.target_attribute_selector();
        match host.query_within(scope, &selector) {
            Ok(mut candidates) => {
                if scope == first && host.attribute(first, &settings.target_attribute_name).is_some()
                {
                    candidates.insert(0, first);
                }
                let fresh = candidates
                    .into_iter()
                    .filter(|&element| host.contains(shared.root, element))
                    .filter(|&element| bind(shared, element))
                    .count();
                tracing::debug!(scope = %scope, fresh, "scanned for navigable elements");
            }
            Err(err) => tracing::warn!(error = %err, "scan failed"),
        }
    }

    host.emit(shared.root, &settings.loaded_event_name, context);
}

/// Attach a handler to `element` unless it is already bound or not a
/// candidate. Returns whether a handler was attached.
fn bind<H: HostEffects + 'static>(shared: &Rc<Shared<H>>, element: ElementRef) -> bool {
    if shared.is_bound(element) {
        return false;
    }
    let Some(binding) = ActionBinding::classify(&shared.host, element) else {
        tracing::trace!(element = %element, "no href or action; not navigable");
        return false;
    };
    shared.mark_bound(element);

    let weak = Rc::downgrade(shared);
    let handler: ActionHandler = Rc::new(move || {
        if let Some(shared) = weak.upgrade() {
            binding.fire(&shared);
        }
    });
    shared.host.listen(element, binding.kind.action(), handler);
    true
}

/// Build a form's fetch URL: the action's path, then the action's own params
/// overlaid with the submitted fields.
pub fn form_href(action: &str, form_data: &str) -> String {
    let (path, query) = params::split_href(action);
    let base = params::parse(query.unwrap_or_default());
    let merged = params::merge(&base, &params::parse(form_data));
    format!("{path}?{}", params::serialize(&merged))
}

fn has_value(attribute: Option<String>) -> bool {
    attribute.is_some_and(|value| !value.is_empty())
}
