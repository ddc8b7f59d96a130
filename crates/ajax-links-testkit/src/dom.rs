//! In-memory DOM handler
//!
//! Implements [`DomEffects`] over an [`Arena`]. Besides the trait surface it
//! records what the engine did (listeners attached, notifications emitted,
//! class changes) and lets tests click links and submit forms.

use crate::selector::SelectorList;
use crate::tree::{Arena, NodeId};
use ajax_links_core::effects::{ActionHandler, DomEffects};
use ajax_links_core::{ActionKind, AjaxLinksError, ElementRef, Result};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// `application/x-www-form-urlencoded` byte set
const FORM_URLENCODED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'*')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b' ');

/// Notification dispatched through [`DomEffects::emit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedEvent {
    /// Element the notification was dispatched on
    pub target: ElementRef,
    /// Notification name
    pub name: String,
    /// Payload elements
    pub payload: Vec<ElementRef>,
}

/// Class mutation performed through [`DomEffects`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassChange {
    /// Class added
    Added(ElementRef, String),
    /// Class removed
    Removed(ElementRef, String),
}

#[derive(Default)]
struct DomState {
    arena: Arena,
    listeners: HashMap<ElementRef, Vec<(ActionKind, ActionHandler)>>,
    events: Vec<EmittedEvent>,
    class_changes: Vec<ClassChange>,
}

/// Shared in-memory document
#[derive(Clone, Default)]
pub struct MemoryDom {
    state: Rc<RefCell<DomState>>,
}

impl std::fmt::Debug for MemoryDom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDom")
            .field("html", &self.document_html())
            .finish()
    }
}

fn node(element: ElementRef) -> NodeId {
    element.raw() as NodeId
}

fn element_ref(id: NodeId) -> ElementRef {
    ElementRef::new(id as u64)
}

fn parse_selector(selector: &str) -> Result<SelectorList> {
    SelectorList::parse(selector).map_err(|message| AjaxLinksError::invalid_selector(selector, message))
}

impl MemoryDom {
    /// Document parsed from `html`
    pub fn from_html(html: &str) -> Self {
        let dom = Self::default();
        dom.state
            .borrow_mut()
            .arena
            .append_html(Arena::DOCUMENT, html);
        dom
    }

    /// Serialized document
    pub fn document_html(&self) -> String {
        self.state.borrow().arena.inner_html(Arena::DOCUMENT)
    }

    /// All document matches; panics on an invalid selector
    pub fn select(&self, selector: &str) -> Vec<ElementRef> {
        self.query_document(selector)
            .unwrap_or_else(|err| panic!("bad selector in test: {err}"))
    }

    /// First document match; panics when nothing matches
    pub fn first(&self, selector: &str) -> ElementRef {
        self.select(selector)
            .first()
            .copied()
            .unwrap_or_else(|| panic!("no element matches {selector}"))
    }

    /// Serialized children of `element`
    pub fn inner_html(&self, element: ElementRef) -> String {
        self.state.borrow().arena.inner_html(node(element))
    }

    /// Text below `element`
    pub fn text(&self, element: ElementRef) -> String {
        self.state.borrow().arena.text_content(node(element))
    }

    /// Whether `element` carries `class`
    pub fn has_class(&self, element: ElementRef, class: &str) -> bool {
        self.state
            .borrow()
            .arena
            .classes(node(element))
            .contains(&class)
    }

    /// Set an attribute, as page scripts might after binding
    pub fn set_attribute(&self, element: ElementRef, name: &str, value: &str) {
        self.state
            .borrow_mut()
            .arena
            .set_attr(node(element), name, value);
    }

    /// Remove an attribute
    pub fn remove_attribute(&self, element: ElementRef, name: &str) {
        self.state
            .borrow_mut()
            .arena
            .remove_attr(node(element), name);
    }

    /// Number of handlers attached to `element`
    pub fn listener_count(&self, element: ElementRef) -> usize {
        self.state
            .borrow()
            .listeners
            .get(&element)
            .map_or(0, Vec::len)
    }

    /// Total handlers attached anywhere
    pub fn total_listeners(&self) -> usize {
        self.state.borrow().listeners.values().map(Vec::len).sum()
    }

    /// Every notification emitted so far
    pub fn events(&self) -> Vec<EmittedEvent> {
        self.state.borrow().events.clone()
    }

    /// Notifications emitted with the given name
    pub fn events_named(&self, name: &str) -> Vec<EmittedEvent> {
        self.state
            .borrow()
            .events
            .iter()
            .filter(|event| event.name == name)
            .cloned()
            .collect()
    }

    /// Every class mutation so far
    pub fn class_changes(&self) -> Vec<ClassChange> {
        self.state.borrow().class_changes.clone()
    }

    /// Click `element`. Returns `true` when a handler took over the
    /// navigation, `false` when the browser would have followed the link.
    pub fn click(&self, element: ElementRef) -> bool {
        self.fire(element, ActionKind::Click)
    }

    /// Submit the form `element`; same return convention as [`Self::click`]
    pub fn submit(&self, element: ElementRef) -> bool {
        self.fire(element, ActionKind::Submit)
    }

    fn fire(&self, element: ElementRef, action: ActionKind) -> bool {
        // handlers re-enter the DOM, so release the borrow before calling them
        let handlers: Vec<ActionHandler> = self
            .state
            .borrow()
            .listeners
            .get(&element)
            .map(|listeners| {
                listeners
                    .iter()
                    .filter(|(kind, _)| *kind == action)
                    .map(|(_, handler)| Rc::clone(handler))
                    .collect()
            })
            .unwrap_or_default();

        for handler in &handlers {
            handler();
        }
        !handlers.is_empty()
    }

    fn set_class_list(arena: &mut Arena, id: NodeId, classes: &[&str]) {
        let value = classes.join(" ");
        arena.set_attr(id, "class", &value);
    }
}

impl DomEffects for MemoryDom {
    fn query_document(&self, selector: &str) -> Result<Vec<ElementRef>> {
        let list = parse_selector(selector)?;
        let state = self.state.borrow();
        Ok(state
            .arena
            .descendants(Arena::DOCUMENT)
            .into_iter()
            .filter(|&id| list.matches(&state.arena, id))
            .map(element_ref)
            .collect())
    }

    fn query_within(&self, scope: ElementRef, selector: &str) -> Result<Vec<ElementRef>> {
        let list = parse_selector(selector)?;
        let state = self.state.borrow();
        Ok(state
            .arena
            .descendants(node(scope))
            .into_iter()
            .filter(|&id| list.matches(&state.arena, id))
            .map(element_ref)
            .collect())
    }

    fn parent(&self, element: ElementRef) -> Option<ElementRef> {
        let state = self.state.borrow();
        state
            .arena
            .parent(node(element))
            .filter(|&parent| state.arena.is_element(parent))
            .map(element_ref)
    }

    fn contains(&self, ancestor: ElementRef, element: ElementRef) -> bool {
        self.state
            .borrow()
            .arena
            .is_inclusive_descendant(node(ancestor), node(element))
    }

    fn is_connected(&self, element: ElementRef) -> bool {
        self.state.borrow().arena.is_connected(node(element))
    }

    fn attribute(&self, element: ElementRef, name: &str) -> Option<String> {
        self.state
            .borrow()
            .arena
            .attr(node(element), name)
            .map(str::to_string)
    }

    fn add_class(&self, element: ElementRef, class: &str) {
        let mut state = self.state.borrow_mut();
        let id = node(element);
        let mut classes: Vec<String> = state
            .arena
            .classes(id)
            .into_iter()
            .map(str::to_string)
            .collect();
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
            let refs: Vec<&str> = classes.iter().map(String::as_str).collect();
            Self::set_class_list(&mut state.arena, id, &refs);
        }
        state
            .class_changes
            .push(ClassChange::Added(element, class.to_string()));
    }

    fn remove_class(&self, element: ElementRef, class: &str) {
        let mut state = self.state.borrow_mut();
        let id = node(element);
        let classes: Vec<String> = state
            .arena
            .classes(id)
            .into_iter()
            .filter(|c| *c != class)
            .map(str::to_string)
            .collect();
        let refs: Vec<&str> = classes.iter().map(String::as_str).collect();
        if state.arena.attr(id, "class").is_some() {
            Self::set_class_list(&mut state.arena, id, &refs);
        }
        state
            .class_changes
            .push(ClassChange::Removed(element, class.to_string()));
    }

    fn set_inner_html(&self, element: ElementRef, html: &str) {
        let mut state = self.state.borrow_mut();
        state.arena.clear_children(node(element));
        state.arena.append_html(node(element), html);
    }

    fn append_html(&self, element: ElementRef, html: &str) -> Vec<ElementRef> {
        let mut state = self.state.borrow_mut();
        let top_level = state.arena.append_html(node(element), html);
        top_level
            .into_iter()
            .filter(|&id| state.arena.is_element(id))
            .map(element_ref)
            .collect()
    }

    fn remove(&self, element: ElementRef) {
        self.state.borrow_mut().arena.detach(node(element));
    }

    fn serialize_form(&self, form: ElementRef) -> String {
        let state = self.state.borrow();
        let arena = &state.arena;
        let mut pairs = Vec::new();

        for id in arena.descendants(node(form)) {
            let Some(tag) = arena.tag(id) else { continue };
            let Some(name) = arena.attr(id, "name").filter(|n| !n.is_empty()) else {
                continue;
            };
            if arena.attr(id, "disabled").is_some() {
                continue;
            }

            let value = match tag {
                "input" => {
                    let kind = arena.attr(id, "type").unwrap_or("text").to_ascii_lowercase();
                    match kind.as_str() {
                        "submit" | "button" | "reset" | "image" | "file" => continue,
                        "checkbox" | "radio" => {
                            if arena.attr(id, "checked").is_none() {
                                continue;
                            }
                            arena.attr(id, "value").unwrap_or("on").to_string()
                        }
                        _ => arena.attr(id, "value").unwrap_or_default().to_string(),
                    }
                }
                "textarea" => arena.text_content(id),
                "select" => {
                    let options: Vec<NodeId> = arena
                        .descendants(id)
                        .into_iter()
                        .filter(|&o| arena.tag(o) == Some("option"))
                        .collect();
                    let chosen = options
                        .iter()
                        .copied()
                        .find(|&o| arena.attr(o, "selected").is_some())
                        .or_else(|| options.first().copied());
                    match chosen {
                        Some(option) => arena
                            .attr(option, "value")
                            .map(str::to_string)
                            .unwrap_or_else(|| arena.text_content(option)),
                        None => continue,
                    }
                }
                _ => continue,
            };
            pairs.push(format!("{}={}", form_encode(name), form_encode(&value)));
        }
        pairs.join("&")
    }

    fn extract_inner_html(&self, html: &str, selector: &str) -> Result<Option<String>> {
        let list = parse_selector(selector)?;
        let mut detached = Arena::new();
        let container = detached.create_element("div");
        detached.append_html(container, html);
        Ok(detached
            .descendants(container)
            .into_iter()
            .find(|&id| list.matches(&detached, id))
            .map(|id| detached.inner_html(id)))
    }

    fn listen(&self, element: ElementRef, action: ActionKind, handler: ActionHandler) {
        self.state
            .borrow_mut()
            .listeners
            .entry(element)
            .or_default()
            .push((action, handler));
    }

    fn emit(&self, target: ElementRef, event: &str, payload: &[ElementRef]) {
        self.state.borrow_mut().events.push(EmittedEvent {
            target,
            name: event.to_string(),
            payload: payload.to_vec(),
        });
    }
}

fn form_encode(token: &str) -> String {
    utf8_percent_encode(token, FORM_URLENCODED)
        .to_string()
        .replace(' ', "+")
}
