//! Effect handlers over `web-sys`

use crate::error::{dom_error, js_message, WebError, WebResult};
use crate::registry::ElementRegistry;
use crate::state::StoredState;
use ajax_links_core::effects::{
    ActionHandler, DomEffects, FetchEffects, HistoryEffects, LocationEffects, StateListener,
    TaskSpawner,
};
use ajax_links_core::{
    ActionKind, AjaxLinksError, ElementRef, FetchError, HistoryEntry, HistoryState, Result,
};
use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    CustomEvent, CustomEventInit, Document, Element, Event, FormData, HtmlFormElement,
    HtmlTemplateElement, NodeList, Response, UrlSearchParams, Window,
};

struct Inner {
    window: Window,
    document: Document,
    elements: Rc<ElementRegistry>,
    session: String,
    scope: ElementRef,
    listeners: RefCell<Vec<StateListener>>,
    popstate_installed: Cell<bool>,
}

/// Browser host for one engine instance
///
/// The element registry is shared by every host on the page. History
/// subscribers are per host, and history entries are tagged with the host's
/// scope so instances only react to their own entries.
#[derive(Clone)]
pub struct WebHost {
    inner: Rc<Inner>,
}

impl std::fmt::Debug for WebHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebHost")
            .field("scope", &self.inner.scope)
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}

impl WebHost {
    /// Host for the instance rooted at `scope`
    pub fn new(elements: Rc<ElementRegistry>, session: String, scope: ElementRef) -> WebResult<Self> {
        let window = web_sys::window().ok_or(WebError::NoWindow)?;
        let document = window.document().ok_or(WebError::NoWindow)?;
        Ok(Self {
            inner: Rc::new(Inner {
                window,
                document,
                elements,
                session,
                scope,
                listeners: RefCell::new(Vec::new()),
                popstate_installed: Cell::new(false),
            }),
        })
    }

    fn element(&self, handle: ElementRef) -> Option<Element> {
        let element = self.inner.elements.resolve(handle);
        if element.is_none() {
            tracing::trace!(element = %handle, "unknown element handle");
        }
        element
    }

    fn collect(&self, list: &NodeList) -> Vec<ElementRef> {
        (0..list.length())
            .filter_map(|index| list.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| self.inner.elements.intern(&element))
            .collect()
    }

    fn template(&self, html: &str) -> Result<HtmlTemplateElement> {
        let template = self
            .inner
            .document
            .create_element("template")
            .map_err(|err| dom_error("create template", &err))?
            .dyn_into::<HtmlTemplateElement>()
            .map_err(|_| AjaxLinksError::dom("template element unavailable"))?;
        template.set_inner_html(html);
        Ok(template)
    }

    fn history(&self) -> Result<web_sys::History> {
        self.inner
            .window
            .history()
            .map_err(|err| AjaxLinksError::history(js_message(&err)))
    }

    fn current_url(&self) -> String {
        self.inner.window.location().href().unwrap_or_default()
    }

    fn install_popstate(&self) {
        if self.inner.popstate_installed.replace(true) {
            return;
        }
        let weak: Weak<Inner> = Rc::downgrade(&self.inner);
        let on_popstate: Closure<dyn Fn(Event)> = Closure::new(move |_event: Event| {
            if let Some(inner) = weak.upgrade() {
                notify(&inner);
            }
        });
        if let Err(err) = self
            .inner
            .window
            .add_event_listener_with_callback("popstate", on_popstate.as_ref().unchecked_ref())
        {
            tracing::warn!(error = %js_message(&err), "popstate listener rejected");
        }
        on_popstate.forget();
    }

    fn write_state(&self, entry: &HistoryEntry, title: &str, push: bool) -> Result<()> {
        let stored = StoredState::new(entry, self.inner.scope, &self.inner.session);
        let json = stored
            .to_json()
            .map_err(|err| AjaxLinksError::history(err.to_string()))?;
        let history = self.history()?;
        let data = JsValue::from_str(&json);
        let written = if push {
            history.push_state_with_url(&data, title, Some(&entry.url))
        } else {
            history.replace_state_with_url(&data, title, Some(&entry.url))
        };
        written.map_err(|err| AjaxLinksError::history(js_message(&err)))
    }
}

fn notify(inner: &Inner) {
    let listeners = inner.listeners.borrow().clone();
    for listener in listeners {
        listener();
    }
}

impl DomEffects for WebHost {
    fn query_document(&self, selector: &str) -> Result<Vec<ElementRef>> {
        let list = self
            .inner
            .document
            .query_selector_all(selector)
            .map_err(|err| AjaxLinksError::invalid_selector(selector, js_message(&err)))?;
        Ok(self.collect(&list))
    }

    fn query_within(&self, scope: ElementRef, selector: &str) -> Result<Vec<ElementRef>> {
        let Some(scope) = self.element(scope) else {
            return Ok(Vec::new());
        };
        let list = scope
            .query_selector_all(selector)
            .map_err(|err| AjaxLinksError::invalid_selector(selector, js_message(&err)))?;
        Ok(self.collect(&list))
    }

    fn parent(&self, element: ElementRef) -> Option<ElementRef> {
        let parent = self.element(element)?.parent_element()?;
        Some(self.inner.elements.intern(&parent))
    }

    fn contains(&self, ancestor: ElementRef, element: ElementRef) -> bool {
        match (self.element(ancestor), self.element(element)) {
            (Some(ancestor), Some(element)) => ancestor.contains(Some(element.as_ref())),
            _ => false,
        }
    }

    fn is_connected(&self, element: ElementRef) -> bool {
        self.inner
            .elements
            .resolve(element)
            .is_some_and(|element| element.is_connected())
    }

    fn attribute(&self, element: ElementRef, name: &str) -> Option<String> {
        self.element(element)?.get_attribute(name)
    }

    fn add_class(&self, element: ElementRef, class: &str) {
        if let Some(element) = self.element(element) {
            if let Err(err) = element.class_list().add_1(class) {
                tracing::warn!(%class, error = %js_message(&err), "class not added");
            }
        }
    }

    fn remove_class(&self, element: ElementRef, class: &str) {
        if let Some(element) = self.element(element) {
            if let Err(err) = element.class_list().remove_1(class) {
                tracing::warn!(%class, error = %js_message(&err), "class not removed");
            }
        }
    }

    fn set_inner_html(&self, element: ElementRef, html: &str) {
        if let Some(element) = self.element(element) {
            self.inner.elements.release_descendants(&element);
            element.set_inner_html(html);
        }
    }

    fn append_html(&self, element: ElementRef, html: &str) -> Vec<ElementRef> {
        let Some(element) = self.element(element) else {
            return Vec::new();
        };
        let template = match self.template(html) {
            Ok(template) => template,
            Err(err) => {
                tracing::warn!(error = %err, "fragment not parsed");
                return Vec::new();
            }
        };
        let content = template.content();
        let children = content.children();
        let inserted: Vec<Element> = (0..children.length())
            .filter_map(|index| children.item(index))
            .collect();

        if let Err(err) = element.append_child(&content) {
            tracing::warn!(error = %js_message(&err), "fragment not appended");
            return Vec::new();
        }
        inserted
            .iter()
            .map(|child| self.inner.elements.intern(child))
            .collect()
    }

    fn remove(&self, element: ElementRef) {
        if let Some(node) = self.element(element) {
            self.inner.elements.release_subtree(&node);
            node.remove();
        }
    }

    fn serialize_form(&self, form: ElementRef) -> String {
        let Some(form) = self
            .element(form)
            .and_then(|element| element.dyn_into::<HtmlFormElement>().ok())
        else {
            return String::new();
        };
        let encoded = FormData::new_with_form(&form)
            .and_then(|data| UrlSearchParams::new_with_str_sequence_sequence(data.as_ref()));
        match encoded {
            Ok(params) => String::from(params.to_string()),
            Err(err) => {
                tracing::warn!(error = %js_message(&err), "form not serialized");
                String::new()
            }
        }
    }

    fn extract_inner_html(&self, html: &str, selector: &str) -> Result<Option<String>> {
        let template = self.template(html)?;
        let found = template
            .content()
            .query_selector(selector)
            .map_err(|err| AjaxLinksError::invalid_selector(selector, js_message(&err)))?;
        Ok(found.map(|element| element.inner_html()))
    }

    fn listen(&self, element: ElementRef, action: ActionKind, handler: ActionHandler) {
        let Some(element) = self.element(element) else {
            return;
        };
        let on_action: Closure<dyn Fn(Event)> = Closure::new(move |event: Event| {
            event.prevent_default();
            handler();
        });
        if let Err(err) = element
            .add_event_listener_with_callback(action.event_name(), on_action.as_ref().unchecked_ref())
        {
            tracing::warn!(error = %js_message(&err), "action listener rejected");
        }
        on_action.forget();
    }

    fn emit(&self, target: ElementRef, event: &str, payload: &[ElementRef]) {
        let Some(target) = self.element(target) else {
            return;
        };
        let detail: js_sys::Array = payload
            .iter()
            .filter_map(|&handle| self.inner.elements.resolve(handle))
            .collect();
        let init = CustomEventInit::new();
        init.set_bubbles(true);
        init.set_detail(&detail);
        match CustomEvent::new_with_event_init_dict(event, &init) {
            Ok(custom) => {
                if let Err(err) = target.dispatch_event(&custom) {
                    tracing::warn!(%event, error = %js_message(&err), "notification not dispatched");
                }
            }
            Err(err) => tracing::warn!(%event, error = %js_message(&err), "notification not created"),
        }
    }
}

impl HistoryEffects for WebHost {
    fn state(&self) -> Result<HistoryState> {
        let data = self
            .history()?
            .state()
            .map_err(|err| AjaxLinksError::history(js_message(&err)))?;
        let current_url = self.current_url();
        let state = data
            .as_string()
            .and_then(|json| StoredState::from_json(&json))
            .map(|stored| stored.view(self.inner.scope, &self.inner.session, &current_url))
            .unwrap_or_else(|| HistoryState::untracked(current_url));
        Ok(state)
    }

    fn push_state(&self, entry: &HistoryEntry, title: &str) -> Result<()> {
        self.write_state(entry, title, true)?;
        notify(&self.inner);
        Ok(())
    }

    fn replace_state(&self, entry: &HistoryEntry, title: &str) -> Result<()> {
        self.write_state(entry, title, false)
    }

    fn subscribe(&self, listener: StateListener) {
        self.inner.listeners.borrow_mut().push(listener);
        self.install_popstate();
    }
}

#[async_trait(?Send)]
impl FetchEffects for WebHost {
    async fn get_html(&self, url: &str) -> std::result::Result<String, FetchError> {
        let response = JsFuture::from(self.inner.window.fetch_with_str(url))
            .await
            .map_err(|err| FetchError::transport(url, js_message(&err)))?;
        let response: Response = response
            .dyn_into()
            .map_err(|_| FetchError::transport(url, "fetch did not yield a Response"))?;
        if !response.ok() {
            return Err(FetchError::status(url, response.status()));
        }
        let text = response
            .text()
            .map_err(|err| FetchError::body(url, js_message(&err)))?;
        let text = JsFuture::from(text)
            .await
            .map_err(|err| FetchError::body(url, js_message(&err)))?;
        text.as_string()
            .ok_or_else(|| FetchError::body(url, "body is not text"))
    }
}

impl LocationEffects for WebHost {
    fn assign(&self, url: &str) {
        if let Err(err) = self.inner.window.location().set_href(url) {
            tracing::warn!(%url, error = %js_message(&err), "navigation rejected");
        }
    }
}

impl TaskSpawner for WebHost {
    fn spawn_local(&self, fut: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(fut);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use std::cell::Cell;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    struct Fixture {
        host: WebHost,
        elements: Rc<ElementRegistry>,
        root: ElementRef,
        node: Element,
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            self.node.remove();
        }
    }

    fn fixture(html: &str) -> Fixture {
        let document = web_sys::window().unwrap().document().unwrap();
        let node = document.create_element("div").unwrap();
        node.set_inner_html(html);
        document.body().unwrap().append_child(&node).unwrap();

        let elements = Rc::new(ElementRegistry::default());
        let root = elements.intern(&node);
        let host = WebHost::new(Rc::clone(&elements), "session-a".to_string(), root).unwrap();
        Fixture {
            host,
            elements,
            root,
            node,
        }
    }

    #[wasm_bindgen_test]
    fn queries_hand_out_stable_handles() {
        let fx = fixture(r#"<a href="/x" data-t=".c">x</a>"#);

        let found = fx.host.query_within(fx.root, "[data-t]").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(fx.host.query_document("[data-t]").unwrap(), found);
        assert_eq!(fx.host.parent(found[0]), Some(fx.root));
        assert!(fx.host.contains(fx.root, found[0]));
        assert_eq!(fx.host.attribute(found[0], "href").as_deref(), Some("/x"));
    }

    #[wasm_bindgen_test]
    fn invalid_selector_is_reported() {
        let fx = fixture("");
        let err = fx.host.query_within(fx.root, "div[").unwrap_err();
        assert!(matches!(err, AjaxLinksError::InvalidSelector { .. }));
    }

    #[wasm_bindgen_test]
    fn append_html_returns_inserted_elements() {
        let fx = fixture("<p>old</p>");

        let inserted = fx.host.append_html(fx.root, "<p>a</p>text<span>b</span>");

        assert_eq!(inserted.len(), 2);
        assert_eq!(fx.host.query_within(fx.root, "span").unwrap(), vec![inserted[1]]);
        assert_eq!(fx.node.inner_html(), "<p>old</p><p>a</p>text<span>b</span>");
        assert!(fx.host.append_html(fx.root, "only text").is_empty());
    }

    #[wasm_bindgen_test]
    fn replaced_children_release_their_handles() {
        let fx = fixture(r#"<a href="/x">x</a>"#);
        let old = fx.host.query_within(fx.root, "a").unwrap()[0];
        assert!(fx.host.is_connected(old));

        fx.host.set_inner_html(fx.root, "<p>new</p>");

        assert!(!fx.host.is_connected(old));
        assert_eq!(fx.elements.resolve(old), None);
        assert_eq!(fx.elements.len(), 1);
    }

    #[wasm_bindgen_test]
    fn remove_releases_subtree() {
        let fx = fixture("<div class=\"more\"><a>x</a></div>");
        let more = fx.host.query_within(fx.root, ".more").unwrap()[0];
        fx.host.query_within(fx.root, "a").unwrap();

        fx.host.remove(more);

        assert!(fx.host.query_within(fx.root, ".more").unwrap().is_empty());
        assert_eq!(fx.elements.len(), 1);
    }

    #[wasm_bindgen_test]
    fn classes_toggle() {
        let fx = fixture("");
        fx.host.add_class(fx.root, "bsp-loading-ajax");
        assert!(fx.node.class_list().contains("bsp-loading-ajax"));
        fx.host.remove_class(fx.root, "bsp-loading-ajax");
        assert!(!fx.node.class_list().contains("bsp-loading-ajax"));
    }

    #[wasm_bindgen_test]
    fn form_serializes_successful_controls() {
        let fx = fixture(
            r#"<form><input name="q" value="a b"><input type="checkbox" name="c" value="1"><input name="n" value="x&y"></form>"#,
        );
        let form = fx.host.query_within(fx.root, "form").unwrap()[0];

        assert_eq!(fx.host.serialize_form(form), "q=a+b&n=x%26y");
        assert_eq!(fx.host.serialize_form(fx.root), "");
    }

    #[wasm_bindgen_test]
    fn extract_searches_detached_response() {
        let fx = fixture("");
        let page = r#"<html><body><header>nav</header><div class="content"><p>x</p></div></body></html>"#;

        assert_eq!(
            fx.host.extract_inner_html(page, ".content").unwrap().as_deref(),
            Some("<p>x</p>")
        );
        assert_eq!(fx.host.extract_inner_html(page, ".missing").unwrap(), None);
        assert!(fx.host.query_document(".content").unwrap().is_empty());
    }

    #[wasm_bindgen_test]
    fn emit_carries_payload_elements() {
        let fx = fixture("<p></p>");
        let inner = fx.host.query_within(fx.root, "p").unwrap()[0];
        let seen = Rc::new(Cell::new(None));
        let record = Rc::clone(&seen);
        let listener: Closure<dyn Fn(Event)> = Closure::new(move |event: Event| {
            let detail = event.unchecked_into::<CustomEvent>().detail();
            record.set(Some(js_sys::Array::from(&detail).length()));
        });
        fx.node
            .add_event_listener_with_callback("ajax-links:test", listener.as_ref().unchecked_ref())
            .unwrap();

        fx.host.emit(fx.root, "ajax-links:test", &[fx.root, inner]);

        assert_eq!(seen.get(), Some(2));
    }

    #[wasm_bindgen_test]
    fn listen_suppresses_native_action() {
        let fx = fixture(r##"<a href="#elsewhere">x</a>"##);
        let link = fx.host.query_within(fx.root, "a").unwrap()[0];
        let clicks = Rc::new(Cell::new(0));
        let count = Rc::clone(&clicks);
        fx.host.listen(link, ActionKind::Click, Rc::new(move || count.set(count.get() + 1)));

        let event = web_sys::Event::new_with_event_init_dict("click", &{
            let init = web_sys::EventInit::new();
            init.set_cancelable(true);
            init
        })
        .unwrap();
        let proceeded = fx.elements.resolve(link).unwrap().dispatch_event(&event).unwrap();

        assert_eq!(clicks.get(), 1);
        assert!(!proceeded);
    }

    #[wasm_bindgen_test]
    fn history_entries_are_scoped_to_their_instance() {
        let fx = fixture("<a></a>");
        let origin = fx.host.query_within(fx.root, "a").unwrap()[0];
        let other_root = fx.elements.intern(&fx.node.query_selector("a").unwrap().unwrap());
        let other =
            WebHost::new(Rc::clone(&fx.elements), "session-a".to_string(), other_root).unwrap();
        let location = web_sys::window().unwrap().location();
        let original = location.href().unwrap();
        let url = format!("{}?ajax-links-test", location.pathname().unwrap());

        let pushes = Rc::new(Cell::new(0));
        let count = Rc::clone(&pushes);
        fx.host.subscribe(Rc::new(move || count.set(count.get() + 1)));

        let entry = HistoryEntry {
            target: ".content".to_string(),
            url: url.clone(),
            originating_element: Some(origin),
        };
        fx.host.replace_state(&entry, "").unwrap();
        assert_eq!(pushes.get(), 0);
        fx.host.push_state(&entry, "").unwrap();
        assert_eq!(pushes.get(), 1);

        let own = fx.host.state().unwrap();
        assert_eq!(own.target.as_deref(), Some(".content"));
        assert_eq!(own.originating_element, Some(origin));
        assert_eq!(own.clean_url, url);
        assert_eq!(other.state().unwrap().target, None);

        web_sys::window()
            .unwrap()
            .history()
            .unwrap()
            .replace_state_with_url(&JsValue::NULL, "", Some(&original))
            .unwrap();
        assert_eq!(fx.host.state().unwrap(), HistoryState::untracked(original));
    }
}
