//! Composite in-memory host

use crate::dom::MemoryDom;
use crate::fetch::ScriptedFetch;
use crate::history::MemoryHistory;
use crate::location::MemoryLocation;
use crate::spawner::PoolSpawner;
use ajax_links_core::effects::{
    ActionHandler, DomEffects, FetchEffects, HistoryEffects, LocationEffects, StateListener,
    TaskSpawner,
};
use ajax_links_core::{ActionKind, ElementRef, FetchError, HistoryEntry, HistoryState, Result};
use async_trait::async_trait;
use futures::future::LocalBoxFuture;

/// Every effect handler the engine needs, backed by memory
///
/// Clones share state, so a test keeps one clone for assertions and hands
/// another to the engine.
#[derive(Debug, Clone)]
pub struct MemoryHost {
    dom: MemoryDom,
    history: MemoryHistory,
    fetch: ScriptedFetch,
    location: MemoryLocation,
    tasks: PoolSpawner,
}

impl MemoryHost {
    /// Host showing `html` at `url`
    pub fn new(html: &str, url: &str) -> Self {
        Self {
            dom: MemoryDom::from_html(html),
            history: MemoryHistory::new(url),
            fetch: ScriptedFetch::default(),
            location: MemoryLocation::default(),
            tasks: PoolSpawner::new(),
        }
    }

    /// Drive spawned navigations until they all wait or finish
    pub fn run_until_stalled(&self) {
        self.tasks.run_until_stalled();
    }

    /// DOM handler
    pub fn dom(&self) -> &MemoryDom {
        &self.dom
    }

    /// History handler
    pub fn history(&self) -> &MemoryHistory {
        &self.history
    }

    /// Fetch handler
    pub fn fetch(&self) -> &ScriptedFetch {
        &self.fetch
    }

    /// Location handler
    pub fn location(&self) -> &MemoryLocation {
        &self.location
    }

    /// Task spawner
    pub fn tasks(&self) -> &PoolSpawner {
        &self.tasks
    }
}

impl DomEffects for MemoryHost {
    fn query_document(&self, selector: &str) -> Result<Vec<ElementRef>> {
        self.dom.query_document(selector)
    }

    fn query_within(&self, scope: ElementRef, selector: &str) -> Result<Vec<ElementRef>> {
        self.dom.query_within(scope, selector)
    }

    fn parent(&self, element: ElementRef) -> Option<ElementRef> {
        self.dom.parent(element)
    }

    fn contains(&self, ancestor: ElementRef, element: ElementRef) -> bool {
        self.dom.contains(ancestor, element)
    }

    fn is_connected(&self, element: ElementRef) -> bool {
        self.dom.is_connected(element)
    }

    fn attribute(&self, element: ElementRef, name: &str) -> Option<String> {
        self.dom.attribute(element, name)
    }

    fn add_class(&self, element: ElementRef, class: &str) {
        self.dom.add_class(element, class);
    }

    fn remove_class(&self, element: ElementRef, class: &str) {
        self.dom.remove_class(element, class);
    }

    fn set_inner_html(&self, element: ElementRef, html: &str) {
        self.dom.set_inner_html(element, html);
    }

    fn append_html(&self, element: ElementRef, html: &str) -> Vec<ElementRef> {
        self.dom.append_html(element, html)
    }

    fn remove(&self, element: ElementRef) {
        self.dom.remove(element);
    }

    fn serialize_form(&self, form: ElementRef) -> String {
        self.dom.serialize_form(form)
    }

    fn extract_inner_html(&self, html: &str, selector: &str) -> Result<Option<String>> {
        self.dom.extract_inner_html(html, selector)
    }

    fn listen(&self, element: ElementRef, action: ActionKind, handler: ActionHandler) {
        self.dom.listen(element, action, handler);
    }

    fn emit(&self, target: ElementRef, event: &str, payload: &[ElementRef]) {
        self.dom.emit(target, event, payload);
    }
}

impl HistoryEffects for MemoryHost {
    fn state(&self) -> Result<HistoryState> {
        self.history.state()
    }

    fn push_state(&self, entry: &HistoryEntry, title: &str) -> Result<()> {
        self.history.push_state(entry, title)
    }

    fn replace_state(&self, entry: &HistoryEntry, title: &str) -> Result<()> {
        self.history.replace_state(entry, title)
    }

    fn subscribe(&self, listener: StateListener) {
        self.history.subscribe(listener);
    }
}

#[async_trait(?Send)]
impl FetchEffects for MemoryHost {
    async fn get_html(&self, url: &str) -> std::result::Result<String, FetchError> {
        self.fetch.get_html(url).await
    }
}

impl LocationEffects for MemoryHost {
    fn assign(&self, url: &str) {
        self.location.assign(url);
    }
}

impl TaskSpawner for MemoryHost {
    fn spawn_local(&self, fut: LocalBoxFuture<'static, ()>) {
        self.tasks.spawn_local(fut);
    }
}
