//! Mapping between live elements and [`ElementRef`] handles
//!
//! Each interned element carries its handle in an expando property, which
//! `innerHTML` and `cloneNode` never copy. Entries hold the element strongly,
//! so subtrees the host discards are released explicitly.

use ajax_links_core::ElementRef;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use wasm_bindgen::JsValue;
use web_sys::Element;

const REF_PROPERTY: &str = "__ajaxLinksRef";

/// Element handles for one page load
#[derive(Debug, Default)]
pub struct ElementRegistry {
    elements: RefCell<HashMap<u64, Element>>,
    next: Cell<u64>,
}

impl ElementRegistry {
    /// Handle for `element`, allocating one on first sight
    pub fn intern(&self, element: &Element) -> ElementRef {
        if let Some(raw) = handle_of(element) {
            if self
                .elements
                .borrow()
                .get(&raw)
                .is_some_and(|known| known == element)
            {
                return ElementRef::new(raw);
            }
        }

        let raw = self.next.get() + 1;
        self.next.set(raw);
        let key = JsValue::from_str(REF_PROPERTY);
        if js_sys::Reflect::set(element, &key, &JsValue::from_f64(raw as f64)).is_err() {
            tracing::trace!(raw, "element rejected handle property");
        }
        self.elements.borrow_mut().insert(raw, element.clone());
        ElementRef::new(raw)
    }

    /// Element behind `handle`, if it was interned here
    pub fn resolve(&self, handle: ElementRef) -> Option<Element> {
        self.elements.borrow().get(&handle.raw()).cloned()
    }

    /// Drop the entries of every element below `element`
    pub fn release_descendants(&self, element: &Element) {
        let Ok(descendants) = element.query_selector_all("*") else {
            return;
        };
        let mut elements = self.elements.borrow_mut();
        for index in 0..descendants.length() {
            if let Some(raw) = descendants.item(index).and_then(|node| handle_of(&node)) {
                elements.remove(&raw);
            }
        }
    }

    /// Drop the entries of `element` and everything below it
    pub fn release_subtree(&self, element: &Element) {
        if let Some(raw) = handle_of(element) {
            self.elements.borrow_mut().remove(&raw);
        }
        self.release_descendants(element);
    }

    /// Number of interned elements
    pub fn len(&self) -> usize {
        self.elements.borrow().len()
    }

    /// Whether nothing has been interned
    pub fn is_empty(&self) -> bool {
        self.elements.borrow().is_empty()
    }
}

fn handle_of(target: &JsValue) -> Option<u64> {
    js_sys::Reflect::get(target, &JsValue::from_str(REF_PROPERTY))
        .ok()
        .and_then(|value| value.as_f64())
        .map(|raw| raw as u64)
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn element(html: &str) -> Element {
        let document = web_sys::window().unwrap().document().unwrap();
        let element = document.create_element("div").unwrap();
        element.set_inner_html(html);
        element
    }

    #[wasm_bindgen_test]
    fn intern_is_stable_per_element() {
        let registry = ElementRegistry::default();
        let first = element("");
        let second = element("");

        let handle = registry.intern(&first);
        assert_eq!(registry.intern(&first), handle);
        assert_ne!(registry.intern(&second), handle);
        assert_eq!(registry.resolve(handle), Some(first));
        assert_eq!(registry.len(), 2);
    }

    #[wasm_bindgen_test]
    fn clones_get_their_own_handle() {
        let registry = ElementRegistry::default();
        let original = element("<p>x</p>");
        let handle = registry.intern(&original);

        let copy = original
            .clone_node_with_deep(true)
            .unwrap()
            .dyn_into::<Element>()
            .unwrap();
        assert_ne!(registry.intern(&copy), handle);
    }

    #[wasm_bindgen_test]
    fn release_subtree_drops_element_and_descendants() {
        let registry = ElementRegistry::default();
        let outer = element("<p><a>x</a></p><span></span>");
        let kept = element("");
        registry.intern(&outer);
        registry.intern(&kept);
        for child in ["p", "a", "span"] {
            registry.intern(&outer.query_selector(child).unwrap().unwrap());
        }
        assert_eq!(registry.len(), 5);

        registry.release_descendants(&outer);
        assert_eq!(registry.len(), 2);

        registry.release_subtree(&outer);
        assert_eq!(registry.len(), 1);
        assert!(!registry.is_empty());
    }
}
