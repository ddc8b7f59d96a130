//! DOM effect interface
//!
//! Query, mutation and event primitives over [`ElementRef`] handles. Queries
//! return elements in document order.

use crate::errors::Result;
use crate::types::{ActionKind, ElementRef};
use std::rc::Rc;

/// Callback run when a bound element's native action fires.
///
/// The implementation suppresses the native action before calling it.
pub type ActionHandler = Rc<dyn Fn()>;

/// DOM primitives used by the interceptor and the engine
pub trait DomEffects {
    /// All elements in the document matching `selector`
    fn query_document(&self, selector: &str) -> Result<Vec<ElementRef>>;

    /// All descendants of `scope` matching `selector`, excluding `scope`
    fn query_within(&self, scope: ElementRef, selector: &str) -> Result<Vec<ElementRef>>;

    /// Parent element, if attached to one
    fn parent(&self, element: ElementRef) -> Option<ElementRef>;

    /// True when `element` is `ancestor` or one of its descendants
    fn contains(&self, ancestor: ElementRef, element: ElementRef) -> bool;

    /// True while `element` is attached to the document
    fn is_connected(&self, element: ElementRef) -> bool;

    /// Attribute value, `None` when absent
    fn attribute(&self, element: ElementRef, name: &str) -> Option<String>;

    /// Add a class to the element
    fn add_class(&self, element: ElementRef, class: &str);

    /// Remove a class from the element
    fn remove_class(&self, element: ElementRef, class: &str);

    /// Replace the element's contents with parsed `html`
    fn set_inner_html(&self, element: ElementRef, html: &str);

    /// Parse `html` and append the nodes inside `element`, returning the
    /// inserted top-level elements
    fn append_html(&self, element: ElementRef, html: &str) -> Vec<ElementRef>;

    /// Detach the element from the document; detached elements are ignored
    fn remove(&self, element: ElementRef);

    /// Serialize a form's successful controls as
    /// `application/x-www-form-urlencoded`
    fn serialize_form(&self, form: ElementRef) -> String;

    /// Parse `html` into a detached container and return the inner HTML of
    /// the first match of `selector`
    fn extract_inner_html(&self, html: &str, selector: &str) -> Result<Option<String>>;

    /// Attach `handler` to the element's native `action`
    fn listen(&self, element: ElementRef, action: ActionKind, handler: ActionHandler);

    /// Dispatch a notification named `event` on `target` carrying `payload`
    fn emit(&self, target: ElementRef, event: &str, payload: &[ElementRef]);
}
