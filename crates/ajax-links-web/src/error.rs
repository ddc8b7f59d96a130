//! Error type for the browser bindings

use ajax_links_core::AjaxLinksError;
use thiserror::Error;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Error surfaced to JavaScript callers
#[derive(Error, Debug)]
pub enum WebError {
    /// Engine or configuration error
    #[error(transparent)]
    Engine(#[from] AjaxLinksError),

    /// JavaScript interop error
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    /// No `window`/`document` in this global scope
    #[error("no browser window available")]
    NoWindow,
}

impl From<JsValue> for WebError {
    fn from(value: JsValue) -> Self {
        WebError::JavaScript(js_message(&value))
    }
}

impl From<WebError> for JsValue {
    fn from(err: WebError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Result type for browser operations
pub type WebResult<T> = Result<T, WebError>;

/// Best-effort message text for a thrown value.
pub(crate) fn js_message(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{value:?}")
}

/// Wrap a thrown value as a DOM error.
pub(crate) fn dom_error(context: &str, value: &JsValue) -> AjaxLinksError {
    AjaxLinksError::dom(format!("{context}: {}", js_message(value)))
}
