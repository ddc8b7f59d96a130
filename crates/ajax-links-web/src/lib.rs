//! # ajax-links-web
//!
//! Browser bindings for `ajax-links`. [`WebHost`] implements the effect
//! traits with `web-sys`, and the exported [`init`] and [`init_all`] keep one
//! engine instance per root element alive for the page's lifetime.
//!
//! ```js
//! import init_wasm, { initAll } from "./ajax_links_web.js";
//! await init_wasm();
//! initAll();
//! ```

pub mod error;
pub mod host;
pub mod logging;
pub mod registry;
mod state;

pub use error::{WebError, WebResult};
pub use host::WebHost;
pub use logging::init_logging;
pub use registry::ElementRegistry;

use ajax_links::{AjaxLinks, ElementRef, SettingsOverrides};
use ajax_links_core::settings::{ROOT_MARKER_ATTRIBUTE, ROOT_OPTIONS_ATTRIBUTE};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Element;

/// Engine instances and element handles for the current page load
struct Page {
    elements: Rc<ElementRegistry>,
    session: String,
    instances: RefCell<HashMap<ElementRef, AjaxLinks<WebHost>>>,
}

impl Page {
    fn new() -> Self {
        let session = format!(
            "{:x}-{:x}",
            js_sys::Date::now() as u64,
            (js_sys::Math::random() * f64::from(u32::MAX)) as u64
        );
        Self {
            elements: Rc::new(ElementRegistry::default()),
            session,
            instances: RefCell::new(HashMap::new()),
        }
    }

    /// Start an instance on `root`. Returns `false` when one already runs.
    fn start(&self, root: &Element, overrides: SettingsOverrides) -> WebResult<bool> {
        let handle = self.elements.intern(root);
        if self.instances.borrow().contains_key(&handle) {
            tracing::debug!(root = %handle, "root already initialized");
            return Ok(false);
        }

        let host = WebHost::new(Rc::clone(&self.elements), self.session.clone(), handle)?;
        let links = AjaxLinks::init(handle, overrides, host);
        self.instances.borrow_mut().insert(handle, links);
        Ok(true)
    }
}

thread_local! {
    static PAGE: Rc<Page> = Rc::new(Page::new());
}

fn page() -> Rc<Page> {
    PAGE.with(Rc::clone)
}

/// Read options given as `undefined`, a JSON string or a plain object.
fn parse_options(options: &JsValue) -> WebResult<SettingsOverrides> {
    if options.is_undefined() || options.is_null() {
        return Ok(SettingsOverrides::default());
    }
    let json = match options.as_string() {
        Some(json) => json,
        None => String::from(js_sys::JSON::stringify(options)?),
    };
    Ok(SettingsOverrides::from_json(&json)?)
}

/// Start intercepting links and forms under `root`.
///
/// Returns `false` when `root` is already initialized.
#[wasm_bindgen]
pub fn init(root: Element, options: JsValue) -> Result<bool, JsValue> {
    init_logging(None);
    let overrides = parse_options(&options)?;
    Ok(page().start(&root, overrides)?)
}

/// Initialize every `[data-bsp-ajax-links]` root in the document, reading
/// options from its `data-bsp-ajax-links-options` attribute.
///
/// Returns how many roots were newly initialized.
#[wasm_bindgen(js_name = initAll)]
pub fn init_all() -> Result<u32, JsValue> {
    init_logging(None);
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or(WebError::NoWindow)?;
    let roots = document
        .query_selector_all(&format!("[{ROOT_MARKER_ATTRIBUTE}]"))
        .map_err(WebError::from)?;

    let page = page();
    let mut started = 0;
    for index in 0..roots.length() {
        let Some(root) = roots.item(index).and_then(|node| node.dyn_into::<Element>().ok()) else {
            continue;
        };
        let options = root.get_attribute(ROOT_OPTIONS_ATTRIBUTE).unwrap_or_default();
        let overrides = match SettingsOverrides::from_json(&options) {
            Ok(overrides) => overrides,
            Err(err) => {
                tracing::warn!(error = %err, "root options rejected; skipping root");
                continue;
            }
        };
        if page.start(&root, overrides)? {
            started += 1;
        }
    }

    tracing::info!(started, "ajax links initialized");
    Ok(started)
}
