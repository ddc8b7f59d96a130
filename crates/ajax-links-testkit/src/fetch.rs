//! Scripted fetch handler

use ajax_links_core::effects::FetchEffects;
use ajax_links_core::FetchError;
use async_trait::async_trait;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Default)]
struct Script {
    responses: HashMap<String, Result<String, FetchError>>,
    requests: Vec<String>,
}

/// Fetch handler answering from canned responses
///
/// Unknown URLs answer with status 404.
#[derive(Clone, Default)]
pub struct ScriptedFetch {
    script: Rc<RefCell<Script>>,
}

impl std::fmt::Debug for ScriptedFetch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedFetch")
            .field("requests", &self.script.borrow().requests)
            .finish()
    }
}

impl ScriptedFetch {
    /// Answer `url` with `body`
    pub fn respond(&self, url: &str, body: &str) -> &Self {
        self.script
            .borrow_mut()
            .responses
            .insert(url.to_string(), Ok(body.to_string()));
        self
    }

    /// Fail requests to `url`
    pub fn fail(&self, url: &str, error: FetchError) -> &Self {
        self.script
            .borrow_mut()
            .responses
            .insert(url.to_string(), Err(error));
        self
    }

    /// URLs requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.script.borrow().requests.clone()
    }
}

#[async_trait(?Send)]
impl FetchEffects for ScriptedFetch {
    async fn get_html(&self, url: &str) -> Result<String, FetchError> {
        let mut script = self.script.borrow_mut();
        script.requests.push(url.to_string());
        script
            .responses
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::status(url, 404)))
    }
}
