//! Location handler recording full navigations

use ajax_links_core::effects::LocationEffects;
use std::cell::RefCell;
use std::rc::Rc;

/// Records every [`LocationEffects::assign`] instead of leaving the page
#[derive(Debug, Clone, Default)]
pub struct MemoryLocation {
    assigned: Rc<RefCell<Vec<String>>>,
}

impl MemoryLocation {
    /// URLs navigated to, in order
    pub fn assigned(&self) -> Vec<String> {
        self.assigned.borrow().clone()
    }
}

impl LocationEffects for MemoryLocation {
    fn assign(&self, url: &str) {
        self.assigned.borrow_mut().push(url.to_string());
    }
}
