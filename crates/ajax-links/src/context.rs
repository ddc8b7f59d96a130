//! State shared by one engine instance
//!
//! Element handlers and the history listener hold [`Weak`](std::rc::Weak)
//! references to this record, so nothing outlives the [`AjaxLinks`](crate::AjaxLinks)
//! handle that owns it.

use ajax_links_core::{ElementRef, Settings};
use std::cell::RefCell;
use std::collections::HashSet;

pub(crate) struct Shared<H> {
    pub(crate) root: ElementRef,
    pub(crate) settings: Settings,
    pub(crate) host: H,
    /// Elements this instance has attached a handler to
    bound: RefCell<HashSet<ElementRef>>,
}

impl<H> Shared<H> {
    pub(crate) fn new(root: ElementRef, settings: Settings, host: H) -> Self {
        Self {
            root,
            settings,
            host,
            bound: RefCell::new(HashSet::new()),
        }
    }

    /// Record `element` as bound. Returns `false` if it already was.
    pub(crate) fn mark_bound(&self, element: ElementRef) -> bool {
        self.bound.borrow_mut().insert(element)
    }

    pub(crate) fn is_bound(&self, element: ElementRef) -> bool {
        self.bound.borrow().contains(&element)
    }

    /// Forget bound elements for which `keep` is false. Returns how many
    /// were dropped.
    pub(crate) fn prune_bound(&self, keep: impl Fn(ElementRef) -> bool) -> usize {
        let mut bound = self.bound.borrow_mut();
        let before = bound.len();
        bound.retain(|&element| keep(element));
        before - bound.len()
    }

    pub(crate) fn bound_count(&self) -> usize {
        self.bound.borrow().len()
    }
}
