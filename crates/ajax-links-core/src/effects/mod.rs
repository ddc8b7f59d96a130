//! Effect trait definitions
//!
//! The engine never touches a browser directly. Every side effect goes through
//! one of these traits: handlers decide **how**, the engine only decides
//! **what**. `ajax-links-web` implements them over `web-sys`; the testkit
//! implements them in memory.
//!
//! All traits are single-threaded (`?Send`): the engine runs on a browser
//! main thread and shares state through `Rc`.

pub mod dom;
pub mod fetch;
pub mod history;
pub mod location;
pub mod task;

pub use dom::{ActionHandler, DomEffects};
pub use fetch::FetchEffects;
pub use history::{HistoryEffects, StateListener};
pub use location::LocationEffects;
pub use task::TaskSpawner;

/// Every effect the engine needs from its host
pub trait HostEffects:
    DomEffects + HistoryEffects + FetchEffects + LocationEffects + TaskSpawner
{
}

impl<T> HostEffects for T where
    T: DomEffects + HistoryEffects + FetchEffects + LocationEffects + TaskSpawner
{
}
