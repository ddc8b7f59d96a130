//! # ajax-links-testkit
//!
//! In-memory effect handlers for exercising the engine without a browser.
//!
//! - [`MemoryDom`]: HTML tree, selector queries, listeners and an event log
//! - [`MemoryHistory`]: history stack with `back`/`forward`
//! - [`ScriptedFetch`]: canned responses keyed by URL
//! - [`MemoryLocation`]: records full navigations
//! - [`PoolSpawner`]: tasks run only when the test drives the pool
//!
//! [`MemoryHost`] bundles all of them.

#![allow(clippy::unwrap_used, clippy::expect_used)]

pub mod dom;
pub mod fetch;
pub mod fixtures;
pub mod history;
pub mod host;
pub mod location;
pub mod selector;
pub mod spawner;
pub mod tree;

pub use dom::{ClassChange, EmittedEvent, MemoryDom};
pub use fetch::ScriptedFetch;
pub use history::{HistoryOp, MemoryHistory};
pub use host::MemoryHost;
pub use location::MemoryLocation;
pub use spawner::PoolSpawner;

/// Route `tracing` output through the test harness's captured stdout.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ajax_links=debug")),
        )
        .with_test_writer()
        .try_init();
}
