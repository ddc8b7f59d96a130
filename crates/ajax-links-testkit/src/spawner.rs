//! Deterministic single-threaded task spawner

use ajax_links_core::effects::TaskSpawner;
use futures::executor::{LocalPool, LocalSpawner};
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;
use std::cell::RefCell;
use std::rc::Rc;

/// Spawner backed by a [`LocalPool`]; nothing runs until the test drives it
#[derive(Clone)]
pub struct PoolSpawner {
    pool: Rc<RefCell<LocalPool>>,
    spawner: LocalSpawner,
}

impl Default for PoolSpawner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PoolSpawner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolSpawner").finish_non_exhaustive()
    }
}

impl PoolSpawner {
    /// Fresh pool
    pub fn new() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self {
            pool: Rc::new(RefCell::new(pool)),
            spawner,
        }
    }

    /// Run every task until none can make progress
    pub fn run_until_stalled(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }
}

impl TaskSpawner for PoolSpawner {
    fn spawn_local(&self, fut: LocalBoxFuture<'static, ()>) {
        if let Err(err) = LocalSpawnExt::spawn_local(&self.spawner, fut) {
            tracing::error!(error = %err, "local pool rejected task");
        }
    }
}
