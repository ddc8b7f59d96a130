//! Runtime-agnostic task spawning trait.

use futures::future::LocalBoxFuture;

/// Spawns the continuation of a navigation while its fetch is outstanding
pub trait TaskSpawner {
    /// Spawn a task on the current thread's executor
    fn spawn_local(&self, fut: LocalBoxFuture<'static, ()>);
}
