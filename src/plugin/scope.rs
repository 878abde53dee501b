use std::future::Future;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Cancellable task scope owned by one plugin.
///
/// Every task spawned through the scope is parented to its cancellation
/// token. The scope is terminal once it has been cancelled, or closed, and
/// every tracked task has finished.
#[derive(Debug, Clone)]
pub struct PluginScope {
    token: CancellationToken,
    tracker: TaskTracker,
    runtime: Handle,
}

impl PluginScope {
    pub(crate) fn new(runtime: Handle) -> Self {
        Self {
            token: CancellationToken::new(),
            tracker: TaskTracker::new(),
            runtime,
        }
    }

    /// Spawn a task under this scope. The future is dropped at its next
    /// suspension point once the scope is cancelled.
    pub fn spawn<F>(&self, future: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = self.token.clone();
        self.tracker.spawn_on(
            async move {
                tokio::select! {
                    _ = token.cancelled() => {}
                    _ = future => {}
                }
            },
            &self.runtime,
        )
    }

    /// Request cancellation of every task in the scope
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Declare that no more work will be spawned. The scope completes
    /// normally once the running tasks finish.
    pub fn close(&self) {
        self.tracker.close();
    }

    /// A token cancelled together with this scope, for work the plugin drives itself
    pub fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    /// Number of tasks still running
    pub fn active_tasks(&self) -> usize {
        self.tracker.len()
    }

    /// Resolve once the scope is terminal.
    pub(crate) async fn terminated(&self) {
        tokio::select! {
            _ = self.token.cancelled() => {}
            _ = self.tracker.wait() => {}
        }
        self.tracker.close();
        self.tracker.wait().await;
        // late spawns on a finished scope must not outlive it
        self.token.cancel();
    }
}
