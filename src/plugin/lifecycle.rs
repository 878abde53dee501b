use super::api::{Plugin, PluginMetadata, PluginResult};
use super::guard::guard;
use super::module::ModuleLease;
use super::scope::PluginScope;
use crate::logging;
use futures_util::future::join_all;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

const CONSTRUCTED: u8 = 0;
const ENABLED: u8 = 1;
const DISABLED: u8 = 2;

/// Lifecycle state of a plugin. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PluginState {
    Constructed,
    Enabled,
    Disabled,
}

impl PluginState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            CONSTRUCTED => PluginState::Constructed,
            ENABLED => PluginState::Enabled,
            _ => PluginState::Disabled,
        }
    }
}

/// An activated plugin as tracked by the [`LifecycleController`]
pub struct PluginHandle {
    id: u64,
    plugin: Box<dyn Plugin>,
    metadata: PluginMetadata,
    archive: Option<PathBuf>,
    scope: OnceLock<PluginScope>,
    state: AtomicU8,
    disabled: CancellationToken,
    // keeps the module mapped until `plugin` is gone
    _lease: Option<ModuleLease>,
}

impl PluginHandle {
    fn new(
        id: u64,
        plugin: Box<dyn Plugin>,
        metadata: PluginMetadata,
        archive: Option<&Path>,
        lease: Option<ModuleLease>,
    ) -> Self {
        Self {
            id,
            plugin,
            metadata,
            archive: archive.map(Path::to_path_buf),
            scope: OnceLock::new(),
            state: AtomicU8::new(CONSTRUCTED),
            disabled: CancellationToken::new(),
            _lease: lease,
        }
    }

    /// Process-unique activation id
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    /// Archive the plugin was loaded from, if any
    pub fn archive(&self) -> Option<&Path> {
        self.archive.as_deref()
    }

    pub fn state(&self) -> PluginState {
        PluginState::from_raw(self.state.load(Ordering::Acquire))
    }

    pub fn scope(&self) -> Option<&PluginScope> {
        self.scope.get()
    }

    /// Resolves once `on_disable` has run
    pub async fn disabled(&self) {
        self.disabled.cancelled().await;
    }

    fn mark_enabled(&self) -> bool {
        self.state
            .compare_exchange(CONSTRUCTED, ENABLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Run `on_disable` the first time the plugin reaches Disabled
    fn disable(&self) {
        if self.state.swap(DISABLED, Ordering::AcqRel) == DISABLED {
            return;
        }

        match guard("on_disable", || self.plugin.on_disable()) {
            Ok(()) => logging::log_plugin_disabled(self.id, &self.metadata),
            Err(e) => logging::log_plugin_disable_failed(self.id, &self.metadata, &e),
        }
        self.disabled.cancel();
    }
}

impl std::fmt::Debug for PluginHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginHandle")
            .field("id", &self.id)
            .field("metadata", &self.metadata)
            .field("archive", &self.archive)
            .field("state", &self.state())
            .finish()
    }
}

/// Owns the registry of activated plugins and drives their lifecycle
pub struct LifecycleController {
    registry: Mutex<Vec<Arc<PluginHandle>>>,
    runtime: Handle,
    next_id: AtomicU64,
}

impl LifecycleController {
    /// Create a controller whose plugin scopes run on `runtime`
    pub fn new(runtime: Handle) -> Self {
        Self {
            registry: Mutex::new(Vec::new()),
            runtime,
            next_id: AtomicU64::new(1),
        }
    }

    /// Activate a plugin that did not come from an archive.
    ///
    /// Fails only when reading the plugin's metadata fails; nothing is
    /// registered in that case.
    pub fn activate(&self, plugin: Box<dyn Plugin>) -> PluginResult<Arc<PluginHandle>> {
        let metadata = guard("metadata", || Ok(plugin.metadata()))?;
        Ok(self.activate_from(plugin, metadata, None, None))
    }

    /// Register the plugin, bind its teardown to its scope, then enable it.
    ///
    /// The teardown watcher exists before `on_enable` runs, so a plugin that
    /// cancels its own scope while enabling is still disabled exactly once.
    pub fn activate_from(
        &self,
        plugin: Box<dyn Plugin>,
        metadata: PluginMetadata,
        archive: Option<&Path>,
        lease: Option<ModuleLease>,
    ) -> Arc<PluginHandle> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let handle = Arc::new(PluginHandle::new(id, plugin, metadata, archive, lease));
        handle.mark_enabled();

        let scope = {
            let mut registry = self.lock_registry();
            let scope = handle
                .scope
                .get_or_init(|| PluginScope::new(self.runtime.clone()))
                .clone();
            registry.push(Arc::clone(&handle));
            scope
        };

        self.watch(Arc::clone(&handle), scope.clone());

        match guard("on_enable", || handle.plugin.on_enable(&scope)) {
            Ok(()) => logging::log_plugin_enabled(id, &handle.metadata),
            Err(e) => {
                logging::log_plugin_enable_failed(id, &handle.metadata, &e);
                scope.cancel();
            }
        }

        handle
    }

    fn watch(&self, handle: Arc<PluginHandle>, scope: PluginScope) {
        self.runtime.spawn(async move {
            scope.terminated().await;
            handle.disable();
        });
    }

    /// Cancel every registered plugin's scope and clear the registry.
    ///
    /// Returns without waiting for `on_disable`; teardown runs on the
    /// runtime as each scope finishes.
    pub fn disable_all(&self) {
        self.drain_and_cancel();
    }

    /// Disable everything and wait until every `on_disable` has run
    pub async fn shutdown(&self) {
        let drained = self.drain_and_cancel();
        join_all(
            drained
                .iter()
                .filter(|handle| handle.scope().is_some())
                .map(|handle| handle.disabled()),
        )
        .await;
    }

    fn drain_and_cancel(&self) -> Vec<Arc<PluginHandle>> {
        let drained = std::mem::take(&mut *self.lock_registry());

        for handle in &drained {
            match handle.scope() {
                Some(scope) => scope.cancel(),
                None => logging::log_integrity_error(handle.id, &handle.metadata),
            }
        }

        drained
    }

    /// Snapshot of the registry
    pub fn plugins(&self) -> Vec<Arc<PluginHandle>> {
        self.lock_registry().clone()
    }

    pub fn len(&self) -> usize {
        self.lock_registry().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_registry().is_empty()
    }

    fn lock_registry(&self) -> MutexGuard<'_, Vec<Arc<PluginHandle>>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for LifecycleController {
    fn drop(&mut self) {
        self.disable_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::api::PluginError;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[derive(Default)]
    struct Counters {
        enabled: AtomicUsize,
        disabled: AtomicUsize,
    }

    enum Behavior {
        Normal,
        CancelOnEnable,
        FailOnEnable,
        PanicOnEnable,
        PanicOnDisable,
        CloseOnEnable,
    }

    struct TestPlugin {
        counters: Arc<Counters>,
        behavior: Behavior,
    }

    impl TestPlugin {
        fn boxed(counters: &Arc<Counters>, behavior: Behavior) -> Box<dyn Plugin> {
            Box::new(Self {
                counters: Arc::clone(counters),
                behavior,
            })
        }
    }

    impl Plugin for TestPlugin {
        fn metadata(&self) -> PluginMetadata {
            PluginMetadata::new("test", "Test", "1.0")
        }

        fn on_enable(&self, scope: &PluginScope) -> PluginResult<()> {
            self.counters.enabled.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Normal => {
                    let token = scope.child_token();
                    scope.spawn(async move { token.cancelled().await });
                    Ok(())
                }
                Behavior::CancelOnEnable => {
                    scope.cancel();
                    Ok(())
                }
                Behavior::FailOnEnable => {
                    Err(PluginError::InitializationFailed("no config".to_string()))
                }
                Behavior::PanicOnEnable => panic!("enable exploded"),
                Behavior::PanicOnDisable => Ok(()),
                Behavior::CloseOnEnable => {
                    scope.spawn(async {});
                    scope.close();
                    Ok(())
                }
            }
        }

        fn on_disable(&self) -> PluginResult<()> {
            self.counters.disabled.fetch_add(1, Ordering::SeqCst);
            if let Behavior::PanicOnDisable = self.behavior {
                panic!("disable exploded");
            }
            Ok(())
        }
    }

    fn activate(
        controller: &LifecycleController,
        counters: &Arc<Counters>,
        behavior: Behavior,
    ) -> Arc<PluginHandle> {
        controller
            .activate(TestPlugin::boxed(counters, behavior))
            .unwrap()
    }

    async fn wait_disabled(handle: &PluginHandle) {
        tokio::time::timeout(Duration::from_secs(5), handle.disabled())
            .await
            .expect("plugin should be disabled");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_activate_registers_enabled_plugin() {
        let controller = LifecycleController::new(Handle::current());
        let counters = Arc::new(Counters::default());

        let handle = activate(&controller, &counters, Behavior::Normal);

        assert_eq!(controller.len(), 1);
        assert_eq!(handle.state(), PluginState::Enabled);
        assert!(handle.scope().is_some());
        assert_eq!(counters.enabled.load(Ordering::SeqCst), 1);
        assert_eq!(counters.disabled.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_disable_all_on_empty_registry_is_noop() {
        let controller = LifecycleController::new(Handle::current());
        controller.disable_all();
        controller.disable_all();
        assert!(controller.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_disable_all_runs_on_disable_once() {
        let controller = LifecycleController::new(Handle::current());
        let counters = Arc::new(Counters::default());
        let handle = activate(&controller, &counters, Behavior::Normal);

        controller.disable_all();
        assert!(controller.is_empty());
        wait_disabled(&handle).await;

        // further cancellation requests are no-ops
        handle.scope().unwrap().cancel();
        controller.disable_all();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(handle.state(), PluginState::Disabled);
        assert_eq!(counters.disabled.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_self_cancel_during_enable_still_disables_once() {
        let controller = LifecycleController::new(Handle::current());
        let counters = Arc::new(Counters::default());
        let handle = activate(&controller, &counters, Behavior::CancelOnEnable);

        wait_disabled(&handle).await;
        controller.disable_all();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(counters.enabled.load(Ordering::SeqCst), 1);
        assert_eq!(counters.disabled.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_failed_enable_is_torn_down() {
        let controller = LifecycleController::new(Handle::current());
        let counters = Arc::new(Counters::default());
        let handle = activate(&controller, &counters, Behavior::FailOnEnable);

        wait_disabled(&handle).await;
        assert!(handle.scope().unwrap().is_cancelled());
        assert_eq!(counters.disabled.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_panicking_enable_is_torn_down_once() {
        let controller = LifecycleController::new(Handle::current());
        let counters = Arc::new(Counters::default());
        let handle = activate(&controller, &counters, Behavior::PanicOnEnable);

        wait_disabled(&handle).await;
        controller.disable_all();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(handle.scope().unwrap().is_cancelled());
        assert_eq!(handle.state(), PluginState::Disabled);
        assert_eq!(counters.disabled.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_panicking_disable_still_completes() {
        let controller = LifecycleController::new(Handle::current());
        let counters = Arc::new(Counters::default());
        let handle = activate(&controller, &counters, Behavior::PanicOnDisable);

        controller.disable_all();
        wait_disabled(&handle).await;

        assert_eq!(handle.state(), PluginState::Disabled);
        assert_eq!(counters.disabled.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_panicking_metadata_is_rejected() {
        struct Nameless;

        impl Plugin for Nameless {
            fn metadata(&self) -> PluginMetadata {
                panic!("metadata exploded")
            }

            fn on_enable(&self, _scope: &PluginScope) -> PluginResult<()> {
                Ok(())
            }
        }

        let controller = LifecycleController::new(Handle::current());
        let result = controller.activate(Box::new(Nameless));

        assert!(matches!(result, Err(PluginError::Panicked { .. })));
        assert!(controller.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_closed_scope_completes_normally() {
        let controller = LifecycleController::new(Handle::current());
        let counters = Arc::new(Counters::default());
        let handle = activate(&controller, &counters, Behavior::CloseOnEnable);

        wait_disabled(&handle).await;
        assert_eq!(handle.state(), PluginState::Disabled);
        assert_eq!(counters.disabled.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_shutdown_waits_for_every_plugin() {
        let controller = LifecycleController::new(Handle::current());
        let counters = Arc::new(Counters::default());
        for _ in 0..4 {
            activate(&controller, &counters, Behavior::Normal);
        }

        tokio::time::timeout(Duration::from_secs(5), controller.shutdown())
            .await
            .expect("shutdown should finish");

        assert!(controller.is_empty());
        assert_eq!(counters.disabled.load(Ordering::SeqCst), 4);
    }
}
