use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct RuntimeMetrics {
    /// Number of native handler invocations, retries included
    pub native_dispatches: AtomicU64,
    /// Number of times a native suspended on an uninitialized class
    pub deferred_dependencies: AtomicU64,
    /// Number of static initializers that ran to completion or failure
    pub static_initializers_run: AtomicU64,
    pub assignability_cache_hits: AtomicU64,
    pub assignability_cache_misses: AtomicU64,
    /// Number of `java/lang/Class` instances created
    pub mirrors_created: AtomicU64,
    /// Number of `java/lang/ClassLoader` handles created
    pub loader_handles_created: AtomicU64,
    /// Number of `sun/reflect/ConstantPool` peers created
    pub constant_pool_peers_created: AtomicU64,
}

/// Point-in-time copy of [`RuntimeMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub native_dispatches: u64,
    pub deferred_dependencies: u64,
    pub static_initializers_run: u64,
    pub assignability_cache_hits: u64,
    pub assignability_cache_misses: u64,
    pub mirrors_created: u64,
    pub loader_handles_created: u64,
    pub constant_pool_peers_created: u64,
}

impl RuntimeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_native_dispatch(&self) {
        self.native_dispatches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_deferred_dependency(&self) {
        self.deferred_dependencies.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_static_initializer(&self) {
        self.static_initializers_run.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_assignability_cache_hit(&self) {
        self.assignability_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_assignability_cache_miss(&self) {
        self.assignability_cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_mirror_created(&self) {
        self.mirrors_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_loader_handle_created(&self) {
        self.loader_handles_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_constant_pool_peer_created(&self) {
        self.constant_pool_peers_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            native_dispatches: self.native_dispatches.load(Ordering::Relaxed),
            deferred_dependencies: self.deferred_dependencies.load(Ordering::Relaxed),
            static_initializers_run: self.static_initializers_run.load(Ordering::Relaxed),
            assignability_cache_hits: self.assignability_cache_hits.load(Ordering::Relaxed),
            assignability_cache_misses: self.assignability_cache_misses.load(Ordering::Relaxed),
            mirrors_created: self.mirrors_created.load(Ordering::Relaxed),
            loader_handles_created: self.loader_handles_created.load(Ordering::Relaxed),
            constant_pool_peers_created: self.constant_pool_peers_created.load(Ordering::Relaxed),
        }
    }
}
