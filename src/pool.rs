//! Core pool implementation

use crate::capacity::CapacityAccountant;
use crate::config::{CloseFn, FactoryFn, PingFn, PoolConfiguration};
use crate::errors::{PoolError, PoolResult};
use crate::eviction::{self, Verdict};
use crate::health::HealthStatus;
use crate::idle::{IdleEntry, IdleStore};
#[cfg(feature = "prometheus")]
use crate::metrics::MetricsExporter;
use crate::metrics::{MetricsTracker, PoolMetrics};

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// State shared by every handle to one pool
pub(crate) struct Shared<T> {
    idle: IdleStore<T>,
    capacity: CapacityAccountant,
    // read side is held across check-and-push in `requeue`
    closed: RwLock<bool>,
    factory: FactoryFn<T>,
    close: CloseFn<T>,
    ping: Option<PingFn<T>>,
    idle_timeout: Option<Duration>,
    metrics: MetricsTracker,
}

impl<T> Shared<T> {
    pub(crate) fn is_closed(&self) -> bool {
        *self.closed.read()
    }

    fn create(&self) -> PoolResult<T> {
        if !self.capacity.try_admit() {
            MetricsTracker::incr(&self.metrics.exhausted_events);
            return Err(PoolError::Exhausted);
        }

        match (self.factory)() {
            Ok(resource) => {
                MetricsTracker::incr(&self.metrics.total_created);
                tracing::debug!(live = self.capacity.live(), "created pooled resource");
                Ok(resource)
            }
            Err(err) => {
                self.capacity.release();
                MetricsTracker::incr(&self.metrics.factory_failures);
                tracing::debug!(error = %err, "factory failed");
                Err(PoolError::factory(err))
            }
        }
    }

    /// Pop idle entries until one passes inspection
    fn pop_fresh(&self) -> Option<T> {
        while let Some(entry) = self.idle.pop() {
            match eviction::inspect(&entry, self.idle_timeout, self.ping.as_ref()) {
                Verdict::Fresh => return Some(entry.resource),
                Verdict::Stale => {
                    MetricsTracker::incr(&self.metrics.total_evicted);
                    tracing::debug!(idle_for = ?entry.idle_for(), "evicting stale resource");
                    self.close_resource(entry.resource);
                }
                Verdict::Unhealthy(err) => {
                    MetricsTracker::incr(&self.metrics.ping_failures);
                    tracing::warn!(error = %err, "idle resource failed ping");
                    self.close_resource(entry.resource);
                }
            }
        }
        None
    }

    fn get(&self) -> PoolResult<T> {
        if self.is_closed() {
            return Err(PoolError::Closed);
        }

        if let Some(resource) = self.pop_fresh() {
            MetricsTracker::incr(&self.metrics.total_reused);
            tracing::trace!("reusing idle resource");
            return Ok(resource);
        }

        self.create()
    }

    /// Push an entry back, keeping its timestamp
    ///
    /// A closed pool or a full store closes the resource instead.
    fn requeue(&self, entry: IdleEntry<T>) -> bool {
        let closed = self.closed.read();
        if *closed {
            drop(closed);
            self.close_resource(entry.resource);
            return false;
        }

        match self.idle.push(entry) {
            Ok(()) => true,
            Err(entry) => {
                drop(closed);
                tracing::warn!(
                    max = self.capacity.max(),
                    "idle store full, closing returned resource"
                );
                // every slot is already held by a stored entry
                self.close_only(entry.resource);
                false
            }
        }
    }

    fn put(&self, resource: T) {
        if self.requeue(IdleEntry::new(resource)) {
            MetricsTracker::incr(&self.metrics.total_returned);
        }
    }

    /// The slot is given back even when the close function fails
    fn close_resource(&self, resource: T) {
        self.close_only(resource);
        self.capacity.release();
    }

    /// Close a resource that does not own a capacity slot
    fn close_only(&self, resource: T) {
        if let Err(err) = (self.close)(resource) {
            MetricsTracker::incr(&self.metrics.close_failures);
            tracing::warn!(error = %err, "failed to close resource");
        }
        MetricsTracker::incr(&self.metrics.total_closed);
    }

    fn drain(&self) -> usize {
        let mut closed = 0;
        while let Some(entry) = self.idle.pop() {
            self.close_resource(entry.resource);
            closed += 1;
        }
        closed
    }

    fn release(&self) {
        {
            let mut closed = self.closed.write();
            if *closed {
                return;
            }
            *closed = true;
        }

        let drained = self.drain();
        tracing::debug!(drained, "pool released");
    }

    /// Close idle entries past the timeout, returning how many were closed
    pub(crate) fn sweep_idle(&self) -> usize {
        if self.idle_timeout.is_none() || self.is_closed() {
            return 0;
        }

        let mut evicted = 0;
        for _ in 0..self.idle.len() {
            let Some(entry) = self.idle.pop() else {
                break;
            };
            if entry.is_stale(self.idle_timeout) {
                MetricsTracker::incr(&self.metrics.total_evicted);
                self.close_resource(entry.resource);
                evicted += 1;
            } else {
                self.requeue(entry);
            }
        }
        evicted
    }

    fn outstanding(&self) -> usize {
        self.capacity.live().saturating_sub(self.idle.len())
    }
}

impl<T> Drop for Shared<T> {
    fn drop(&mut self) {
        let drained = self.drain();
        if drained > 0 {
            tracing::debug!(drained, "pool dropped, closed idle resources");
        }
    }
}

/// Bounded, thread-safe pool of reusable resources
///
/// `Pool` is a handle: clones share the same idle store and capacity. Once the
/// last handle is dropped the remaining idle resources are closed.
///
/// Resources handed to [`put`](Pool::put) must have come from this pool and
/// must be returned at most once. The pool does not check either.
///
/// # Examples
///
/// ```
/// use chanpool::{Pool, PoolConfiguration, PoolError};
///
/// let config = PoolConfiguration::new()
///     .with_initial_cap(2)
///     .with_max_cap(5)
///     .with_factory(|| Ok(vec![0u8; 16]))
///     .with_close(|_| Ok(()));
///
/// let pool = Pool::new(config).unwrap();
/// assert_eq!(pool.len(), 2);
/// assert_eq!(pool.remain(), 3);
///
/// let held: Vec<_> = (0..5).map(|_| pool.get().unwrap()).collect();
/// assert!(matches!(pool.get(), Err(PoolError::Exhausted)));
///
/// for buf in held {
///     pool.put(buf);
/// }
/// assert_eq!(pool.len(), 5);
/// pool.release();
/// ```
pub struct Pool<T: Send + 'static> {
    shared: Arc<Shared<T>>,
}

impl<T: Send + 'static> Clone for Pool<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Send + 'static> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("idle", &self.len())
            .field("outstanding", &self.outstanding())
            .field("max_cap", &self.max_cap())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl<T: Send + 'static> Pool<T> {
    /// Create a pool and pre-fill it with `initial_cap` resources
    ///
    /// If the factory fails during pre-fill, every resource created so far is
    /// closed and the factory error is returned.
    pub fn new(config: PoolConfiguration<T>) -> PoolResult<Self> {
        config.validate()?;

        let factory = config.factory.ok_or(PoolError::MissingFactory)?;
        let close = config.close.ok_or(PoolError::MissingClose)?;

        let shared = Arc::new(Shared {
            idle: IdleStore::new(config.max_cap),
            capacity: CapacityAccountant::new(config.max_cap),
            closed: RwLock::new(false),
            factory,
            close,
            ping: config.ping,
            idle_timeout: config.idle_timeout,
            metrics: MetricsTracker::new(),
        });

        for _ in 0..config.initial_cap {
            match shared.create() {
                Ok(resource) => {
                    shared.requeue(IdleEntry::new(resource));
                }
                Err(err) => {
                    shared.release();
                    return Err(err);
                }
            }
        }

        tracing::debug!(
            initial_cap = config.initial_cap,
            max_cap = config.max_cap,
            "pool created"
        );

        Ok(Self { shared })
    }

    /// Take a resource, reusing an idle one or creating a new one
    ///
    /// Never blocks: a saturated pool fails with [`PoolError::Exhausted`].
    pub fn get(&self) -> PoolResult<T> {
        self.shared.get()
    }

    /// Take a resource that is put back when the guard is dropped
    pub fn get_guard(&self) -> PoolResult<PooledConnection<T>> {
        let resource = self.shared.get()?;
        Ok(PooledConnection {
            resource: Some(resource),
            pool: self.clone(),
        })
    }

    /// Return a resource taken with [`get`](Pool::get)
    ///
    /// On a released pool the resource is closed instead.
    pub fn put(&self, resource: T) {
        self.shared.put(resource);
    }

    /// Number of idle resources
    ///
    /// Stale entries are counted until a `get` or a sweep closes them.
    pub fn len(&self) -> usize {
        if self.is_closed() {
            return 0;
        }
        self.shared.idle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many more resources may be created
    pub fn remain(&self) -> usize {
        if self.is_closed() {
            return 0;
        }
        self.shared.capacity.remain()
    }

    /// Resources currently held by callers
    pub fn outstanding(&self) -> usize {
        self.shared.outstanding()
    }

    pub fn max_cap(&self) -> usize {
        self.shared.capacity.max()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    /// Close every idle resource and refuse further gets
    ///
    /// Outstanding resources are closed as they are put back. Calling this
    /// more than once has no further effect.
    pub fn release(&self) {
        self.shared.release();
    }

    /// Close idle resources past the idle timeout now
    pub fn sweep_idle(&self) -> usize {
        self.shared.sweep_idle()
    }

    /// Sweep idle resources every `period` on the current tokio runtime
    ///
    /// The task ends once the pool is released or its last handle dropped.
    /// Fails with [`PoolError::NoRuntime`] when called outside a tokio runtime.
    pub fn spawn_sweeper(&self, period: Duration) -> PoolResult<JoinHandle<()>> {
        eviction::spawn_sweeper(Arc::downgrade(&self.shared), period)
    }

    /// Get health status
    pub fn health(&self) -> HealthStatus {
        HealthStatus::new(
            self.len(),
            self.outstanding(),
            self.max_cap(),
            self.is_closed(),
        )
    }

    /// Get pool metrics
    pub fn get_metrics(&self) -> PoolMetrics {
        self.shared
            .metrics
            .get_metrics(self.len(), self.outstanding(), self.max_cap())
    }

    /// Export metrics
    pub fn export_metrics(&self) -> HashMap<String, String> {
        self.get_metrics().export()
    }

    /// Export metrics in Prometheus format
    #[cfg(feature = "prometheus")]
    pub fn export_metrics_prometheus(
        &self,
        pool_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> prometheus::Result<String> {
        MetricsExporter::export_prometheus(&self.get_metrics(), pool_name, tags)
    }
}

/// A resource that returns to its pool when dropped
pub struct PooledConnection<T: Send + 'static> {
    resource: Option<T>,
    pool: Pool<T>,
}

impl<T: Send + 'static> PooledConnection<T> {
    /// Detach the resource; the caller becomes responsible for `put`
    pub fn into_inner(mut self) -> T {
        self.resource.take().expect("resource already taken")
    }
}

impl<T: Send + 'static> Deref for PooledConnection<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.resource.as_ref().expect("resource already taken")
    }
}

impl<T: Send + 'static> DerefMut for PooledConnection<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.resource.as_mut().expect("resource already taken")
    }
}

impl<T: Send + 'static> Drop for PooledConnection<T> {
    fn drop(&mut self) {
        if let Some(resource) = self.resource.take() {
            self.pool.put(resource);
        }
    }
}
