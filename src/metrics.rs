//! Metrics collection and export for connection pools

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Metrics data for a pool
///
/// # Examples
///
/// ```
/// use chanpool::{Pool, PoolConfiguration};
///
/// let config = PoolConfiguration::new()
///     .with_initial_cap(1)
///     .with_max_cap(3)
///     .with_factory(|| Ok(String::from("conn")))
///     .with_close(|_| Ok(()));
/// let pool = Pool::new(config).unwrap();
///
/// let conn = pool.get().unwrap();
/// let metrics = pool.get_metrics();
/// assert_eq!(metrics.total_created, 1);
/// assert_eq!(metrics.total_reused, 1);
/// assert_eq!(metrics.outstanding, 1);
/// pool.put(conn);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PoolMetrics {
    /// Resources produced by the factory, including pre-fill
    pub total_created: usize,

    /// Gets served from the idle store
    pub total_reused: usize,

    /// Resources returned with `put`
    pub total_returned: usize,

    /// Idle resources closed for exceeding the idle timeout
    pub total_evicted: usize,

    /// Idle resources closed after a failed ping
    pub ping_failures: usize,

    /// Resources handed to the close function
    pub total_closed: usize,

    /// Close calls that reported an error
    pub close_failures: usize,

    /// Gets rejected because the pool was saturated
    pub exhausted_events: usize,

    /// Factory calls that failed
    pub factory_failures: usize,

    /// Current idle resources
    pub idle: usize,

    /// Current outstanding resources
    pub outstanding: usize,

    /// Pool utilization ratio (0.0 to 1.0)
    pub utilization: f64,

    /// Maximum pool capacity
    pub max_capacity: usize,
}

impl PoolMetrics {
    /// Export metrics as a HashMap
    pub fn export(&self) -> HashMap<String, String> {
        let mut metrics = HashMap::new();
        metrics.insert("total_created".to_string(), self.total_created.to_string());
        metrics.insert("total_reused".to_string(), self.total_reused.to_string());
        metrics.insert("total_returned".to_string(), self.total_returned.to_string());
        metrics.insert("total_evicted".to_string(), self.total_evicted.to_string());
        metrics.insert("ping_failures".to_string(), self.ping_failures.to_string());
        metrics.insert("total_closed".to_string(), self.total_closed.to_string());
        metrics.insert("close_failures".to_string(), self.close_failures.to_string());
        metrics.insert("exhausted_events".to_string(), self.exhausted_events.to_string());
        metrics.insert("factory_failures".to_string(), self.factory_failures.to_string());
        metrics.insert("idle".to_string(), self.idle.to_string());
        metrics.insert("outstanding".to_string(), self.outstanding.to_string());
        metrics.insert("utilization".to_string(), format!("{:.2}", self.utilization));
        metrics.insert("max_capacity".to_string(), self.max_capacity.to_string());
        metrics
    }
}

/// Metrics exporter for Prometheus format
#[cfg(feature = "prometheus")]
pub struct MetricsExporter;

#[cfg(feature = "prometheus")]
impl MetricsExporter {
    /// Export metrics in Prometheus exposition format
    ///
    /// # Examples
    ///
    /// ```
    /// use chanpool::{Pool, PoolConfiguration};
    /// use std::collections::HashMap;
    ///
    /// let config = PoolConfiguration::new()
    ///     .with_max_cap(4)
    ///     .with_factory(|| Ok(0u8))
    ///     .with_close(|_| Ok(()));
    /// let pool = Pool::new(config).unwrap();
    ///
    /// let mut tags = HashMap::new();
    /// tags.insert("service".to_string(), "api".to_string());
    ///
    /// let output = pool.export_metrics_prometheus("my_pool", Some(&tags)).unwrap();
    /// assert!(output.contains("chanpool_resources_idle"));
    /// assert!(output.contains("service=\"api\""));
    /// ```
    pub fn export_prometheus(
        metrics: &PoolMetrics,
        pool_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> prometheus::Result<String> {
        use prometheus::{Encoder, IntCounter, IntGauge, Opts, Registry, TextEncoder};

        let mut labels = HashMap::new();
        labels.insert("pool".to_string(), pool_name.to_string());
        if let Some(tags) = tags {
            labels.extend(tags.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        let registry = Registry::new_custom(Some("chanpool".to_string()), Some(labels))?;

        let gauges = [
            ("resources_idle", "Current idle resources", metrics.idle),
            ("resources_outstanding", "Current outstanding resources", metrics.outstanding),
            ("resources_max", "Maximum pool capacity", metrics.max_capacity),
        ];
        for (name, help, value) in gauges {
            let gauge = IntGauge::with_opts(Opts::new(name, help))?;
            gauge.set(value as i64);
            registry.register(Box::new(gauge))?;
        }

        let counters = [
            ("resources_created_total", "Resources created by the factory", metrics.total_created),
            ("resources_reused_total", "Gets served from idle resources", metrics.total_reused),
            ("resources_returned_total", "Resources returned to the pool", metrics.total_returned),
            ("resources_evicted_total", "Idle resources evicted by timeout", metrics.total_evicted),
            ("resources_closed_total", "Resources closed", metrics.total_closed),
            ("ping_failures_total", "Idle resources failing their ping", metrics.ping_failures),
            ("close_failures_total", "Close calls that failed", metrics.close_failures),
            ("events_exhausted_total", "Gets rejected on a saturated pool", metrics.exhausted_events),
            ("factory_failures_total", "Factory calls that failed", metrics.factory_failures),
        ];
        for (name, help, value) in counters {
            let counter = IntCounter::with_opts(Opts::new(name, help))?;
            counter.inc_by(value as u64);
            registry.register(Box::new(counter))?;
        }

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|err| prometheus::Error::Msg(err.to_string()))
    }
}

/// Internal metrics tracker
#[derive(Default)]
pub(crate) struct MetricsTracker {
    pub total_created: AtomicUsize,
    pub total_reused: AtomicUsize,
    pub total_returned: AtomicUsize,
    pub total_evicted: AtomicUsize,
    pub ping_failures: AtomicUsize,
    pub total_closed: AtomicUsize,
    pub close_failures: AtomicUsize,
    pub exhausted_events: AtomicUsize,
    pub factory_failures: AtomicUsize,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn incr(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_metrics(&self, idle: usize, outstanding: usize, capacity: usize) -> PoolMetrics {
        let utilization = if capacity > 0 {
            outstanding as f64 / capacity as f64
        } else {
            0.0
        };

        PoolMetrics {
            total_created: self.total_created.load(Ordering::Relaxed),
            total_reused: self.total_reused.load(Ordering::Relaxed),
            total_returned: self.total_returned.load(Ordering::Relaxed),
            total_evicted: self.total_evicted.load(Ordering::Relaxed),
            ping_failures: self.ping_failures.load(Ordering::Relaxed),
            total_closed: self.total_closed.load(Ordering::Relaxed),
            close_failures: self.close_failures.load(Ordering::Relaxed),
            exhausted_events: self.exhausted_events.load(Ordering::Relaxed),
            factory_failures: self.factory_failures.load(Ordering::Relaxed),
            idle,
            outstanding,
            utilization,
            max_capacity: capacity,
        }
    }
}
