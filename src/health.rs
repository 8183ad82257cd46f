//! Health monitoring for connection pools

/// Health status of a pool
///
/// # Examples
///
/// ```
/// use chanpool::{Pool, PoolConfiguration};
///
/// let config = PoolConfiguration::new()
///     .with_initial_cap(3)
///     .with_max_cap(10)
///     .with_factory(|| Ok(1u16))
///     .with_close(|_| Ok(()));
/// let pool = Pool::new(config).unwrap();
///
/// let health = pool.health();
/// assert!(health.is_healthy());
/// assert_eq!(health.idle, 3);
/// ```
#[derive(Debug, Clone)]
pub struct HealthStatus {
    /// Whether the pool is healthy
    pub is_healthy: bool,

    /// Current pool utilization (0.0 to 1.0)
    pub utilization: f64,

    /// Idle resources count
    pub idle: usize,

    /// Outstanding resources count
    pub outstanding: usize,

    /// Total capacity
    pub max_capacity: usize,

    /// Warning messages
    pub warnings: Vec<String>,
}

impl HealthStatus {
    /// Create a new health status
    pub fn new(idle: usize, outstanding: usize, capacity: usize, closed: bool) -> Self {
        let utilization = if capacity > 0 {
            outstanding as f64 / capacity as f64
        } else {
            0.0
        };

        let mut warnings = Vec::new();
        let mut is_healthy = true;

        if closed {
            warnings.push("Pool has been released".to_string());
            is_healthy = false;
        }

        if utilization > 0.9 {
            warnings.push(format!("High utilization: {:.1}%", utilization * 100.0));
            is_healthy = false;
        }

        Self {
            is_healthy,
            utilization,
            idle,
            outstanding,
            max_capacity: capacity,
            warnings,
        }
    }

    /// Check if the pool is healthy
    pub fn is_healthy(&self) -> bool {
        self.is_healthy
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturated_pool_warns() {
        let health = HealthStatus::new(0, 10, 10, false);
        assert!(!health.is_healthy());
        assert_eq!(health.warning_count(), 1);
        assert!(health.warnings[0].starts_with("High utilization"));
    }

    #[test]
    fn test_closed_pool_is_unhealthy() {
        let health = HealthStatus::new(0, 0, 5, true);
        assert!(!health.is_healthy());
        assert_eq!(health.warnings, vec!["Pool has been released".to_string()]);
    }
}
