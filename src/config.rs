//! Pool configuration options

use crate::errors::{BoxError, PoolError, PoolResult};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub(crate) type FactoryFn<T> = Arc<dyn Fn() -> Result<T, BoxError> + Send + Sync>;
pub(crate) type CloseFn<T> = Arc<dyn Fn(T) -> Result<(), BoxError> + Send + Sync>;
pub(crate) type PingFn<T> = Arc<dyn Fn(&T) -> Result<(), BoxError> + Send + Sync>;

/// Configuration for pool behavior
///
/// # Examples
///
/// ```
/// use chanpool::PoolConfiguration;
/// use std::time::Duration;
///
/// let config = PoolConfiguration::<u32>::new()
///     .with_initial_cap(2)
///     .with_max_cap(5)
///     .with_factory(|| Ok(7))
///     .with_close(|_| Ok(()))
///     .with_idle_timeout(Duration::from_secs(15));
///
/// assert_eq!(config.initial_cap, 2);
/// assert_eq!(config.max_cap, 5);
/// assert_eq!(config.idle_timeout, Some(Duration::from_secs(15)));
/// ```
pub struct PoolConfiguration<T> {
    /// Number of resources created eagerly by `Pool::new`
    pub initial_cap: usize,

    /// Hard ceiling on idle plus outstanding resources
    pub max_cap: usize,

    /// Idle resources older than this are closed instead of handed out
    pub idle_timeout: Option<Duration>,

    pub(crate) factory: Option<FactoryFn<T>>,
    pub(crate) close: Option<CloseFn<T>>,
    pub(crate) ping: Option<PingFn<T>>,
}

impl<T> Default for PoolConfiguration<T> {
    fn default() -> Self {
        Self {
            initial_cap: 0,
            max_cap: 100,
            idle_timeout: None,
            factory: None,
            close: None,
            ping: None,
        }
    }
}

impl<T> Clone for PoolConfiguration<T> {
    fn clone(&self) -> Self {
        Self {
            initial_cap: self.initial_cap,
            max_cap: self.max_cap,
            idle_timeout: self.idle_timeout,
            factory: self.factory.clone(),
            close: self.close.clone(),
            ping: self.ping.clone(),
        }
    }
}

impl<T> fmt::Debug for PoolConfiguration<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolConfiguration")
            .field("initial_cap", &self.initial_cap)
            .field("max_cap", &self.max_cap)
            .field("idle_timeout", &self.idle_timeout)
            .field("factory", &self.factory.is_some())
            .field("close", &self.close.is_some())
            .field("ping", &self.ping.is_some())
            .finish()
    }
}

impl<T> PoolConfiguration<T> {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of resources to create up front
    pub fn with_initial_cap(mut self, cap: usize) -> Self {
        self.initial_cap = cap;
        self
    }

    /// Set the maximum number of idle plus outstanding resources
    ///
    /// # Examples
    ///
    /// ```
    /// use chanpool::PoolConfiguration;
    ///
    /// let config = PoolConfiguration::<i32>::new()
    ///     .with_max_cap(50);
    ///
    /// assert_eq!(config.max_cap, 50);
    /// ```
    pub fn with_max_cap(mut self, cap: usize) -> Self {
        self.max_cap = cap;
        self
    }

    /// Set the function that creates a resource
    pub fn with_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.factory = Some(Arc::new(factory));
        self
    }

    /// Set the function that destroys a resource
    pub fn with_close<F>(mut self, close: F) -> Self
    where
        F: Fn(T) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.close = Some(Arc::new(close));
        self
    }

    /// Set the idle timeout
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    /// Probe idle resources before handing them out; a failing probe closes the resource
    pub fn with_ping<F>(mut self, ping: F) -> Self
    where
        F: Fn(&T) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.ping = Some(Arc::new(ping));
        self
    }

    /// Check capacities and collaborators
    ///
    /// ```
    /// use chanpool::{PoolConfiguration, PoolError};
    ///
    /// let config = PoolConfiguration::<i32>::new()
    ///     .with_initial_cap(6)
    ///     .with_max_cap(5)
    ///     .with_factory(|| Ok(1))
    ///     .with_close(|_| Ok(()));
    ///
    /// assert!(matches!(config.validate(), Err(PoolError::InvalidCapacity { initial: 6, max: 5 })));
    /// ```
    pub fn validate(&self) -> PoolResult<()> {
        if self.max_cap == 0 || self.initial_cap > self.max_cap {
            return Err(PoolError::InvalidCapacity {
                initial: self.initial_cap,
                max: self.max_cap,
            });
        }
        if self.factory.is_none() {
            return Err(PoolError::MissingFactory);
        }
        if self.close.is_none() {
            return Err(PoolError::MissingClose);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> PoolConfiguration<u8> {
        PoolConfiguration::new()
            .with_factory(|| Ok(0))
            .with_close(|_| Ok(()))
    }

    #[test]
    fn test_defaults() {
        let config = PoolConfiguration::<u8>::default();
        assert_eq!(config.initial_cap, 0);
        assert_eq!(config.max_cap, 100);
        assert!(config.idle_timeout.is_none());
        assert!(config.ping.is_none());
    }

    #[test]
    fn test_validate_accepts_initial_equal_to_max() {
        let config = complete().with_initial_cap(4).with_max_cap(4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_max() {
        let config = complete().with_max_cap(0);
        assert!(matches!(
            config.validate(),
            Err(PoolError::InvalidCapacity { initial: 0, max: 0 })
        ));
    }

    #[test]
    fn test_validate_requires_collaborators() {
        let no_factory = PoolConfiguration::<u8>::new().with_close(|_| Ok(()));
        assert!(matches!(no_factory.validate(), Err(PoolError::MissingFactory)));

        let no_close = PoolConfiguration::<u8>::new().with_factory(|| Ok(1));
        assert!(matches!(no_close.validate(), Err(PoolError::MissingClose)));
    }

    #[test]
    fn test_debug_hides_closures() {
        let rendered = format!("{:?}", complete().with_max_cap(3));
        assert!(rendered.contains("max_cap: 3"));
        assert!(rendered.contains("factory: true"));
        assert!(rendered.contains("ping: false"));
    }
}
