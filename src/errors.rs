//! Error types for the connection pool

use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;

/// Error type produced by the factory, close and ping collaborators
pub type BoxError = Box<dyn StdError + Send + Sync>;

#[derive(Error, Debug, Clone)]
pub enum PoolError {
    #[error("Invalid capacity: initial {initial} must not exceed max {max}, and max must be non-zero")]
    InvalidCapacity { initial: usize, max: usize },

    #[error("No factory configured")]
    MissingFactory,

    #[error("No close function configured")]
    MissingClose,

    #[error("Factory failed to create a resource: {0}")]
    Factory(#[source] Arc<dyn StdError + Send + Sync>),

    #[error("Pool is exhausted - no idle resources and no capacity left")]
    Exhausted,

    #[error("Pool has been released")]
    Closed,

    #[error("No tokio runtime available to run the idle sweeper")]
    NoRuntime,
}

impl PoolError {
    pub(crate) fn factory(err: BoxError) -> Self {
        PoolError::Factory(Arc::from(err))
    }

    /// Whether a later `get` may succeed without any change to the configuration
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PoolError::Factory(_) | PoolError::Exhausted)
    }
}

pub type PoolResult<T> = Result<T, PoolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_error_keeps_source() {
        let err = PoolError::factory("connection refused".into());
        assert!(err.source().is_some());
        assert!(err.to_string().contains("connection refused"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_configuration_errors_are_fatal() {
        assert!(!PoolError::MissingFactory.is_recoverable());
        assert!(!PoolError::InvalidCapacity { initial: 3, max: 2 }.is_recoverable());
        assert!(!PoolError::Closed.is_recoverable());
        assert!(!PoolError::NoRuntime.is_recoverable());
    }
}
