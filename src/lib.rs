//! # chanpool
//!
//! Bounded, thread-safe pool of reusable connections, or of any resource that
//! is expensive to create.
//!
//! ## Features
//!
//! - Hard ceiling on idle plus outstanding resources, enforced with atomic
//!   admission
//! - Non-blocking `get` and `put` backed by a lock-free bounded queue
//! - Pre-population of `initial_cap` resources
//! - Idle-timeout eviction on access, with an optional periodic sweeper
//! - Optional liveness ping before reuse
//! - Scoped checkout via RAII guards
//! - Health status and metrics, with Prometheus export
//!
//! ## Quick Start
//!
//! ```rust
//! use chanpool::{Pool, PoolConfiguration};
//! use std::time::Duration;
//!
//! let config = PoolConfiguration::new()
//!     .with_initial_cap(1)
//!     .with_max_cap(4)
//!     .with_factory(|| Ok(String::from("connection")))
//!     .with_close(|_conn| Ok(()))
//!     .with_idle_timeout(Duration::from_secs(15));
//!
//! let pool = Pool::new(config).unwrap();
//! {
//!     let conn = pool.get_guard().unwrap();
//!     println!("Got: {}", *conn);
//!     // returned to the pool when `conn` goes out of scope
//! }
//! assert_eq!(pool.len(), 1);
//! pool.release();
//! ```

mod capacity;
mod config;
mod errors;
mod eviction;
mod health;
mod idle;
mod metrics;
mod pool;

pub use config::PoolConfiguration;
pub use errors::{BoxError, PoolError, PoolResult};
pub use health::HealthStatus;
#[cfg(feature = "prometheus")]
pub use metrics::MetricsExporter;
pub use metrics::PoolMetrics;
pub use pool::{Pool, PooledConnection};
