//! Eviction of idle resources
//!
//! Eviction is lazy: `get` inspects each popped entry and closes the ones that
//! sat idle past the timeout or fail the configured ping. A sweeper task can
//! additionally purge stale entries on a fixed period.

use crate::config::PingFn;
use crate::errors::{BoxError, PoolError, PoolResult};
use crate::idle::IdleEntry;
use crate::pool::Shared;

use std::sync::Weak;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Outcome of inspecting a popped idle entry
pub(crate) enum Verdict {
    Fresh,
    Stale,
    Unhealthy(BoxError),
}

pub(crate) fn inspect<T>(
    entry: &IdleEntry<T>,
    idle_timeout: Option<Duration>,
    ping: Option<&PingFn<T>>,
) -> Verdict {
    if entry.is_stale(idle_timeout) {
        return Verdict::Stale;
    }
    match ping.map(|ping| ping(&entry.resource)) {
        Some(Err(err)) => Verdict::Unhealthy(err),
        _ => Verdict::Fresh,
    }
}

/// Run `sweep_idle` every `period` until the pool is released or dropped
pub(crate) fn spawn_sweeper<T: Send + 'static>(
    shared: Weak<Shared<T>>,
    period: Duration,
) -> PoolResult<JoinHandle<()>> {
    let runtime = Handle::try_current().map_err(|_| PoolError::NoRuntime)?;
    let period = period.max(Duration::from_millis(1));

    Ok(runtime.spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let Some(shared) = shared.upgrade() else {
                break;
            };
            if shared.is_closed() {
                break;
            }

            let evicted = shared.sweep_idle();
            if evicted > 0 {
                tracing::debug!(evicted, "idle sweep closed stale resources");
            }
        }

        tracing::trace!("idle sweeper stopped");
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_fresh_without_policy() {
        let entry = IdleEntry::new(5);
        assert!(matches!(inspect(&entry, None, None), Verdict::Fresh));
    }

    #[test]
    fn test_stale_wins_over_ping() {
        let entry = IdleEntry::new(5);
        thread::sleep(Duration::from_millis(15));

        let ping: PingFn<i32> = Arc::new(|_: &i32| -> Result<(), BoxError> { Err("unreachable".into()) });
        let verdict = inspect(&entry, Some(Duration::from_millis(1)), Some(&ping));
        assert!(matches!(verdict, Verdict::Stale));
    }

    #[test]
    fn test_failed_ping_is_unhealthy() {
        let entry = IdleEntry::new(-1);
        let ping: PingFn<i32> = Arc::new(|v: &i32| -> Result<(), BoxError> {
            if *v < 0 {
                Err("negative".into())
            } else {
                Ok(())
            }
        });

        match inspect(&entry, Some(Duration::from_secs(60)), Some(&ping)) {
            Verdict::Unhealthy(err) => assert_eq!(err.to_string(), "negative"),
            _ => panic!("expected an unhealthy verdict"),
        }
    }
}
