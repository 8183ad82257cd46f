//! Basic usage examples for Pool

use chanpool::{Pool, PoolConfiguration, PoolError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() {
    println!("=== chanpool - Basic Examples ===\n");

    // Example 1: Capacity accounting
    capacity_accounting();

    // Example 2: Scoped checkout
    scoped_checkout();

    // Example 3: Idle eviction
    idle_eviction();

    // Example 4: Metrics and health
    metrics_and_health();
}

fn numbered(initial: usize, max: usize) -> PoolConfiguration<usize> {
    let next = Arc::new(AtomicUsize::new(0));
    PoolConfiguration::new()
        .with_initial_cap(initial)
        .with_max_cap(max)
        .with_factory(move || Ok(next.fetch_add(1, Ordering::Relaxed)))
        .with_close(|_| Ok(()))
}

fn capacity_accounting() {
    println!("1. Capacity Accounting:");
    let pool = Pool::new(numbered(2, 5)).unwrap();
    println!("   Start - idle: {}, remain: {}", pool.len(), pool.remain());

    let mut held = Vec::new();
    loop {
        match pool.get() {
            Ok(conn) => held.push(conn),
            Err(PoolError::Exhausted) => break,
            Err(err) => panic!("unexpected error: {}", err),
        }
    }
    println!("   Holding {} - idle: {}, remain: {}", held.len(), pool.len(), pool.remain());

    for conn in held {
        pool.put(conn);
    }
    println!("   Returned all - idle: {}, remain: {}\n", pool.len(), pool.remain());
}

fn scoped_checkout() {
    println!("2. Scoped Checkout:");
    let pool = Pool::new(numbered(1, 2)).unwrap();

    {
        let conn = pool.get_guard().unwrap();
        println!("   Got resource #{}", *conn);
        println!("   Outstanding: {}", pool.outstanding());
    }

    println!("   Idle after scope: {}\n", pool.len());
}

fn idle_eviction() {
    println!("3. Idle Eviction:");
    let config = numbered(3, 3).with_idle_timeout(Duration::from_millis(50));
    let pool = Pool::new(config).unwrap();

    thread::sleep(Duration::from_millis(80));
    println!("   Idle before get (stale): {}", pool.len());

    let conn = pool.get().unwrap();
    println!("   Got fresh resource #{}, idle now: {}", conn, pool.len());
    pool.put(conn);
    println!();
}

fn metrics_and_health() {
    println!("4. Metrics and Health:");
    let pool = Pool::new(numbered(2, 5)).unwrap();

    {
        let _a = pool.get_guard().unwrap();
        let _b = pool.get_guard().unwrap();

        let health = pool.health();
        println!("   Health: {}", if health.is_healthy { "Healthy" } else { "Unhealthy" });
        println!("   Utilization: {:.1}%", health.utilization * 100.0);
        println!("   Outstanding: {}, Idle: {}", health.outstanding, health.idle);
    }

    let metrics = pool.export_metrics();
    println!("\n   Metrics:");
    for (key, value) in metrics {
        println!("     {}: {}", key, value);
    }
}
