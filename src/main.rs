// Binary wrapper around the library - see demos/ for usage examples
// Run: cargo run --example basic

use chanpool::{Pool, PoolConfiguration, PoolResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn main() -> PoolResult<()> {
    println!("=== chanpool ===");
    println!("See demos/ directory for usage examples");
    println!();

    let next_id = Arc::new(AtomicUsize::new(1));
    let config = PoolConfiguration::new()
        .with_initial_cap(2)
        .with_max_cap(5)
        .with_factory(move || Ok(next_id.fetch_add(1, Ordering::Relaxed)))
        .with_close(|id| {
            println!("  closing resource #{}", id);
            Ok(())
        });

    let pool = Pool::new(config)?;
    println!("Quick Demo:");
    println!("  idle: {}, remain: {}", pool.len(), pool.remain());

    let conn = pool.get()?;
    println!("  got resource #{}", conn);
    println!("  idle: {}, remain: {}", pool.len(), pool.remain());

    pool.put(conn);
    println!("  idle after put: {}", pool.len());

    pool.release();
    Ok(())
}
