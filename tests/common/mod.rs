#![allow(dead_code)]

use chanpool::PoolConfiguration;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Hands out numbered resources and records every close
#[derive(Default)]
pub struct Ledger {
    next_id: AtomicUsize,
    closed: Mutex<HashSet<usize>>,
    double_closes: AtomicUsize,
}

impl Ledger {
    pub fn created(&self) -> usize {
        self.next_id.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.lock().len()
    }

    pub fn is_closed(&self, id: usize) -> bool {
        self.closed.lock().contains(&id)
    }

    pub fn double_closes(&self) -> usize {
        self.double_closes.load(Ordering::SeqCst)
    }
}

pub fn ledger_config(
    initial: usize,
    max: usize,
) -> (PoolConfiguration<usize>, Arc<Ledger>) {
    let ledger = Arc::new(Ledger::default());
    let factory_ledger = Arc::clone(&ledger);
    let close_ledger = Arc::clone(&ledger);

    let config = PoolConfiguration::new()
        .with_initial_cap(initial)
        .with_max_cap(max)
        .with_factory(move || Ok(factory_ledger.next_id.fetch_add(1, Ordering::SeqCst)))
        .with_close(move |id| {
            if !close_ledger.closed.lock().insert(id) {
                close_ledger.double_closes.fetch_add(1, Ordering::SeqCst);
            }
            Ok(())
        });

    (config, ledger)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("chanpool=debug")
        .try_init();
}
