//! Capacity accounting

use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts every live resource, idle or outstanding, against `max`
///
/// A slot is taken before a resource is created and given back only when the
/// resource is closed. Returning a resource to the idle store does not touch
/// the count.
pub(crate) struct CapacityAccountant {
    live: AtomicUsize,
    max: usize,
}

impl CapacityAccountant {
    pub fn new(max: usize) -> Self {
        Self {
            live: AtomicUsize::new(0),
            max,
        }
    }

    /// Take a slot if one is free
    pub fn try_admit(&self) -> bool {
        self.live
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |live| {
                (live < self.max).then_some(live + 1)
            })
            .is_ok()
    }

    /// Give back a slot after its resource was closed or never created
    pub fn release(&self) {
        let previous = self
            .live
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |live| live.checked_sub(1));
        debug_assert!(previous.is_ok(), "capacity slot released twice");
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    pub fn remain(&self) -> usize {
        self.max.saturating_sub(self.live())
    }

    pub fn max(&self) -> usize {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_admit_until_full() {
        let accountant = CapacityAccountant::new(2);
        assert!(accountant.try_admit());
        assert!(accountant.try_admit());
        assert!(!accountant.try_admit());
        assert_eq!(accountant.remain(), 0);

        accountant.release();
        assert_eq!(accountant.live(), 1);
        assert_eq!(accountant.remain(), 1);
    }

    #[test]
    fn test_concurrent_admission_never_overshoots() {
        let accountant = Arc::new(CapacityAccountant::new(50));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let accountant = Arc::clone(&accountant);
                thread::spawn(move || (0..100).filter(|_| accountant.try_admit()).count())
            })
            .collect();

        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 50);
        assert_eq!(accountant.live(), 50);
        assert_eq!(accountant.max(), 50);
    }
}
