use std::sync::atomic::{AtomicBool, Ordering};

/// Signal channel from postlists back to the enclosing match.
///
/// Composite postlists ping this when their weight bound drops (a branch is
/// exhausted, or `recalc_maxweight` lowered the bound), so the matcher knows
/// its pruning thresholds are stale.
#[derive(Debug, Default)]
pub struct MatchNotifier {
    recalc_needed: AtomicBool,
}

impl MatchNotifier {
    pub fn new() -> Self {
        MatchNotifier {
            recalc_needed: AtomicBool::new(false),
        }
    }

    pub fn notify(&self) {
        self.recalc_needed.store(true, Ordering::Relaxed);
    }

    /// Read and clear the pending flag.
    pub fn take(&self) -> bool {
        self.recalc_needed.swap(false, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_clears_the_flag() {
        let notifier = MatchNotifier::new();
        assert!(!notifier.take());
        notifier.notify();
        assert!(notifier.take());
        assert!(!notifier.take());
    }
}
