//! Pre-injection drain of the host's pending-item buffer.
use log::{debug, warn};
use serde::Serialize;

use crate::host::PendingQueue;

/// What the drain accomplished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrainOutcome {
    pub removed: u32,
    /// True when a removal did not shrink the queue (or failed outright) and
    /// the drain stopped early.
    pub stalled: bool,
}

/// Remove items from the back of the queue until it is empty, the iteration
/// budget runs out, or a removal fails to shrink it.
///
/// The stall check is the hard guard against an infinite loop: a removal that
/// reports success while the observed length stays the same stops the drain
/// immediately.
pub fn drain_pending<Q: PendingQueue>(queue: &mut Q, max_iterations: u32) -> DrainOutcome {
    let mut outcome = DrainOutcome::default();

    for _ in 0..max_iterations {
        let before = queue.len();
        if before == 0 {
            break;
        }
        match queue.remove_back() {
            Ok(()) => {
                if queue.len() >= before {
                    warn!("pending-item drain stalled: queue did not shrink from {before}");
                    outcome.stalled = true;
                    return outcome;
                }
                outcome.removed = outcome.removed.saturating_add(1);
            }
            Err(err) => {
                warn!("pending-item removal failed after {} items: {err}", outcome.removed);
                outcome.stalled = true;
                return outcome;
            }
        }
    }

    if !queue.is_empty() {
        debug!(
            "drain budget of {max_iterations} exhausted with {} items left",
            queue.len()
        );
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostError;

    struct FakeQueue {
        items: usize,
        sticky: bool,
        fail: bool,
    }

    impl PendingQueue for FakeQueue {
        fn len(&self) -> usize {
            self.items
        }

        fn remove_back(&mut self) -> Result<(), HostError> {
            if self.fail {
                return Err(HostError::RemovalFailed("host said no".to_string()));
            }
            if !self.sticky {
                self.items -= 1;
            }
            Ok(())
        }
    }

    #[test]
    fn drains_everything_within_budget() {
        let mut queue = FakeQueue {
            items: 5,
            sticky: false,
            fail: false,
        };
        let outcome = drain_pending(&mut queue, 100);
        assert_eq!(outcome, DrainOutcome { removed: 5, stalled: false });
        assert!(queue.is_empty());
    }

    #[test]
    fn sticky_queue_stops_after_one_attempt() {
        let mut queue = FakeQueue {
            items: 5,
            sticky: true,
            fail: false,
        };
        let outcome = drain_pending(&mut queue, 100);
        assert!(outcome.stalled);
        assert_eq!(outcome.removed, 0);
    }

    #[test]
    fn budget_bounds_the_drain() {
        let mut queue = FakeQueue {
            items: 10,
            sticky: false,
            fail: false,
        };
        let outcome = drain_pending(&mut queue, 3);
        assert_eq!(outcome.removed, 3);
        assert!(!outcome.stalled);
        assert_eq!(queue.len(), 7);
    }

    #[test]
    fn removal_failure_is_nonfatal() {
        let mut queue = FakeQueue {
            items: 4,
            sticky: false,
            fail: true,
        };
        let outcome = drain_pending(&mut queue, 100);
        assert!(outcome.stalled);
        assert_eq!(outcome.removed, 0);
    }

    #[test]
    fn empty_queue_is_a_noop() {
        let mut queue = FakeQueue {
            items: 0,
            sticky: false,
            fail: false,
        };
        let outcome = drain_pending(&mut queue, 100);
        assert_eq!(outcome, DrainOutcome::default());
    }
}
