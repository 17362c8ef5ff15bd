use super::solvers::traits::{Observer, Progress};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation flag, shareable across threads.
///
/// Cancelling takes effect at the next boundary between outer iterations; an
/// objective evaluation already in flight always completes.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Observer for CancelToken {
    fn on_iteration(&mut self, _progress: &Progress) {}

    fn should_stop(&self) -> bool {
        self.is_cancelled()
    }
}

/// Run two observers side by side; stop when either asks to.
impl<A, B> Observer for (A, B)
where
    A: Observer,
    B: Observer,
{
    fn on_iteration(&mut self, progress: &Progress) {
        self.0.on_iteration(progress);
        self.1.on_iteration(progress);
    }

    fn should_stop(&self) -> bool {
        self.0.should_stop() || self.1.should_stop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_clones_share_state() {
        let token = CancelToken::new();
        let observer = token.clone();
        assert!(!observer.should_stop());

        token.cancel();
        assert!(observer.should_stop());
    }

    #[test]
    fn pair_stops_when_either_stops() {
        let token = CancelToken::new();
        let mut count = 0;
        {
            let mut pair = (|_: &Progress| count += 1, token.clone());
            let progress = Progress {
                iteration: 1,
                best_params: vec![],
                best_score: 0.0,
                evaluations: 0,
            };
            pair.on_iteration(&progress);
            assert!(!pair.should_stop());
            token.cancel();
            assert!(pair.should_stop());
        }
        assert_eq!(count, 1);
    }
}
