use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable cancellation request shared between a host and a long-running job.
///
/// The job only observes the flag at its own checkpoints; raising it never
/// interrupts work that is already running.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::CancelFlag;

    #[test]
    fn clones_observe_cancel() {
        let flag = CancelFlag::new();
        let observer = flag.clone();
        assert!(!observer.is_cancelled());

        flag.cancel();
        assert!(observer.is_cancelled());

        observer.reset();
        assert!(!flag.is_cancelled());
    }

    #[tokio::test]
    async fn cancel_from_another_task() {
        let flag = CancelFlag::new();
        let handle = tokio::spawn({
            let flag = flag.clone();
            async move { flag.cancel() }
        });
        handle.await.expect("task should not panic");
        assert!(flag.is_cancelled());
    }
}
