//! Step counting and percentage reporting.
//!
//! The total is computed once, before any step executes, from the manifest
//! line counts plus a fixed constant for the non-counted steps (build, shell
//! patch, shortcuts). There is no reconciliation afterwards: if a step is
//! skipped the reported percentage simply never reaches 100, and a completed
//! count above the total is tolerated.
use std::sync::atomic::{AtomicU32, Ordering};

use crate::logging::Log;

/// Number of steps not derived from manifest contents: the kiterunner build,
/// the shell-rc patch, and the shortcut pass.
pub const FIXED_STEPS: u32 = 3;

/// Explicit progress state threaded through the task context.
#[derive(Debug)]
pub struct Progress {
    total: u32,
    completed: AtomicU32,
}

impl Progress {
    /// Create a tracker for `total` planned steps.
    #[must_use]
    pub const fn new(total: u32) -> Self {
        Self {
            total,
            completed: AtomicU32::new(0),
        }
    }

    /// Total planned steps.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.total
    }

    /// Steps completed so far.
    #[must_use]
    pub fn completed(&self) -> u32 {
        self.completed.load(Ordering::SeqCst)
    }

    /// Mark one step complete and report the new percentage.
    pub fn advance(&self, log: &dyn Log) {
        let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        let pct = f64::from(done) / f64::from(self.total.max(1)) * 100.0;
        log.info(&format!("progress: {pct:.2}% complete"));
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::TaskStatus;
    use std::sync::Mutex;

    /// Log capturing info messages for assertions.
    #[derive(Debug, Default)]
    struct CaptureLog {
        messages: Mutex<Vec<String>>,
    }

    impl CaptureLog {
        fn infos(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }
    }

    impl Log for CaptureLog {
        fn stage(&self, _: &str) {}
        fn info(&self, msg: &str) {
            self.messages.lock().unwrap().push(msg.to_string());
        }
        fn debug(&self, _: &str) {}
        fn warn(&self, _: &str) {}
        fn error(&self, _: &str) {}
        fn simulate(&self, _: &str) {}
        fn record_task(&self, _: &str, _: TaskStatus, _: Option<&str>) {}
    }

    #[test]
    fn advance_increments_completed() {
        let log = CaptureLog::default();
        let progress = Progress::new(5);
        progress.advance(&log);
        progress.advance(&log);
        assert_eq!(progress.completed(), 2);
        assert_eq!(progress.total(), 5);
    }

    #[test]
    fn percentage_has_two_decimals() {
        let log = CaptureLog::default();
        let progress = Progress::new(3);
        progress.advance(&log);
        assert_eq!(log.infos(), vec!["progress: 33.33% complete"]);
    }

    #[test]
    fn full_run_reports_one_hundred() {
        let log = CaptureLog::default();
        let progress = Progress::new(5);
        for _ in 0..5 {
            progress.advance(&log);
        }
        assert_eq!(
            log.infos().last().map(String::as_str),
            Some("progress: 100.00% complete")
        );
    }

    #[test]
    fn tolerates_exceeding_total() {
        let log = CaptureLog::default();
        let progress = Progress::new(2);
        for _ in 0..3 {
            progress.advance(&log);
        }
        assert_eq!(
            log.infos().last().map(String::as_str),
            Some("progress: 150.00% complete")
        );
    }

    #[test]
    fn zero_total_does_not_panic() {
        let log = CaptureLog::default();
        let progress = Progress::new(0);
        progress.advance(&log);
        assert_eq!(progress.completed(), 1);
    }
}
