//! Advisory progress notifications for long-running archive builds.

use tokio::sync::mpsc::UnboundedSender;

/// One progress notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    /// Completed share of the work, in `0.0..=1.0`.
    pub fraction: f64,
    /// Human readable status line.
    pub label: String,
}

impl Progress {
    pub fn new(done: usize, total: usize, label: impl Into<String>) -> Self {
        let fraction = if total == 0 {
            1.0
        } else {
            (done as f64 / total as f64).clamp(0.0, 1.0)
        };
        Self {
            fraction,
            label: label.into(),
        }
    }

    pub fn percent(&self) -> u8 {
        (self.fraction * 100.0).round() as u8
    }
}

/// Receiver of progress notifications.
///
/// Delivery is best effort: a sink that cannot deliver simply drops the
/// notification, it never fails the operation being reported on.
pub trait ProgressSink {
    fn report(&mut self, progress: Progress);
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _progress: Progress) {}
}

impl<F: FnMut(Progress)> ProgressSink for F {
    fn report(&mut self, progress: Progress) {
        self(progress)
    }
}

impl ProgressSink for UnboundedSender<Progress> {
    fn report(&mut self, progress: Progress) {
        // The receiver may have gone away; progress is advisory.
        let _ = self.send(progress);
    }
}
