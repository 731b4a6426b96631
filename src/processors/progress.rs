// borderly/src/processors/progress.rs
use crossbeam_channel::Sender;
use indicatif::ProgressBar;

/// A `(completed, total)` progress update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    pub fn is_done(&self) -> bool {
        self.completed >= self.total
    }
}

/// Receives progress from a running batch.
///
/// Called from worker threads while the scheduler holds its result lock, so
/// updates arrive strictly in order. Implementations should return quickly.
pub trait ProgressSink: Sync {
    fn report(&self, completed: usize, total: usize);
}

impl ProgressSink for () {
    fn report(&self, _completed: usize, _total: usize) {}
}

impl<F> ProgressSink for F
where
    F: Fn(usize, usize) + Sync,
{
    fn report(&self, completed: usize, total: usize) {
        self(completed, total)
    }
}

/// For callers polling from their own event loop. A dropped receiver is ignored.
impl ProgressSink for Sender<Progress> {
    fn report(&self, completed: usize, total: usize) {
        let _ = self.send(Progress { completed, total });
    }
}

impl ProgressSink for ProgressBar {
    fn report(&self, completed: usize, total: usize) {
        self.set_length(total as u64);
        self.set_position(completed as u64);
    }
}
