// borderly/src/processors/batch.rs
use super::disposition::dispose;
use super::progress::ProgressSink;
use crate::core::{
    validate_profiles, BorderlyError, DispositionError, DispositionPolicy, ProcessingError,
    Profile, Result, TransformPipeline,
};
use crate::utils::default_worker_count;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Upper bound on concurrent transform workers.
pub const MAX_WORKERS: usize = 4;

/// One (file, profile) unit of work.
#[derive(Debug, Clone)]
struct Task<'a> {
    source: &'a Path,
    profile: &'a Profile,
    /// Set when an earlier task already writes the same output file.
    collision: Option<PathBuf>,
}

#[derive(Debug)]
pub struct DispositionFailure {
    pub path: PathBuf,
    pub error: DispositionError,
}

/// Outcome of a batch. Output order is unspecified.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub outputs: Vec<PathBuf>,
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<ProcessingError>,
    pub disposed: usize,
    pub disposition_failures: Vec<DispositionFailure>,
}

impl BatchResult {
    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.disposition_failures.is_empty()
    }

    fn record(&mut self, outcome: std::result::Result<PathBuf, ProcessingError>) {
        self.attempted += 1;
        match outcome {
            Ok(path) => {
                self.succeeded += 1;
                self.outputs.push(path);
            }
            Err(e) => {
                log::warn!("{}", e);
                self.failures.push(e);
            }
        }
    }
}

/// Runs every (file, profile) pair of a batch on a small worker pool, then
/// disposes of each original once all of its tasks are finished.
///
/// Workers pull from one shared queue that is filled before they start and
/// exit as soon as they find it empty. The last worker to exit runs the
/// disposition pass, so no original is deleted or moved while another
/// worker might still be reading it.
///
/// There is no cancellation and no per-task timeout: a hung decode holds
/// its worker until it returns.
pub struct BatchScheduler {
    pipeline: TransformPipeline,
    workers: usize,
}

impl BatchScheduler {
    pub fn new(pipeline: TransformPipeline) -> Self {
        Self {
            pipeline,
            workers: default_worker_count(),
        }
    }

    /// Sets the pool size, clamped to `1..=MAX_WORKERS`.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.clamp(1, MAX_WORKERS);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Processes `files × profiles`, reporting `(completed, total)` after
    /// every task.
    ///
    /// Configuration problems (an unusable disposition policy, invalid or
    /// duplicate profiles) are returned before any task runs. Per-task and
    /// per-file disposition failures are collected in the result instead,
    /// including a task whose output path was already claimed by an earlier
    /// task and a task that panicked.
    pub fn run(
        &self,
        files: &[PathBuf],
        profiles: &[Profile],
        policy: &DispositionPolicy,
        progress: &dyn ProgressSink,
    ) -> Result<BatchResult> {
        policy.validate()?;
        validate_profiles(profiles)?;

        let sources = distinct_sources(files);
        let total = sources.len() * profiles.len();

        if total == 0 {
            log::warn!(
                "Nothing to process ({} files, {} profiles)",
                sources.len(),
                profiles.len()
            );
            progress.report(0, 0);
            return Ok(BatchResult::default());
        }

        let (sender, receiver) = crossbeam_channel::unbounded();
        for task in self.build_tasks(&sources, profiles) {
            sender
                .send(task)
                .map_err(|_| BorderlyError::WorkerPool("Task queue closed".to_string()))?;
        }
        drop(sender);

        let workers = self.workers.min(total);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("borderly-worker-{}", i))
            .build()
            .map_err(|e| BorderlyError::WorkerPool(format!("Failed to create thread pool: {}", e)))?;

        log::info!(
            "Processing {} files with {} profiles ({} tasks) on {} workers",
            sources.len(),
            profiles.len(),
            total,
            workers
        );

        let state = Mutex::new(BatchResult::default());
        let active = AtomicUsize::new(workers);
        progress.report(0, total);

        pool.scope(|scope| {
            for worker_id in 0..workers {
                let receiver = receiver.clone();
                let state = &state;
                let active = &active;
                let sources = &sources;

                scope.spawn(move |_| {
                    // Last one out disposes of the originals, even if this
                    // worker unwinds.
                    let _exit = WorkerExit {
                        active,
                        on_last: Some(|| {
                            let (disposed, failures) = dispose_all(sources, policy);
                            let mut result = lock(state);
                            result.disposed = disposed;
                            result.disposition_failures = failures;
                        }),
                    };

                    let mut handled = 0usize;
                    while let Ok(task) = receiver.try_recv() {
                        let outcome = self.execute(&task);
                        handled += 1;

                        let mut result = lock(state);
                        result.record(outcome);
                        progress.report(result.attempted, total);
                    }
                    log::debug!("Worker {} finished after {} tasks", worker_id, handled);
                });
            }
        });

        let result = state.into_inner().unwrap_or_else(PoisonError::into_inner);

        log::info!(
            "Batch complete: {}/{} tasks succeeded, {} originals disposed, {} disposition failures",
            result.succeeded,
            result.attempted,
            result.disposed,
            result.disposition_failures.len()
        );

        Ok(result)
    }
}

impl BatchScheduler {
    /// The `sources × profiles` cross product in queue order. A task whose
    /// destination an earlier task already writes is marked as colliding.
    fn build_tasks<'a>(&self, sources: &[&'a Path], profiles: &'a [Profile]) -> Vec<Task<'a>> {
        let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
        let mut tasks = Vec::with_capacity(sources.len() * profiles.len());

        for &source in sources {
            for profile in profiles {
                let mut collision = None;
                // Paths that cannot be built fail inside the pipeline instead.
                if let Ok(destination) = self.pipeline.destination(source, profile) {
                    match claimed.get(&destination) {
                        Some(first) => {
                            log::warn!(
                                "{} and {} both map to {}",
                                first.display(),
                                source.display(),
                                destination.display()
                            );
                            collision = Some(destination);
                        }
                        None => {
                            claimed.insert(destination, source);
                        }
                    }
                }
                tasks.push(Task {
                    source,
                    profile,
                    collision,
                });
            }
        }

        tasks
    }

    fn execute(&self, task: &Task<'_>) -> std::result::Result<PathBuf, ProcessingError> {
        let failure = |cause| ProcessingError {
            source_path: task.source.to_path_buf(),
            profile: task.profile.name.clone(),
            cause,
        };

        if let Some(destination) = &task.collision {
            return Err(failure(BorderlyError::OutputCollision(destination.clone())));
        }

        panic::catch_unwind(AssertUnwindSafe(|| {
            self.pipeline.apply(task.source, task.profile)
        }))
        .unwrap_or_else(|payload| Err(failure(BorderlyError::Panicked(panic_message(&*payload)))))
    }
}

/// Decrements the active worker count when a worker exits, normally or by
/// unwinding, and runs `on_last` in the worker that brings it to zero.
struct WorkerExit<'a, F: FnOnce()> {
    active: &'a AtomicUsize,
    on_last: Option<F>,
}

impl<F: FnOnce()> Drop for WorkerExit<'_, F> {
    fn drop(&mut self) {
        if self.active.fetch_sub(1, Ordering::AcqRel) == 1 {
            if let Some(on_last) = self.on_last.take() {
                on_last();
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn lock(state: &Mutex<BatchResult>) -> MutexGuard<'_, BatchResult> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Input order with repeats removed.
fn distinct_sources(files: &[PathBuf]) -> Vec<&Path> {
    let mut seen = HashSet::new();
    files
        .iter()
        .map(PathBuf::as_path)
        .filter(|path| seen.insert(*path))
        .collect()
}

fn dispose_all(sources: &[&Path], policy: &DispositionPolicy) -> (usize, Vec<DispositionFailure>) {
    let mut disposed = 0;
    let mut failures = Vec::new();

    for &source in sources {
        match dispose(source, policy) {
            Ok(_) => disposed += 1,
            Err(error) => {
                log::warn!("Could not dispose of {}: {}", source.display(), error);
                failures.push(DispositionFailure {
                    path: source.to_path_buf(),
                    error,
                });
            }
        }
    }

    (disposed, failures)
}
