//! Running a comparison on a background thread

use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use duke_diff_core::{CancelToken, ComparisonOptions, ComparisonResult, ProgressSink};

use crate::engine::DiffEngine;
use crate::error::ComparisonOutcome;

/// Handle to a comparison running on its own thread.
///
/// Dropping the handle detaches the thread; call [`cancel`](Self::cancel)
/// first to make it stop early.
#[derive(Debug)]
pub struct ComparisonJob {
    cancel: CancelToken,
    handle: JoinHandle<ComparisonOutcome<ComparisonResult>>,
}

impl ComparisonJob {
    /// A token sharing this job's cancellation flag
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Ask the job to stop at its next checkpoint
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the comparison to complete.
    ///
    /// A panic on the worker thread is resumed on the caller's thread.
    pub fn join(self) -> ComparisonOutcome<ComparisonResult> {
        match self.handle.join() {
            Ok(outcome) => outcome,
            Err(payload) => std::panic::resume_unwind(payload),
        }
    }
}

/// Start comparing `path_a` against `path_b` on a new thread.
///
/// Progress is reported from the worker thread, so the sink must be `Send`.
pub fn spawn_comparison<P>(
    path_a: impl Into<PathBuf>,
    path_b: impl Into<PathBuf>,
    options: ComparisonOptions,
    progress: P,
) -> ComparisonJob
where
    P: ProgressSink + Send + 'static,
{
    let path_a = path_a.into();
    let path_b = path_b.into();
    let cancel = CancelToken::new();
    let token = cancel.clone();

    let handle = thread::spawn(move || {
        log::debug!(
            "background comparison of {} and {}",
            path_a.display(),
            path_b.display()
        );
        DiffEngine::new(options).compare_files(&path_a, &path_b, &progress, &token)
    });

    ComparisonJob { cancel, handle }
}
