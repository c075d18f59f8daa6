//! Progress tracking, cancellation and resumption of interrupted runs.

use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Exit status of a run cancelled by the user (128 + SIGINT).
pub const CANCELLED_EXIT_CODE: u8 = 130;

const NO_UNIT: usize = usize::MAX;

/// Index of the unit to restart from after an interrupted run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResumeOffset(pub usize);

impl fmt::Display for ResumeOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared flag asking a running pipeline to stop.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Index of the unit the pipeline is currently working on.
///
/// Written by the pipeline thread, readable from any other thread (for
/// example an interrupt handler).
#[derive(Debug, Clone)]
pub struct ProgressCursor {
    index: Arc<AtomicUsize>,
}

impl Default for ProgressCursor {
    fn default() -> Self {
        Self {
            index: Arc::new(AtomicUsize::new(NO_UNIT)),
        }
    }
}

impl ProgressCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark unit `index` as in flight.
    pub fn set(&self, index: usize) {
        self.index.store(index, Ordering::Release);
    }

    /// The unit in flight, or `None` before the first unit starts.
    pub fn current(&self) -> Option<usize> {
        match self.index.load(Ordering::Acquire) {
            NO_UNIT => None,
            index => Some(index),
        }
    }
}

/// Owns the starting offset, progress cursor and cancellation token of a run.
#[derive(Debug, Clone, Default)]
pub struct ResumeController {
    start: usize,
    progress: ProgressCursor,
    token: CancellationToken,
}

impl ResumeController {
    /// Create a controller for a run starting at `resume_from` (or the beginning).
    pub fn new(resume_from: Option<usize>) -> Self {
        Self {
            start: resume_from.unwrap_or(0),
            progress: ProgressCursor::new(),
            token: CancellationToken::new(),
        }
    }

    pub fn start_index(&self) -> usize {
        self.start
    }

    pub fn progress(&self) -> &ProgressCursor {
        &self.progress
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Offset to resume from if the run stopped now: the unit in flight, or
    /// the starting offset when no unit has begun.
    pub fn resume_offset(&self) -> ResumeOffset {
        ResumeOffset(self.progress.current().unwrap_or(self.start))
    }

    /// Tell the user how to pick up an interrupted run.
    pub fn report_interrupted(
        &self,
        offset: ResumeOffset,
        out: &mut dyn Write,
    ) -> std::io::Result<()> {
        writeln!(out, "{}", resume_message(offset))
    }
}

/// Guidance printed when reading is interrupted at `offset`.
pub fn resume_message(offset: ResumeOffset) -> String {
    format!(
        "> 読み上げを中断しました。中断位置から再開するには、オプション`-n {offset}`をつけて再度実行してください。"
    )
}
