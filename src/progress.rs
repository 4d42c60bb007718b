//! Progress snapshots for a parse call.
//!
//! Observers are optional and fire-and-forget: a snapshot is handed over and
//! the parse moves on. A panicking observer is caught and silenced for the
//! rest of the call; the channel reporter drops snapshots instead of
//! blocking when its consumer falls behind.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStage {
    Reading,
    Directory,
    Scanning,
    Extracting,
    FullScan,
    Deduplicating,
    Complete,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseProgress {
    pub stage: ParseStage,
    /// 0-100, never decreases within one parse call.
    pub percent: u8,
    pub total_chunks: usize,
    pub processed_chunks: usize,
    pub players_found: usize,
    pub detail: String,
}

/// Receives progress snapshots during a parse.
pub trait ProgressReporter: Send + Sync {
    fn notify(&self, progress: &ParseProgress);
}

impl<F> ProgressReporter for F
where
    F: Fn(&ParseProgress) + Send + Sync,
{
    fn notify(&self, progress: &ParseProgress) {
        self(progress)
    }
}

/// Logs each snapshot at info level.
pub struct LogReporter;

impl ProgressReporter for LogReporter {
    fn notify(&self, progress: &ParseProgress) {
        info!(
            "[{:>3}%] {:?} chunks={}/{} players={} {}",
            progress.percent,
            progress.stage,
            progress.processed_chunks,
            progress.total_chunks,
            progress.players_found,
            progress.detail
        );
    }
}

/// Forwards snapshots over a bounded channel without ever blocking.
pub struct ChannelReporter {
    tx: Sender<ParseProgress>,
}

impl ProgressReporter for ChannelReporter {
    fn notify(&self, progress: &ParseProgress) {
        if let Err(TrySendError::Full(_)) = self.tx.try_send(progress.clone()) {
            debug!("progress channel full, snapshot dropped");
        }
    }
}

pub fn channel_reporter(capacity: usize) -> (ChannelReporter, Receiver<ParseProgress>) {
    let (tx, rx) = bounded(capacity.max(1));
    (ChannelReporter { tx }, rx)
}

/// Spawns a thread that logs every snapshot from `rx` until the sending
/// side is dropped.
pub fn spawn_log_printer(rx: Receiver<ParseProgress>) -> JoinHandle<()> {
    thread::spawn(move || {
        for snapshot in rx {
            LogReporter.notify(&snapshot);
        }
    })
}

/// Joins a printer thread, logging a panic instead of discarding it.
/// Returns false when the thread panicked.
pub fn join_printer(handle: JoinHandle<()>) -> bool {
    match handle.join() {
        Ok(()) => true,
        Err(_) => {
            warn!("progress printer thread panicked; some snapshots were not logged");
            false
        }
    }
}

/// Per-call progress state. Owns the monotonic percent and shields the parse
/// from observer failures.
pub(crate) struct ProgressTracker<'a> {
    observer: Option<&'a dyn ProgressReporter>,
    observer_failed: bool,
    percent: u8,
    pub total_chunks: usize,
    pub processed_chunks: usize,
    pub players_found: usize,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(observer: Option<&'a dyn ProgressReporter>) -> Self {
        Self {
            observer,
            observer_failed: false,
            percent: 0,
            total_chunks: 0,
            processed_chunks: 0,
            players_found: 0,
        }
    }

    pub fn emit(&mut self, stage: ParseStage, percent: u8, detail: impl Into<String>) {
        self.percent = self.percent.max(percent.min(100));
        let Some(observer) = self.observer else {
            return;
        };
        if self.observer_failed {
            return;
        }
        let snapshot = ParseProgress {
            stage,
            percent: self.percent,
            total_chunks: self.total_chunks,
            processed_chunks: self.processed_chunks,
            players_found: self.players_found,
            detail: detail.into(),
        };
        if catch_unwind(AssertUnwindSafe(|| observer.notify(&snapshot))).is_err() {
            warn!("progress observer panicked; further snapshots suppressed");
            self.observer_failed = true;
        }
    }

    /// Percent for extraction progress, spread across `start..=end`.
    pub fn extraction_percent(&self, start: u8, end: u8) -> u8 {
        if self.total_chunks == 0 {
            return end;
        }
        let span = (end - start) as usize;
        let done = self.processed_chunks.min(self.total_chunks);
        start + (span * done / self.total_chunks) as u8
    }
}
