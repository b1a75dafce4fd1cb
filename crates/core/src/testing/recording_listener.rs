//! Listener that records every callback for test assertions.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::orchestrator::{ConversionListener, ProgressSnapshot, TaskError};

/// One recorded listener callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerEvent {
    Start {
        total: usize,
    },
    Done {
        input: PathBuf,
        output: PathBuf,
        progress: ProgressSnapshot,
    },
    Error {
        input: PathBuf,
        message: String,
        progress: ProgressSnapshot,
    },
}

/// Records callbacks in arrival order.
#[derive(Debug, Default)]
pub struct RecordingListener {
    events: Mutex<Vec<ListenerEvent>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: ListenerEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }

    /// All events in arrival order.
    pub fn events(&self) -> Vec<ListenerEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Totals passed to `on_start`.
    pub fn starts(&self) -> Vec<usize> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ListenerEvent::Start { total } => Some(total),
                _ => None,
            })
            .collect()
    }

    /// `(input, output)` pairs passed to `on_file_done`.
    pub fn completed(&self) -> Vec<(PathBuf, PathBuf)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ListenerEvent::Done { input, output, .. } => Some((input, output)),
                _ => None,
            })
            .collect()
    }

    /// `(input, error message)` pairs passed to `on_error`.
    pub fn errors(&self) -> Vec<(PathBuf, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ListenerEvent::Error { input, message, .. } => Some((input, message)),
                _ => None,
            })
            .collect()
    }

    /// Progress of every per-file callback, in arrival order.
    pub fn progress(&self) -> Vec<ProgressSnapshot> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ListenerEvent::Done { progress, .. } | ListenerEvent::Error { progress, .. } => {
                    Some(progress)
                }
                ListenerEvent::Start { .. } => None,
            })
            .collect()
    }

    /// The progress with the highest `done` count, if any file was reported.
    pub fn final_progress(&self) -> Option<ProgressSnapshot> {
        self.progress().into_iter().max_by_key(|p| p.done)
    }
}

impl ConversionListener for RecordingListener {
    fn on_start(&self, total: usize) {
        self.push(ListenerEvent::Start { total });
    }

    fn on_file_done(&self, input: &Path, output: &Path, done: usize, total: usize) {
        self.push(ListenerEvent::Done {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            progress: ProgressSnapshot::new(done, total),
        });
    }

    fn on_error(&self, input: &Path, cause: &TaskError, done: usize, total: usize) {
        self.push(ListenerEvent::Error {
            input: input.to_path_buf(),
            message: cause.to_string(),
            progress: ProgressSnapshot::new(done, total),
        });
    }
}
