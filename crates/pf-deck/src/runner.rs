//! Simulator invocation.
//!
//! Each deck is run as `<executable> <deck path>` under a wall-clock limit.
//! A run that overstays is killed. Failures are collected, never raised: one
//! hung or crashing run must not stop the batch.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Why a single run did not complete.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunFailure {
    #[error("failed to start simulator: {message}")]
    Spawn { message: String },

    #[error("timed out after {timeout_ms} ms")]
    TimedOut { timeout_ms: u64 },

    #[error("exited with status {code:?}")]
    Exit { code: Option<i32> },

    #[error("failed waiting for simulator: {message}")]
    Wait { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedRun {
    pub deck: String,
    pub failure: RunFailure,
}

/// Outcome of a batch of runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub attempted: usize,
    pub completed: Vec<String>,
    pub failed: Vec<FailedRun>,
}

impl BatchReport {
    pub fn all_completed(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct SimulatorRunner {
    executable: PathBuf,
    timeout: Duration,
    poll_interval: Duration,
}

impl SimulatorRunner {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            timeout: Self::DEFAULT_TIMEOUT,
            poll_interval: Duration::from_millis(5),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run one deck to completion or timeout.
    pub fn run(&self, deck: &Path) -> Result<(), RunFailure> {
        let mut child = Command::new(&self.executable)
            .arg(deck)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| RunFailure::Spawn {
                message: e.to_string(),
            })?;

        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) if status.success() => return Ok(()),
                Ok(Some(status)) => {
                    return Err(RunFailure::Exit {
                        code: status.code(),
                    });
                }
                Ok(None) if Instant::now() >= deadline => {
                    if let Err(e) = child.kill() {
                        tracing::error!(
                            deck = %deck.display(),
                            error = %e,
                            "failed to kill simulator"
                        );
                    }
                    // Reap the killed child.
                    let _ = child.wait();
                    return Err(RunFailure::TimedOut {
                        timeout_ms: self.timeout.as_millis() as u64,
                    });
                }
                Ok(None) => thread::sleep(self.poll_interval),
                Err(e) => {
                    let _ = child.kill();
                    return Err(RunFailure::Wait {
                        message: e.to_string(),
                    });
                }
            }
        }
    }

    /// Run every deck in order.
    pub fn run_batch(&self, decks: &[PathBuf]) -> BatchReport {
        tracing::info!(
            decks = decks.len(),
            executable = %self.executable.display(),
            timeout_ms = self.timeout.as_millis() as u64,
            "running simulator batch"
        );

        let mut report = BatchReport {
            attempted: decks.len(),
            ..Default::default()
        };
        for deck in decks {
            let name = deck
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| deck.display().to_string());
            match self.run(deck) {
                Ok(()) => report.completed.push(name),
                Err(failure) => {
                    tracing::warn!(deck = %name, %failure, "simulator run failed");
                    report.failed.push(FailedRun {
                        deck: name,
                        failure,
                    });
                }
            }
        }

        tracing::info!(
            completed = report.completed.len(),
            failed = report.failed.len(),
            "simulator batch finished"
        );
        report
    }
}
