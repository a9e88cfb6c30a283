//! Worker Channel — a byte pipe to one out-of-process generation worker.
//!
//! Lifecycle: `open()` → take the two read halves → `write_input()` →
//! `close_input()` → drain both streams → `wait()`.
//! The channel never inspects the bytes flowing through it.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncRead;

/// A readable half exposed by a channel (artifact or diagnostics).
pub type WorkerStream = Box<dyn AsyncRead + Send + Unpin>;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("failed to start worker '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("worker {0} stream was already taken or never piped")]
    StreamUnavailable(&'static str),

    #[error("worker I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// How a worker finished. `code` is `None` when the process was ended by a
/// signal (including our own kill on timeout).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerExit {
    pub code: Option<i32>,
}

impl WorkerExit {
    pub fn success() -> Self {
        Self { code: Some(0) }
    }

    pub fn with_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

impl fmt::Display for WorkerExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {code}"),
            None => f.write_str("terminated by signal"),
        }
    }
}

impl From<std::process::ExitStatus> for WorkerExit {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// Starts workers. Carried in `AppState` as `Arc<dyn WorkerLauncher>` so the
/// bridge can be driven by in-memory stand-ins in tests.
#[async_trait]
pub trait WorkerLauncher: Send + Sync {
    async fn open(&self) -> Result<Box<dyn WorkerChannel>, ChannelError>;
}

#[async_trait]
pub trait WorkerChannel: Send {
    /// Artifact bytes written by the worker. Can be taken once.
    fn take_output(&mut self) -> Result<WorkerStream, ChannelError>;

    /// Human-readable diagnostic text. Can be taken once.
    fn take_diagnostics(&mut self) -> Result<WorkerStream, ChannelError>;

    async fn write_input(&mut self, bytes: &[u8]) -> Result<(), ChannelError>;

    /// Signals "payload complete"; the worker begins processing.
    async fn close_input(&mut self) -> Result<(), ChannelError>;

    /// Completion signal carrying the exit status.
    async fn wait(&mut self) -> Result<WorkerExit, ChannelError>;

    /// Forced termination (timeout, oversized artifact).
    async fn kill(&mut self) -> Result<(), ChannelError>;
}
