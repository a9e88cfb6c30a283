//! In-memory worker stand-ins for exercising the bridge without processes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncWriteExt, DuplexStream};
use tokio::task::JoinHandle;

use crate::worker::channel::{
    ChannelError, WorkerChannel, WorkerExit, WorkerLauncher, WorkerStream,
};

const PIPE_CAPACITY: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct ScriptedOutcome {
    pub output: Vec<u8>,
    pub diagnostics: Vec<u8>,
    pub exit: WorkerExit,
}

impl ScriptedOutcome {
    pub fn success(output: impl Into<Vec<u8>>) -> Self {
        Self {
            output: output.into(),
            diagnostics: Vec::new(),
            exit: WorkerExit::success(),
        }
    }

    pub fn failure(code: i32, diagnostics: &str) -> Self {
        Self {
            output: Vec::new(),
            diagnostics: diagnostics.as_bytes().to_vec(),
            exit: WorkerExit::with_code(code),
        }
    }

    pub fn diagnostics(mut self, text: &str) -> Self {
        self.diagnostics = text.as_bytes().to_vec();
        self
    }
}

type Respond = dyn Fn(&[u8]) -> ScriptedOutcome + Send + Sync;

/// Produces its outcome from the received input once input is closed.
#[derive(Clone)]
pub struct ScriptedLauncher {
    respond: Arc<Respond>,
    delay: Duration,
    opened: Arc<AtomicUsize>,
}

impl ScriptedLauncher {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&[u8]) -> ScriptedOutcome + Send + Sync + 'static,
    {
        Self {
            respond: Arc::new(respond),
            delay: Duration::ZERO,
            opened: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn fixed(outcome: ScriptedOutcome) -> Self {
        Self::new(move |_| outcome.clone())
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of channels opened so far.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WorkerLauncher for ScriptedLauncher {
    async fn open(&self) -> Result<Box<dyn WorkerChannel>, ChannelError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let (out_tx, out_rx) = tokio::io::duplex(PIPE_CAPACITY);
        let (diag_tx, diag_rx) = tokio::io::duplex(PIPE_CAPACITY);
        Ok(Box::new(ScriptedChannel {
            respond: Arc::clone(&self.respond),
            delay: self.delay,
            input: Vec::new(),
            writers: Some((out_tx, diag_tx)),
            output: Some(out_rx),
            diagnostics: Some(diag_rx),
            run: None,
        }))
    }
}

struct ScriptedChannel {
    respond: Arc<Respond>,
    delay: Duration,
    input: Vec<u8>,
    writers: Option<(DuplexStream, DuplexStream)>,
    output: Option<DuplexStream>,
    diagnostics: Option<DuplexStream>,
    run: Option<JoinHandle<WorkerExit>>,
}

#[async_trait]
impl WorkerChannel for ScriptedChannel {
    fn take_output(&mut self) -> Result<WorkerStream, ChannelError> {
        self.output
            .take()
            .map(|rx| Box::new(rx) as WorkerStream)
            .ok_or(ChannelError::StreamUnavailable("output"))
    }

    fn take_diagnostics(&mut self) -> Result<WorkerStream, ChannelError> {
        self.diagnostics
            .take()
            .map(|rx| Box::new(rx) as WorkerStream)
            .ok_or(ChannelError::StreamUnavailable("diagnostic"))
    }

    async fn write_input(&mut self, bytes: &[u8]) -> Result<(), ChannelError> {
        self.input.extend_from_slice(bytes);
        Ok(())
    }

    async fn close_input(&mut self) -> Result<(), ChannelError> {
        let Some((mut out_tx, mut diag_tx)) = self.writers.take() else {
            return Ok(());
        };
        let outcome = (self.respond)(&self.input);
        let delay = self.delay;

        self.run = Some(tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            // A reader that gave up (oversized artifact) makes these fail.
            let _ = diag_tx.write_all(&outcome.diagnostics).await;
            drop(diag_tx);
            let _ = out_tx.write_all(&outcome.output).await;
            outcome.exit
        }));
        Ok(())
    }

    async fn wait(&mut self) -> Result<WorkerExit, ChannelError> {
        match self.run.take() {
            Some(handle) => Ok(handle.await.unwrap_or(WorkerExit { code: None })),
            None => Ok(WorkerExit { code: None }),
        }
    }

    async fn kill(&mut self) -> Result<(), ChannelError> {
        self.writers.take();
        if let Some(handle) = &self.run {
            handle.abort();
        }
        Ok(())
    }
}

/// A launcher whose `open` always fails, standing in for a missing binary.
pub struct BrokenLauncher;

#[async_trait]
impl WorkerLauncher for BrokenLauncher {
    async fn open(&self) -> Result<Box<dyn WorkerChannel>, ChannelError> {
        Err(ChannelError::Spawn {
            program: "missing-worker".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        })
    }
}
