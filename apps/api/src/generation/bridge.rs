//! Generation Bridge — turns one `DocumentRequest` into one artifact by
//! delegating to an external worker.
//!
//! Flow: serialize request → acquire worker permit → open channel →
//!       write message + close input ‖ drain artifact ‖ drain diagnostics →
//!       wait for exit → `GenerationResult`.
//!
//! Exactly one worker invocation per request, no retry. The permit pool
//! bounds live workers; the timeout and artifact cap bound how long and how
//! much a single worker may hold.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bytes::Bytes;
use tokio::io::AsyncReadExt;
use tokio::sync::Semaphore;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::document::DocumentRequest;
use crate::worker::{ChannelError, WorkerChannel, WorkerExit, WorkerLauncher, WorkerStream};

const READ_CHUNK: usize = 8 * 1024;

#[derive(Debug, Clone)]
pub struct BridgeLimits {
    pub timeout: Duration,
    pub max_concurrent_workers: usize,
    pub max_artifact_bytes: usize,
    /// Diagnostic text beyond this is dropped (the stream is still drained).
    pub max_diagnostic_bytes: usize,
}

impl Default for BridgeLimits {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            max_concurrent_workers: 4,
            max_artifact_bytes: 25 * 1024 * 1024,
            max_diagnostic_bytes: 64 * 1024,
        }
    }
}

/// A finished document, ready to hand to the transport layer.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub bytes: Bytes,
    pub suggested_filename: String,
}

pub type GenerationResult = Result<Artifact, AppError>;

#[derive(Clone)]
pub struct GenerationBridge {
    launcher: Arc<dyn WorkerLauncher>,
    permits: Arc<Semaphore>,
    limits: BridgeLimits,
}

impl GenerationBridge {
    pub fn new(launcher: Arc<dyn WorkerLauncher>, limits: BridgeLimits) -> Self {
        Self {
            launcher,
            permits: Arc::new(Semaphore::new(limits.max_concurrent_workers.max(1))),
            limits,
        }
    }

    pub async fn generate(&self, request: &DocumentRequest) -> GenerationResult {
        let span = info_span!(
            "generate",
            request_id = %Uuid::new_v4(),
            doc_type = %request.archetype()
        );
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: &DocumentRequest) -> GenerationResult {
        let message = serde_json::to_vec(request).context("Failed to serialize document request")?;

        let _permit = self
            .permits
            .acquire()
            .await
            .context("Worker permit pool closed")?;

        let mut channel = self.launcher.open().await?;
        let output = channel.take_output()?;
        let diagnostics = channel.take_diagnostics()?;
        info!("Worker started, sending {} byte request", message.len());

        let mut diag_buf = Vec::new();
        let exchanged = tokio::time::timeout(
            self.limits.timeout,
            exchange(
                channel.as_mut(),
                &message,
                output,
                diagnostics,
                &mut diag_buf,
                &self.limits,
            ),
        )
        .await;

        let (exit, artifact) = match exchanged {
            Ok(Ok(done)) => done,
            Ok(Err(err)) => {
                terminate(channel.as_mut()).await;
                return Err(err);
            }
            Err(_) => {
                terminate(channel.as_mut()).await;
                return Err(AppError::WorkerTimedOut {
                    after: self.limits.timeout,
                    diagnostics: String::from_utf8_lossy(&diag_buf).into_owned(),
                });
            }
        };

        let diagnostics = String::from_utf8_lossy(&diag_buf).into_owned();
        if !exit.is_success() {
            return Err(AppError::WorkerFailed { exit, diagnostics });
        }
        if artifact.is_empty() {
            let diagnostics = if diagnostics.is_empty() {
                "worker exited successfully but produced no output".to_string()
            } else {
                diagnostics
            };
            return Err(AppError::WorkerFailed { exit, diagnostics });
        }

        if !diagnostics.is_empty() {
            debug!("Worker diagnostics: {}", diagnostics.trim_end());
        }
        info!("Worker finished, artifact is {} bytes", artifact.len());

        Ok(Artifact {
            bytes: Bytes::from(artifact),
            suggested_filename: request.suggested_filename(),
        })
    }
}

/// Feeds the message and drains both streams concurrently, so a worker that
/// writes before it finishes reading can never deadlock against us.
async fn exchange(
    channel: &mut dyn WorkerChannel,
    message: &[u8],
    output: WorkerStream,
    diagnostics: WorkerStream,
    diag_buf: &mut Vec<u8>,
    limits: &BridgeLimits,
) -> Result<(WorkerExit, Vec<u8>), AppError> {
    let feed = async {
        // A worker that exits without reading its input is judged by its exit status.
        if let Err(e) = channel.write_input(message).await {
            warn!("Failed to write request to worker: {e}");
        }
        if let Err(e) = channel.close_input().await {
            warn!("Failed to close worker input: {e}");
        }
        Ok::<(), AppError>(())
    };

    let ((), artifact, ()) = tokio::try_join!(
        feed,
        read_artifact(output, limits.max_artifact_bytes),
        drain_diagnostics(diagnostics, diag_buf, limits.max_diagnostic_bytes),
    )?;

    let exit = channel.wait().await?;
    Ok((exit, artifact))
}

async fn read_artifact(stream: WorkerStream, limit: usize) -> Result<Vec<u8>, AppError> {
    let mut buf = Vec::new();
    stream
        .take((limit as u64).saturating_add(1))
        .read_to_end(&mut buf)
        .await
        .map_err(ChannelError::from)?;
    if buf.len() > limit {
        return Err(AppError::ArtifactTooLarge { limit });
    }
    Ok(buf)
}

async fn drain_diagnostics(
    mut stream: WorkerStream,
    buf: &mut Vec<u8>,
    cap: usize,
) -> Result<(), AppError> {
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let n = stream.read(&mut chunk).await.map_err(ChannelError::from)?;
        if n == 0 {
            return Ok(());
        }
        let room = cap.saturating_sub(buf.len());
        buf.extend_from_slice(&chunk[..n.min(room)]);
    }
}

async fn terminate(channel: &mut dyn WorkerChannel) {
    if let Err(e) = channel.kill().await {
        warn!("Failed to kill worker: {e}");
    }
}
