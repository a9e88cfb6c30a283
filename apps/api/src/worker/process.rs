use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};
use tracing::debug;

use crate::worker::channel::{
    ChannelError, WorkerChannel, WorkerExit, WorkerLauncher, WorkerStream,
};

/// Spawns a fresh OS process per request, e.g. `python server.py`.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl ProcessLauncher {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            working_dir: None,
        }
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl WorkerLauncher for ProcessLauncher {
    async fn open(&self) -> Result<Box<dyn WorkerChannel>, ChannelError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // A dropped request must not leave an orphaned worker behind.
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|source| ChannelError::Spawn {
            program: self.program.clone(),
            source,
        })?;
        debug!(pid = ?child.id(), "Worker started: {}", self.command_line());

        let stdin = child.stdin.take();
        Ok(Box::new(ProcessChannel { child, stdin }))
    }
}

pub struct ProcessChannel {
    child: Child,
    stdin: Option<ChildStdin>,
}

#[async_trait]
impl WorkerChannel for ProcessChannel {
    fn take_output(&mut self) -> Result<WorkerStream, ChannelError> {
        self.child
            .stdout
            .take()
            .map(|stdout| Box::new(stdout) as WorkerStream)
            .ok_or(ChannelError::StreamUnavailable("output"))
    }

    fn take_diagnostics(&mut self) -> Result<WorkerStream, ChannelError> {
        self.child
            .stderr
            .take()
            .map(|stderr| Box::new(stderr) as WorkerStream)
            .ok_or(ChannelError::StreamUnavailable("diagnostic"))
    }

    async fn write_input(&mut self, bytes: &[u8]) -> Result<(), ChannelError> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or(ChannelError::StreamUnavailable("input"))?;
        stdin.write_all(bytes).await?;
        Ok(())
    }

    async fn close_input(&mut self) -> Result<(), ChannelError> {
        // Dropping the handle closes the pipe, which is the worker's EOF.
        if let Some(mut stdin) = self.stdin.take() {
            stdin.shutdown().await?;
        }
        Ok(())
    }

    async fn wait(&mut self) -> Result<WorkerExit, ChannelError> {
        self.stdin.take();
        let status = self.child.wait().await?;
        Ok(status.into())
    }

    async fn kill(&mut self) -> Result<(), ChannelError> {
        self.stdin.take();
        self.child.kill().await?;
        Ok(())
    }
}
