//! Worker Channel: transport between the generation bridge and the external
//! document worker. The bridge only ever talks to `WorkerLauncher`.

pub mod channel;
pub mod process;
#[cfg(test)]
pub mod scripted;

pub use channel::{ChannelError, WorkerChannel, WorkerExit, WorkerLauncher, WorkerStream};
pub use process::ProcessLauncher;
