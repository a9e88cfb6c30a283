//! Generation Bridge: HTTP boundary → worker channel → artifact or structured error.
//! All worker invocations go through `bridge::GenerationBridge`; handlers never
//! touch a channel directly.

pub mod bridge;
pub mod handlers;
