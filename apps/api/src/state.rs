use crate::generation::bridge::GenerationBridge;

/// Shared application state injected into all route handlers via Axum extractors.
/// Nothing here is per-request: each request still gets its own worker.
#[derive(Clone)]
pub struct AppState {
    /// Owns the worker launcher and the permit pool bounding live workers.
    pub bridge: GenerationBridge,
}
