//! Pipeline error types

use thiserror::Error;

/// Errors surfaced by the render pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Pipeline has been disposed. Do not call render on disposed pipelines")]
    Disposed,
    #[error("Unknown camera id: {0:?}")]
    UnknownCamera(crate::scene::CameraId),
    #[error("GPU resource was already released: {0}")]
    ResourceReleased(String),
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
