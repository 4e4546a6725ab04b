use thiserror::Error;

use crate::shared::raster::Bounds;

/// Boxed error reported by an injected collaborator (e.g. a frame sink).
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum BlurError {
    #[error("source image is {source_bounds} but mask is {mask_bounds}")]
    DimensionMismatch {
        source_bounds: Bounds,
        mask_bounds: Bounds,
    },
    #[error("failed to allocate {bytes} bytes for an image buffer")]
    AllocationFailure { bytes: usize },
    #[error("buffer holds {actual} samples but its dimensions need {expected}")]
    BufferLength { expected: usize, actual: usize },
    #[error("unsupported color model: {0}")]
    UnsupportedColorModel(String),
    #[error("blur cancelled after {processed} of {total} mask samples")]
    Cancelled { processed: usize, total: usize },
    #[error("frame sink failed: {0}")]
    FrameSink(#[source] CollaboratorError),
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
