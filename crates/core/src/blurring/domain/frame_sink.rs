use crate::shared::error::CollaboratorError;
use crate::shared::mask::MaskSample;
use crate::shared::raster::{Image, Sample};

/// Receives the accumulator after every processed mask sample.
///
/// Diagnostics only; the blur result never depends on a sink.
pub trait FrameSink<S: Sample>: Send {
    fn emit(&mut self, sample: &MaskSample, frame: &Image<S>) -> Result<(), CollaboratorError>;
}

/// Sink that discards every frame.
pub struct NullFrameSink;

impl<S: Sample> FrameSink<S> for NullFrameSink {
    fn emit(&mut self, _sample: &MaskSample, _frame: &Image<S>) -> Result<(), CollaboratorError> {
        Ok(())
    }
}
