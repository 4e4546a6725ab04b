use crate::shared::error::BlurError;
use crate::shared::mask::MaskSample;
use crate::shared::raster::{Image, Sample};

/// Domain interface for folding one mask sample into the blur accumulator.
///
/// The accumulator is taken by value and the updated image returned, so
/// each iteration owns the only copy of the running result.
pub trait ContributionStrategy<S: Sample>: Send + Sync {
    fn contribute(
        &self,
        source: &Image<S>,
        accumulator: Image<S>,
        sample: &MaskSample,
    ) -> Result<Image<S>, BlurError>;

    /// Short name used in log output.
    fn name(&self) -> &'static str;
}
