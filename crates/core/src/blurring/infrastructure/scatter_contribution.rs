use crate::blurring::domain::contribution_strategy::ContributionStrategy;
use crate::blurring::domain::weight_color::WeightColor;
use crate::shared::error::BlurError;
use crate::shared::mask::MaskSample;
use crate::shared::raster::{Image, Sample};

use super::channel_ops::ChannelOps;

/// Scatters a weighted copy of the whole source, translated by the mask
/// sample's own coordinate, onto the accumulator.
///
/// Weight is the sample luminance times `weight_scale`.
pub struct ScatterContribution {
    ops: ChannelOps,
    weight_scale: f64,
}

impl ScatterContribution {
    pub fn new(ops: ChannelOps, weight_scale: f64) -> Self {
        Self { ops, weight_scale }
    }
}

impl<S: Sample> ContributionStrategy<S> for ScatterContribution {
    fn contribute(
        &self,
        source: &Image<S>,
        accumulator: Image<S>,
        sample: &MaskSample,
    ) -> Result<Image<S>, BlurError> {
        let weight = WeightColor::from_sample(sample, self.weight_scale);
        let tinted = self.ops.scale(source, weight)?;
        self.ops.scatter_add(&accumulator, &tinted, sample.x, sample.y)
    }

    fn name(&self) -> &'static str {
        "direct"
    }
}
