use crate::blurring::domain::contribution_strategy::ContributionStrategy;
use crate::blurring::domain::weight_color::WeightColor;
use crate::shared::constants::HALF_WEIGHT;
use crate::shared::error::BlurError;
use crate::shared::mask::MaskSample;
use crate::shared::raster::{Image, Sample};

use super::channel_ops::ChannelOps;

/// Double-halving variant: both the tinted source and the accumulator are
/// halved before the translated add, and that sum is added back onto the
/// undamped accumulator.
pub struct HalvedScatterContribution {
    ops: ChannelOps,
}

impl HalvedScatterContribution {
    pub fn new(ops: ChannelOps) -> Self {
        Self { ops }
    }
}

impl<S: Sample> ContributionStrategy<S> for HalvedScatterContribution {
    fn contribute(
        &self,
        source: &Image<S>,
        accumulator: Image<S>,
        sample: &MaskSample,
    ) -> Result<Image<S>, BlurError> {
        let half = WeightColor::gray(HALF_WEIGHT);
        let tinted = self
            .ops
            .scale(&self.ops.scale(source, WeightColor::from_sample(sample, 1.0))?, half)?;
        let damped = self.ops.scale(&accumulator, half)?;
        let shifted = self.ops.scatter_add(&damped, &tinted, sample.x, sample.y)?;
        self.ops.scatter_add(&accumulator, &shifted, 0, 0)
    }

    fn name(&self) -> &'static str {
        "halved"
    }
}
