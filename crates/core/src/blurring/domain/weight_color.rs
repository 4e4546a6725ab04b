use crate::blurring::domain::pixel_math::RgbaF64;
use crate::shared::mask::MaskSample;

/// Opaque gray used to tint a whole image uniformly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightColor(RgbaF64);

impl WeightColor {
    /// Gray of the given intensity, clamped to `[0, 1]`, with full alpha.
    pub fn gray(intensity: f64) -> Self {
        let l = intensity.clamp(0.0, 1.0);
        Self(RgbaF64::new(l, l, l, 1.0))
    }

    /// Weight derived from a mask sample's luminance times a fixed scale.
    pub fn from_sample(sample: &MaskSample, scale: f64) -> Self {
        Self::gray(sample.luminance() * scale)
    }

    pub fn color(&self) -> RgbaF64 {
        self.0
    }
}
