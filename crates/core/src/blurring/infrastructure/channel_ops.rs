use std::sync::Arc;

use crate::blurring::domain::boundary_policy::BoundaryPolicy;
use crate::blurring::domain::pixel_math::{self, RgbaF64};
use crate::blurring::domain::weight_color::WeightColor;
use crate::shared::error::BlurError;
use crate::shared::raster::{Image, Sample, CHANNELS};

use super::row_parallelizer::RowParallelizer;

/// Whole-image color operations. Inputs are never mutated; every call
/// returns a freshly allocated image with the same bounds.
pub struct ChannelOps {
    parallelizer: Arc<RowParallelizer>,
    boundary: BoundaryPolicy,
}

impl ChannelOps {
    pub fn new(parallelizer: Arc<RowParallelizer>, boundary: BoundaryPolicy) -> Self {
        Self {
            parallelizer,
            boundary,
        }
    }

    pub fn boundary(&self) -> BoundaryPolicy {
        self.boundary
    }

    /// Multiplies every pixel by `weight`.
    pub fn scale<S: Sample>(
        &self,
        image: &Image<S>,
        weight: WeightColor,
    ) -> Result<Image<S>, BlurError> {
        let mut out = Image::try_zeroed(image.bounds())?;
        let row_len = image.row_len();
        let src = image.data();
        let w = weight.color();

        self.parallelizer
            .for_each_row(out.data_mut(), row_len, |y, row| {
                let src_row = &src[y * row_len..(y + 1) * row_len];
                for (dst, px) in row
                    .chunks_exact_mut(CHANNELS)
                    .zip(src_row.chunks_exact(CHANNELS))
                {
                    pixel_math::multiply(RgbaF64::from_stored(px), w).store(dst);
                }
            });

        Ok(out)
    }

    /// Adds `foreground`, shifted by `(dx, dy)`, onto `background`.
    ///
    /// Destination `(x, y)` reads foreground `(x + dx, y + dy)`, resolved
    /// through the configured boundary policy.
    pub fn scatter_add<S: Sample>(
        &self,
        background: &Image<S>,
        foreground: &Image<S>,
        dx: u32,
        dy: u32,
    ) -> Result<Image<S>, BlurError> {
        debug_assert_eq!(background.bounds(), foreground.bounds());
        let mut out = Image::try_zeroed(background.bounds())?;
        let width = background.width();
        let height = background.height();
        let row_len = background.row_len();
        let bg = background.data();
        let fg = foreground.data();
        let boundary = self.boundary;

        self.parallelizer
            .for_each_row(out.data_mut(), row_len, |y, row| {
                let bg_row = &bg[y * row_len..(y + 1) * row_len];
                let fg_y = boundary.resolve(y as u32, dy, height);
                for (x, (dst, bg_px)) in row
                    .chunks_exact_mut(CHANNELS)
                    .zip(bg_row.chunks_exact(CHANNELS))
                    .enumerate()
                {
                    let fg_x = boundary.resolve(x as u32, dx, width);
                    match (fg_x, fg_y) {
                        (Some(fx), Some(fy)) => {
                            let i = (fy as usize * width as usize + fx as usize) * CHANNELS;
                            let sum = pixel_math::add(
                                RgbaF64::from_stored(bg_px),
                                RgbaF64::from_stored(&fg[i..i + CHANNELS]),
                            );
                            sum.store(dst);
                        }
                        _ => dst.copy_from_slice(bg_px),
                    }
                }
            });

        Ok(out)
    }
}
