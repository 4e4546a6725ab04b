use crate::blurring::domain::contribution_strategy::ContributionStrategy;
use crate::blurring::domain::frame_sink::{FrameSink, NullFrameSink};
use crate::shared::error::BlurError;
use crate::shared::mask::Mask;
use crate::shared::raster::{Image, Sample};

/// Progress callback: `(samples_done, total_samples)`. Returning `false`
/// cancels the blur before the next sample is processed.
pub type ProgressFn = Box<dyn Fn(usize, usize) -> bool + Send + Sync>;

/// Mask-driven blur: scans the mask in row-major order and lets the
/// contribution strategy fold every non-zero sample into an accumulator
/// that starts as a copy of the source.
///
/// The scan is sequential because each iteration consumes the previous
/// accumulator. Parallelism lives inside the strategy.
pub struct BlurEngine<S: Sample> {
    strategy: Box<dyn ContributionStrategy<S>>,
    on_progress: Option<ProgressFn>,
}

impl<S: Sample> BlurEngine<S> {
    pub fn new(strategy: Box<dyn ContributionStrategy<S>>) -> Self {
        Self {
            strategy,
            on_progress: None,
        }
    }

    pub fn with_progress(mut self, on_progress: ProgressFn) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn apply_blur(&self, source: &Image<S>, mask: &Mask) -> Result<Image<S>, BlurError> {
        self.apply_blur_with_sink(source, mask, &mut NullFrameSink)
    }

    /// Like [`apply_blur`](Self::apply_blur), handing the accumulator to
    /// `sink` after every processed sample.
    pub fn apply_blur_with_sink(
        &self,
        source: &Image<S>,
        mask: &Mask,
        sink: &mut dyn FrameSink<S>,
    ) -> Result<Image<S>, BlurError> {
        if source.bounds() != mask.bounds() {
            return Err(BlurError::DimensionMismatch {
                source_bounds: source.bounds(),
                mask_bounds: mask.bounds(),
            });
        }

        let total = mask.active_count();
        log::debug!(
            "Blurring {} image with {} active mask samples ({} strategy)",
            source.bounds(),
            total,
            self.strategy.name()
        );

        let mut output = source.try_clone()?;
        for (i, sample) in mask.active_samples().enumerate() {
            log::trace!("Mask sample ({}, {}) = {}", sample.x, sample.y, sample.value);
            output = self.strategy.contribute(source, output, &sample)?;
            sink.emit(&sample, &output).map_err(BlurError::FrameSink)?;

            let processed = i + 1;
            if let Some(cb) = &self.on_progress {
                if !cb(processed, total) && processed < total {
                    log::debug!("Blur cancelled after {processed}/{total} samples");
                    return Err(BlurError::Cancelled { processed, total });
                }
            }
        }

        log::debug!("Blur complete");
        Ok(output)
    }
}
