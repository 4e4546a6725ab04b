use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::blurring::domain::blur_engine::ProgressFn;
use crate::blurring::domain::frame_sink::{FrameSink, NullFrameSink};
use crate::blurring::infrastructure::engine_factory::create_engine;
use crate::shared::error::CollaboratorError;
use crate::shared::mask::{Mask, MaskSample};
use crate::shared::raster::{Image, Sample, SourceImage};
use crate::storage::domain::image_reader::ImageReader;
use crate::storage::domain::image_writer::ImageWriter;
use crate::storage::infrastructure::png_frame_sink::PngFrameSink;

use super::blur_settings::BlurSettings;
use super::pipeline_logger::PipelineLogger;

/// Single-image bokeh pipeline: read source → read mask → blur → write.
///
/// The progress callback is consumed by the first `execute` call; later
/// runs only honor the cancellation flag.
pub struct BokehImageUseCase {
    reader: Box<dyn ImageReader>,
    writer: Box<dyn ImageWriter>,
    settings: BlurSettings,
    logger: Box<dyn PipelineLogger>,
    on_progress: Option<ProgressFn>,
    cancelled: Arc<AtomicBool>,
}

impl BokehImageUseCase {
    pub fn new(
        reader: Box<dyn ImageReader>,
        writer: Box<dyn ImageWriter>,
        settings: BlurSettings,
        logger: Box<dyn PipelineLogger>,
        on_progress: Option<ProgressFn>,
        cancelled: Option<Arc<AtomicBool>>,
    ) -> Self {
        Self {
            reader,
            writer,
            settings,
            logger,
            on_progress,
            cancelled: cancelled.unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
        }
    }

    pub fn execute(
        &mut self,
        source_path: &Path,
        mask_path: &Path,
        output_path: &Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.settings.validate()?;

        let t0 = Instant::now();
        let source = self.reader.read_source(source_path)?;
        let mask = self.reader.read_mask(mask_path)?;
        self.logger.timing("read", elapsed_ms(t0));
        self.logger.metric("active_samples", mask.active_count() as f64);
        self.logger.info(&format!(
            "Read {} source ({}-bit) and mask with {} active samples",
            source.bounds(),
            source.bits_per_channel(),
            mask.active_count()
        ));

        let t0 = Instant::now();
        let blurred = match source {
            SourceImage::Rgba8(img) => SourceImage::Rgba8(self.blur_image(&img, &mask)?),
            SourceImage::Rgba16(img) => SourceImage::Rgba16(self.blur_image(&img, &mask)?),
        };
        self.logger.timing("blur", elapsed_ms(t0));

        let t0 = Instant::now();
        self.writer.write(output_path, &blurred)?;
        self.logger.timing("write", elapsed_ms(t0));
        self.logger
            .info(&format!("Wrote {}", output_path.display()));

        self.logger.summary();
        Ok(())
    }

    fn blur_image<S: Sample>(
        &mut self,
        image: &Image<S>,
        mask: &Mask,
    ) -> Result<Image<S>, Box<dyn std::error::Error>> {
        let engine = create_engine::<S>(&self.settings.engine_options())?
            .with_progress(self.progress_fn());
        let total = mask.active_count();

        match self.settings.debug_frames.clone() {
            Some(dir) => {
                let mut frames = PngFrameSink::<S>::new(&dir).map_err(boxed)?;
                let out = {
                    let mut sink = ProgressSink {
                        inner: &mut frames,
                        logger: self.logger.as_mut(),
                        processed: 0,
                        total,
                    };
                    engine.apply_blur_with_sink(image, mask, &mut sink)?
                };
                let written = frames.finish().map_err(boxed)?;
                self.logger.info(&format!(
                    "Wrote {written} debug frames to {}",
                    dir.display()
                ));
                Ok(out)
            }
            None => {
                let mut null = NullFrameSink;
                let mut sink = ProgressSink {
                    inner: &mut null,
                    logger: self.logger.as_mut(),
                    processed: 0,
                    total,
                };
                Ok(engine.apply_blur_with_sink(image, mask, &mut sink)?)
            }
        }
    }

    /// Merges the caller's progress callback with the cancellation flag.
    fn progress_fn(&mut self) -> ProgressFn {
        let cancelled = self.cancelled.clone();
        let user = self.on_progress.take();
        Box::new(move |current, total| {
            if cancelled.load(Ordering::Relaxed) {
                return false;
            }
            user.as_ref().map_or(true, |cb| cb(current, total))
        })
    }
}

/// Reports per-sample progress to the pipeline logger before forwarding
/// the frame to the wrapped sink.
struct ProgressSink<'a, S: Sample> {
    inner: &'a mut dyn FrameSink<S>,
    logger: &'a mut dyn PipelineLogger,
    processed: usize,
    total: usize,
}

impl<S: Sample> FrameSink<S> for ProgressSink<'_, S> {
    fn emit(&mut self, sample: &MaskSample, frame: &Image<S>) -> Result<(), CollaboratorError> {
        self.processed += 1;
        self.logger.progress(self.processed, self.total);
        self.inner.emit(sample, frame)
    }
}

fn boxed(e: CollaboratorError) -> Box<dyn std::error::Error> {
    e
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blurring::domain::boundary_policy::BoundaryPolicy;
    use crate::shared::error::BlurError;
    use std::path::PathBuf;
    use std::sync::Mutex;

    // --- Stubs ---

    struct StubReader {
        source: SourceImage,
        mask: Mask,
    }

    impl ImageReader for StubReader {
        fn read_source(&self, _path: &Path) -> Result<SourceImage, Box<dyn std::error::Error>> {
            Ok(self.source.clone())
        }

        fn read_mask(&self, _path: &Path) -> Result<Mask, Box<dyn std::error::Error>> {
            Ok(self.mask.clone())
        }
    }

    struct StubWriter {
        written: Arc<Mutex<Vec<(PathBuf, SourceImage)>>>,
    }

    impl StubWriter {
        fn new() -> Self {
            Self {
                written: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl ImageWriter for StubWriter {
        fn write(&self, path: &Path, image: &SourceImage) -> Result<(), Box<dyn std::error::Error>> {
            self.written
                .lock()
                .unwrap()
                .push((path.to_path_buf(), image.clone()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct Recorded {
        progress: Vec<(usize, usize)>,
        stages: Vec<String>,
        metrics: Vec<(String, f64)>,
        summaries: usize,
    }

    struct RecordingLogger {
        recorded: Arc<Mutex<Recorded>>,
    }

    impl PipelineLogger for RecordingLogger {
        fn progress(&mut self, current: usize, total: usize) {
            self.recorded.lock().unwrap().progress.push((current, total));
        }

        fn timing(&mut self, stage: &str, _duration_ms: f64) {
            self.recorded.lock().unwrap().stages.push(stage.to_string());
        }

        fn metric(&mut self, name: &str, value: f64) {
            self.recorded
                .lock()
                .unwrap()
                .metrics
                .push((name.to_string(), value));
        }

        fn info(&mut self, _message: &str) {}

        fn summary(&self) {
            self.recorded.lock().unwrap().summaries += 1;
        }
    }

    // --- Helpers ---

    /// Opaque black 3x3 with a red center pixel.
    fn red_dot_source() -> SourceImage {
        let mut img = Image::<u8>::try_filled(3, 3, [0, 0, 0, 255]).unwrap();
        img.put_pixel(1, 1, [255, 0, 0, 255]);
        SourceImage::Rgba8(img)
    }

    fn mask_with(w: u32, h: u32, samples: &[(u32, u32)]) -> Mask {
        let mut mask = Mask::empty(w, h);
        for &(x, y) in samples {
            mask.set(x, y, u16::MAX);
        }
        mask
    }

    fn settings() -> BlurSettings {
        BlurSettings {
            workers: Some(1),
            ..BlurSettings::default()
        }
    }

    struct Harness {
        use_case: BokehImageUseCase,
        written: Arc<Mutex<Vec<(PathBuf, SourceImage)>>>,
        recorded: Arc<Mutex<Recorded>>,
    }

    fn harness(
        source: SourceImage,
        mask: Mask,
        settings: BlurSettings,
        on_progress: Option<ProgressFn>,
        cancelled: Option<Arc<AtomicBool>>,
    ) -> Harness {
        let writer = StubWriter::new();
        let written = writer.written.clone();
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let use_case = BokehImageUseCase::new(
            Box::new(StubReader { source, mask }),
            Box::new(writer),
            settings,
            Box::new(RecordingLogger {
                recorded: recorded.clone(),
            }),
            on_progress,
            cancelled,
        );
        Harness {
            use_case,
            written,
            recorded,
        }
    }

    fn run(h: &mut Harness) -> Result<(), Box<dyn std::error::Error>> {
        h.use_case.execute(
            Path::new("in.png"),
            Path::new("mask.png"),
            Path::new("out.png"),
        )
    }

    fn written_rgba8(h: &Harness) -> Image<u8> {
        match &h.written.lock().unwrap()[0].1 {
            SourceImage::Rgba8(img) => img.clone(),
            other => panic!("expected 8-bit output, got {other:?}"),
        }
    }

    // --- Tests ---

    #[test]
    fn test_zero_mask_writes_source_unchanged() {
        let mut h = harness(red_dot_source(), Mask::empty(3, 3), settings(), None, None);
        run(&mut h).unwrap();

        let written = h.written.lock().unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].0, PathBuf::from("out.png"));
        assert_eq!(written[0].1, red_dot_source());
    }

    #[test]
    fn test_blurs_and_writes_result() {
        let mut h = harness(
            red_dot_source(),
            mask_with(3, 3, &[(1, 0)]),
            settings(),
            None,
            None,
        );
        run(&mut h).unwrap();

        let out = written_rgba8(&h);
        // Destination (0, 1) reads the red pixel at (0 + 1, 1 + 0).
        assert_eq!(out.pixel(0, 1), [255, 0, 0, 255]);
        assert_eq!(out.pixel(1, 1), [255, 0, 0, 255]);
    }

    #[test]
    fn test_dimension_mismatch_writes_nothing() {
        let mut h = harness(red_dot_source(), mask_with(3, 2, &[(0, 0)]), settings(), None, None);
        let err = run(&mut h).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<BlurError>(),
            Some(BlurError::DimensionMismatch { .. })
        ));
        assert!(h.written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let bad = BlurSettings {
            weight_scale: 2.0,
            ..settings()
        };
        let mut h = harness(red_dot_source(), Mask::empty(3, 3), bad, None, None);
        assert!(run(&mut h).is_err());
        assert!(h.written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_records_stage_timings_and_metrics() {
        let mut h = harness(
            red_dot_source(),
            mask_with(3, 3, &[(0, 0), (2, 2)]),
            settings(),
            None,
            None,
        );
        run(&mut h).unwrap();

        let recorded = h.recorded.lock().unwrap();
        assert_eq!(recorded.stages, vec!["read", "blur", "write"]);
        assert_eq!(recorded.metrics, vec![("active_samples".to_string(), 2.0)]);
        assert_eq!(recorded.progress, vec![(1, 2), (2, 2)]);
        assert_eq!(recorded.summaries, 1);
    }

    #[test]
    fn test_cancel_via_on_progress() {
        let mut h = harness(
            red_dot_source(),
            mask_with(3, 3, &[(0, 0), (1, 0), (2, 0)]),
            settings(),
            Some(Box::new(|current, _total| current < 2)),
            None,
        );
        let err = run(&mut h).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<BlurError>(),
            Some(BlurError::Cancelled { processed: 2, total: 3 })
        ));
        assert!(h.written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_cancellation_via_atomic_bool() {
        let cancelled = Arc::new(AtomicBool::new(true));
        let mut h = harness(
            red_dot_source(),
            mask_with(3, 3, &[(0, 0), (1, 0)]),
            settings(),
            None,
            Some(cancelled),
        );
        let err = run(&mut h).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<BlurError>(),
            Some(BlurError::Cancelled { processed: 1, total: 2 })
        ));
    }

    #[test]
    fn test_sixteen_bit_source_stays_sixteen_bit() {
        let img = Image::<u16>::try_filled(2, 2, [1000, 2000, 3000, 65535]).unwrap();
        let mut h = harness(
            SourceImage::Rgba16(img),
            mask_with(2, 2, &[(1, 1)]),
            settings(),
            None,
            None,
        );
        run(&mut h).unwrap();

        let written = h.written.lock().unwrap();
        assert_eq!(written[0].1.bits_per_channel(), 16);
    }

    #[test]
    fn test_debug_frames_written_per_sample() {
        let dir = tempfile::tempdir().unwrap();
        let frames_dir = dir.path().join("frames");
        let debug = BlurSettings {
            boundary: BoundaryPolicy::Clip,
            debug_frames: Some(frames_dir.clone()),
            ..settings()
        };
        let mut h = harness(
            red_dot_source(),
            mask_with(3, 3, &[(1, 0), (0, 2)]),
            debug,
            None,
            None,
        );
        run(&mut h).unwrap();

        assert!(frames_dir.join("sample-1-0.png").exists());
        assert!(frames_dir.join("sample-0-2.png").exists());
        assert_eq!(std::fs::read_dir(&frames_dir).unwrap().count(), 2);
    }
}
