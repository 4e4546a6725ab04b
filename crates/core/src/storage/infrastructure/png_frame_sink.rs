use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use crossbeam_channel::Sender;

use crate::blurring::domain::frame_sink::FrameSink;
use crate::shared::constants::DEBUG_FRAME_QUEUE_CAPACITY;
use crate::shared::error::CollaboratorError;
use crate::shared::mask::MaskSample;
use crate::shared::raster::{Image, Sample};

/// Writes `sample-{x}-{y}.png` into a directory for every processed mask
/// sample.
///
/// Encoding runs on a dedicated writer thread fed through a bounded
/// channel, so the blur loop only pays for a buffer copy.
pub struct PngFrameSink<S: Sample> {
    frame_tx: Option<Sender<(MaskSample, Image<S>)>>,
    writer_handle: Option<JoinHandle<Result<usize, CollaboratorError>>>,
}

impl<S: Sample> PngFrameSink<S> {
    pub fn new(dir: &Path) -> Result<Self, CollaboratorError> {
        std::fs::create_dir_all(dir)?;
        let (frame_tx, frame_rx) =
            crossbeam_channel::bounded::<(MaskSample, Image<S>)>(DEBUG_FRAME_QUEUE_CAPACITY);
        let dir = dir.to_path_buf();

        let writer_handle = std::thread::spawn(move || -> Result<usize, CollaboratorError> {
            let mut written = 0;
            for (sample, frame) in frame_rx {
                let path = frame_path(&dir, &sample);
                frame.into_dynamic().save(&path)?;
                written += 1;
            }
            Ok(written)
        });

        Ok(Self {
            frame_tx: Some(frame_tx),
            writer_handle: Some(writer_handle),
        })
    }

    /// Waits for queued frames to be written and returns how many were.
    pub fn finish(mut self) -> Result<usize, CollaboratorError> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<usize, CollaboratorError> {
        drop(self.frame_tx.take());
        match self.writer_handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| -> CollaboratorError { "Frame writer thread panicked".into() })?,
            None => Ok(0),
        }
    }
}

impl<S: Sample> FrameSink<S> for PngFrameSink<S> {
    fn emit(&mut self, sample: &MaskSample, frame: &Image<S>) -> Result<(), CollaboratorError> {
        let tx = self
            .frame_tx
            .as_ref()
            .ok_or("Frame sink already finished")?;
        if tx.send((*sample, frame.try_clone()?)).is_err() {
            // The writer only hangs up after an error; surface it.
            self.frame_tx = None;
            return match self.shutdown() {
                Err(e) => Err(e),
                Ok(_) => Err("Frame writer stopped unexpectedly".into()),
            };
        }
        Ok(())
    }
}

impl<S: Sample> Drop for PngFrameSink<S> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::warn!("Debug frame writer failed: {e}");
        }
    }
}

fn frame_path(dir: &Path, sample: &MaskSample) -> PathBuf {
    dir.join(format!("sample-{}-{}.png", sample.x, sample.y))
}
