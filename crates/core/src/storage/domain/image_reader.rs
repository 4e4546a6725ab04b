use std::path::Path;

use crate::shared::mask::Mask;
use crate::shared::raster::SourceImage;

/// Supplies the blur inputs from some external source.
///
/// Implementations handle decoding; the engine only sees normalized
/// `SourceImage` and `Mask` buffers.
pub trait ImageReader: Send {
    fn read_source(&self, path: &Path) -> Result<SourceImage, Box<dyn std::error::Error>>;

    fn read_mask(&self, path: &Path) -> Result<Mask, Box<dyn std::error::Error>>;
}
