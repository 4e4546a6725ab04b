use std::path::Path;

use crate::shared::raster::SourceImage;

/// Persists a finished image.
pub trait ImageWriter: Send {
    fn write(&self, path: &Path, image: &SourceImage) -> Result<(), Box<dyn std::error::Error>>;
}
