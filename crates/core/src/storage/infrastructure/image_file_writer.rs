use std::path::Path;

use crate::shared::raster::SourceImage;
use crate::storage::domain::image_writer::ImageWriter;

/// Writes an image file using the `image` crate; format follows the
/// path's extension.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, image: &SourceImage) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        image.clone().into_dynamic().save(path)?;
        Ok(())
    }
}
