use std::path::Path;

use image::DynamicImage;

use crate::shared::error::BlurError;
use crate::shared::mask::Mask;
use crate::shared::raster::{Image, SourceImage};
use crate::storage::domain::image_reader::ImageReader;

/// Reads source images and masks from files using the `image` crate.
pub struct ImageFileReader;

impl ImageFileReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalizes a decoded image to RGBA at its native integer depth.
pub fn source_from_dynamic(img: DynamicImage) -> Result<SourceImage, BlurError> {
    match img {
        DynamicImage::ImageLuma8(_)
        | DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageRgb8(_)
        | DynamicImage::ImageRgba8(_) => Ok(SourceImage::Rgba8(Image::from(img.into_rgba8()))),
        DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA16(_)
        | DynamicImage::ImageRgb16(_)
        | DynamicImage::ImageRgba16(_) => {
            Ok(SourceImage::Rgba16(Image::from(img.into_rgba16())))
        }
        other => Err(BlurError::UnsupportedColorModel(format!(
            "{:?} source images are not supported",
            other.color()
        ))),
    }
}

/// Converts a decoded image to 16-bit luminance. 8-bit input is widened
/// so that 255 maps to 65535.
pub fn mask_from_dynamic(img: DynamicImage) -> Result<Mask, BlurError> {
    match img {
        DynamicImage::ImageLuma8(_)
        | DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageRgb8(_)
        | DynamicImage::ImageRgba8(_)
        | DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA16(_)
        | DynamicImage::ImageRgb16(_)
        | DynamicImage::ImageRgba16(_) => Ok(Mask::from(img.into_luma16())),
        other => Err(BlurError::UnsupportedColorModel(format!(
            "{:?} masks are not supported",
            other.color()
        ))),
    }
}

impl ImageReader for ImageFileReader {
    fn read_source(&self, path: &Path) -> Result<SourceImage, Box<dyn std::error::Error>> {
        let img = image::open(path)?;
        log::debug!("Decoded source {} as {:?}", path.display(), img.color());
        Ok(source_from_dynamic(img)?)
    }

    fn read_mask(&self, path: &Path) -> Result<Mask, Box<dyn std::error::Error>> {
        let img = image::open(path)?;
        log::debug!("Decoded mask {} as {:?}", path.display(), img.color());
        Ok(mask_from_dynamic(img)?)
    }
}
