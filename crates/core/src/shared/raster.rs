use std::fmt;

use image::{DynamicImage, ImageBuffer, Rgba};

use crate::shared::error::BlurError;

/// Channels per pixel: R, G, B, A.
pub const CHANNELS: usize = 4;

/// Width and height shared by every buffer taking part in one blur.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A stored channel type with a fixed normalization range.
///
/// Values are normalized to `[0, 1]` by dividing by [`Sample::FULL_SCALE`] and
/// converted back with rounding and saturation.
pub trait Sample: Copy + Default + PartialEq + Send + Sync + fmt::Debug + 'static {
    const FULL_SCALE: f64;

    fn to_unit(self) -> f64;

    fn from_unit(value: f64) -> Self;

    /// Wraps interleaved RGBA samples in the matching `DynamicImage` variant.
    fn into_dynamic(data: Vec<Self>, width: u32, height: u32) -> Option<DynamicImage>;
}

impl Sample for u8 {
    const FULL_SCALE: f64 = u8::MAX as f64;

    fn to_unit(self) -> f64 {
        self as f64 / Self::FULL_SCALE
    }

    // Rounds to nearest rather than truncating.
    fn from_unit(value: f64) -> Self {
        (value.clamp(0.0, 1.0) * Self::FULL_SCALE).round() as u8
    }

    fn into_dynamic(data: Vec<Self>, width: u32, height: u32) -> Option<DynamicImage> {
        ImageBuffer::from_raw(width, height, data).map(DynamicImage::ImageRgba8)
    }
}

impl Sample for u16 {
    const FULL_SCALE: f64 = u16::MAX as f64;

    fn to_unit(self) -> f64 {
        self as f64 / Self::FULL_SCALE
    }

    // Rounds to nearest rather than truncating.
    fn from_unit(value: f64) -> Self {
        (value.clamp(0.0, 1.0) * Self::FULL_SCALE).round() as u16
    }

    fn into_dynamic(data: Vec<Self>, width: u32, height: u32) -> Option<DynamicImage> {
        ImageBuffer::from_raw(width, height, data).map(DynamicImage::ImageRgba16)
    }
}

/// Allocates a buffer of `len` elements, reporting failure instead of aborting.
pub(crate) fn try_alloc<T: Clone>(len: usize, fill: T) -> Result<Vec<T>, BlurError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| BlurError::AllocationFailure {
            bytes: len.saturating_mul(std::mem::size_of::<T>()),
        })?;
    buf.resize(len, fill);
    Ok(buf)
}

/// Number of stored samples for an RGBA buffer of the given bounds.
pub(crate) fn rgba_len(bounds: Bounds) -> Result<usize, BlurError> {
    bounds
        .pixel_count()
        .checked_mul(CHANNELS)
        .ok_or(BlurError::AllocationFailure { bytes: usize::MAX })
}

/// An RGBA image: interleaved channels in row-major order.
///
/// Every transform allocates a new `Image`; pixel data is never shared
/// between instances.
#[derive(Clone, Debug, PartialEq)]
pub struct Image<S: Sample = u8> {
    data: Vec<S>,
    width: u32,
    height: u32,
}

impl<S: Sample> Image<S> {
    /// Panics if `data.len() != width * height * 4`; see [`Image::try_new`].
    pub fn new(data: Vec<S>, width: u32, height: u32) -> Self {
        assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * CHANNELS,
            "data length must equal width * height * 4"
        );
        Self {
            data,
            width,
            height,
        }
    }

    pub fn try_new(data: Vec<S>, width: u32, height: u32) -> Result<Self, BlurError> {
        let expected = rgba_len(Bounds::new(width, height))?;
        if data.len() != expected {
            return Err(BlurError::BufferLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Allocates an image with every pixel set to `pixel`.
    pub fn try_filled(width: u32, height: u32, pixel: [S; CHANNELS]) -> Result<Self, BlurError> {
        let bounds = Bounds::new(width, height);
        let mut data = try_alloc(rgba_len(bounds)?, S::default())?;
        for chunk in data.chunks_exact_mut(CHANNELS) {
            chunk.copy_from_slice(&pixel);
        }
        Ok(Self::new(data, width, height))
    }

    /// Allocates an all-zero image with the given bounds.
    pub fn try_zeroed(bounds: Bounds) -> Result<Self, BlurError> {
        let data = try_alloc(rgba_len(bounds)?, S::default())?;
        Ok(Self::new(data, bounds.width, bounds.height))
    }

    /// Fallible deep copy.
    pub fn try_clone(&self) -> Result<Self, BlurError> {
        let mut data = Vec::new();
        data.try_reserve_exact(self.data.len())
            .map_err(|_| BlurError::AllocationFailure {
                bytes: self.data.len() * std::mem::size_of::<S>(),
            })?;
        data.extend_from_slice(&self.data);
        Ok(Self::new(data, self.width, self.height))
    }

    pub fn data(&self) -> &[S] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [S] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.width, self.height)
    }

    /// Stored samples per row.
    pub fn row_len(&self) -> usize {
        self.width as usize * CHANNELS
    }

    pub fn pixel(&self, x: u32, y: u32) -> [S; CHANNELS] {
        let i = self.offset(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, pixel: [S; CHANNELS]) {
        let i = self.offset(x, y);
        self.data[i..i + CHANNELS].copy_from_slice(&pixel);
    }

    pub fn into_dynamic(self) -> DynamicImage {
        S::into_dynamic(self.data, self.width, self.height)
            .expect("Image data length must match dimensions")
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }
}

impl From<ImageBuffer<Rgba<u8>, Vec<u8>>> for Image<u8> {
    fn from(buffer: ImageBuffer<Rgba<u8>, Vec<u8>>) -> Self {
        let (width, height) = buffer.dimensions();
        Self::new(buffer.into_raw(), width, height)
    }
}

impl From<ImageBuffer<Rgba<u16>, Vec<u16>>> for Image<u16> {
    fn from(buffer: ImageBuffer<Rgba<u16>, Vec<u16>>) -> Self {
        let (width, height) = buffer.dimensions();
        Self::new(buffer.into_raw(), width, height)
    }
}

/// A decoded source image at whichever channel depth it arrived in.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceImage {
    Rgba8(Image<u8>),
    Rgba16(Image<u16>),
}

impl SourceImage {
    pub fn bounds(&self) -> Bounds {
        match self {
            SourceImage::Rgba8(img) => img.bounds(),
            SourceImage::Rgba16(img) => img.bounds(),
        }
    }

    pub fn bits_per_channel(&self) -> u8 {
        match self {
            SourceImage::Rgba8(_) => 8,
            SourceImage::Rgba16(_) => 16,
        }
    }

    pub fn into_dynamic(self) -> DynamicImage {
        match self {
            SourceImage::Rgba8(img) => img.into_dynamic(),
            SourceImage::Rgba16(img) => img.into_dynamic(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 16]; // 2x2x4
        let img = Image::new(data.clone(), 2, 2);
        assert_eq!(img.width(), 2);
        assert_eq!(img.height(), 2);
        assert_eq!(img.bounds(), Bounds::new(2, 2));
        assert_eq!(img.row_len(), 8);
        assert_eq!(img.data(), &data[..]);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * 4")]
    fn test_mismatched_data_length_panics() {
        Image::new(vec![0u8; 10], 2, 2);
    }

    #[test]
    fn test_try_new_rejects_wrong_length() {
        let err = Image::try_new(vec![0u8; 10], 2, 2).unwrap_err();
        assert!(matches!(
            err,
            BlurError::BufferLength {
                expected: 16,
                actual: 10
            }
        ));
        assert!(Image::try_new(vec![0u16; 16], 2, 2).is_ok());
    }

    #[test]
    fn test_oversized_bounds_report_allocation_failure() {
        let err = Image::<u8>::try_zeroed(Bounds::new(u32::MAX, u32::MAX)).unwrap_err();
        assert!(matches!(err, BlurError::AllocationFailure { .. }));
        let err = Image::<u16>::try_filled(u32::MAX, u32::MAX, [0; CHANNELS]).unwrap_err();
        assert!(matches!(err, BlurError::AllocationFailure { .. }));
    }

    #[test]
    fn test_try_filled_sets_every_pixel() {
        let img = Image::<u8>::try_filled(3, 2, [1, 2, 3, 4]).unwrap();
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(img.pixel(x, y), [1, 2, 3, 4]);
            }
        }
    }

    #[test]
    fn test_try_zeroed_zero_size() {
        let img = Image::<u16>::try_zeroed(Bounds::new(0, 5)).unwrap();
        assert!(img.data().is_empty());
        assert_eq!(img.height(), 5);
    }

    #[test]
    fn test_try_clone_is_independent() {
        let img = Image::<u8>::try_filled(2, 2, [100, 100, 100, 255]).unwrap();
        let mut cloned = img.try_clone().unwrap();
        cloned.put_pixel(0, 0, [0, 0, 0, 0]);
        assert_eq!(img.pixel(0, 0), [100, 100, 100, 255]);
        assert_eq!(cloned.pixel(0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn test_put_pixel_row_major_layout() {
        let mut img = Image::<u8>::try_zeroed(Bounds::new(3, 2)).unwrap();
        img.put_pixel(2, 1, [9, 8, 7, 6]);
        assert_eq!(&img.data()[20..24], &[9, 8, 7, 6]);
    }

    #[test]
    fn test_dynamic_conversion_keeps_pixels_u16() {
        let mut img = Image::<u16>::try_zeroed(Bounds::new(2, 3)).unwrap();
        img.put_pixel(1, 2, [1000, 2000, 3000, 65535]);
        let dynamic = img.clone().into_dynamic();
        assert!(matches!(dynamic, DynamicImage::ImageRgba16(_)));
        let buffer = dynamic.into_rgba16();
        assert_eq!(buffer.get_pixel(1, 2).0, [1000, 2000, 3000, 65535]);
        assert_eq!(Image::from(buffer), img);
    }

    #[test]
    fn test_dynamic_conversion_keeps_pixels_u8() {
        let mut img = Image::<u8>::try_zeroed(Bounds::new(3, 1)).unwrap();
        img.put_pixel(2, 0, [1, 2, 3, 4]);
        let dynamic = img.clone().into_dynamic();
        assert!(matches!(dynamic, DynamicImage::ImageRgba8(_)));
        assert_eq!(Image::from(dynamic.into_rgba8()), img);
    }

    #[rstest]
    #[case::zero(0u8, 0.0)]
    #[case::max(255u8, 1.0)]
    fn test_u8_normalization(#[case] stored: u8, #[case] unit: f64) {
        approx::assert_relative_eq!(stored.to_unit(), unit);
        assert_eq!(u8::from_unit(unit), stored);
    }

    #[rstest]
    #[case::below_range(-0.5, 0)]
    #[case::above_range(1.7, 255)]
    #[case::half_rounds_up(0.5, 128)]
    fn test_u8_from_unit_saturates_and_rounds(#[case] unit: f64, #[case] stored: u8) {
        assert_eq!(u8::from_unit(unit), stored);
    }

    #[test]
    fn test_u16_every_value_round_trips() {
        for v in (0..=u16::MAX).step_by(257) {
            assert_eq!(u16::from_unit(v.to_unit()), v);
        }
    }

    #[test]
    fn test_source_image_reports_depth() {
        let eight = SourceImage::Rgba8(Image::try_zeroed(Bounds::new(1, 1)).unwrap());
        let sixteen = SourceImage::Rgba16(Image::try_zeroed(Bounds::new(2, 1)).unwrap());
        assert_eq!(eight.bits_per_channel(), 8);
        assert_eq!(sixteen.bits_per_channel(), 16);
        assert_eq!(sixteen.bounds(), Bounds::new(2, 1));
    }

    #[test]
    fn test_bounds_display() {
        assert_eq!(Bounds::new(640, 480).to_string(), "640x480");
    }
}
