use image::{ImageBuffer, Luma};
use ndarray::ArrayView2;

use crate::shared::error::BlurError;
use crate::shared::raster::Bounds;

/// One non-zero mask location, visited by the blur engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaskSample {
    pub x: u32,
    pub y: u32,
    pub value: u16,
}

impl MaskSample {
    /// Sample luminance normalized to `[0, 1]`.
    pub fn luminance(&self) -> f64 {
        self.value as f64 / u16::MAX as f64
    }
}

/// Single-channel 16-bit luminance grid driving per-location blur weight.
///
/// A sample of `0` contributes nothing; any other value contributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    data: Vec<u16>,
    width: u32,
    height: u32,
}

impl Mask {
    /// Panics if `data.len() != width * height`; see [`Mask::try_new`].
    pub fn new(data: Vec<u16>, width: u32, height: u32) -> Self {
        assert_eq!(
            data.len(),
            (width as usize) * (height as usize),
            "data length must equal width * height"
        );
        Self {
            data,
            width,
            height,
        }
    }

    pub fn try_new(data: Vec<u16>, width: u32, height: u32) -> Result<Self, BlurError> {
        let expected = Bounds::new(width, height).pixel_count();
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

    /// All-zero mask; blurring with it returns the source unchanged.
    pub fn empty(width: u32, height: u32) -> Self {
        Self::new(vec![0; width as usize * height as usize], width, height)
    }

    pub fn data(&self) -> &[u16] {
        &self.data
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

    pub fn sample(&self, x: u32, y: u32) -> u16 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, value: u16) {
        self.data[y as usize * self.width as usize + x as usize] = value;
    }

    /// Non-zero samples in row-major order.
    pub fn active_samples(&self) -> impl Iterator<Item = MaskSample> + '_ {
        let view = self.as_ndarray();
        ndarray::indices_of(&view)
            .into_iter()
            .filter_map(move |(y, x)| {
                let value = view[[y, x]];
                (value != 0).then_some(MaskSample {
                    x: x as u32,
                    y: y as u32,
                    value,
                })
            })
    }

    pub fn active_count(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// `(height, width)` view of the samples.
    pub fn as_ndarray(&self) -> ArrayView2<'_, u16> {
        ArrayView2::from_shape((self.height as usize, self.width as usize), &self.data)
            .expect("Mask data length must match dimensions")
    }
}

impl From<ImageBuffer<Luma<u16>, Vec<u16>>> for Mask {
    fn from(buffer: ImageBuffer<Luma<u16>, Vec<u16>>) -> Self {
        let (width, height) = buffer.dimensions();
        Self::new(buffer.into_raw(), width, height)
    }
}
