/// Weight scale applied to mask luminance when none is configured.
pub const DEFAULT_WEIGHT_SCALE: f64 = 1.0;

/// Fixed normalization used by the double-halving contribution variant.
pub const HALF_WEIGHT: f64 = 0.5;

/// Bounded queue depth between the blur loop and the debug frame writer.
pub const DEBUG_FRAME_QUEUE_CAPACITY: usize = 4;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
