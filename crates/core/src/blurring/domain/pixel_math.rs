use crate::shared::raster::{Sample, CHANNELS};

/// Normalized RGBA working color. Channels are nominally in `[0, 1]`, but
/// alpha may exceed 1 after `add` until it is clamped at storage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RgbaF64 {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl RgbaF64 {
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_stored<S: Sample>(px: &[S]) -> Self {
        Self {
            r: px[0].to_unit(),
            g: px[1].to_unit(),
            b: px[2].to_unit(),
            a: px[3].to_unit(),
        }
    }

    /// Writes the color into a stored pixel, saturating every channel.
    pub fn store<S: Sample>(&self, out: &mut [S]) {
        let c = clamp(*self);
        out[..CHANNELS].copy_from_slice(&[
            S::from_unit(c.r),
            S::from_unit(c.g),
            S::from_unit(c.b),
            S::from_unit(c.a),
        ]);
    }
}

/// Tints `a` by `b`; the multiplier's alpha drives the composite.
pub fn multiply(a: RgbaF64, b: RgbaF64) -> RgbaF64 {
    let raw = RgbaF64::new(a.r * b.r, a.g * b.g, a.b * b.b, b.a);
    alpha_composite(a, raw)
}

/// Adds `b` onto `a`; result alpha is `a.a + b.a`, unclamped.
pub fn add(a: RgbaF64, b: RgbaF64) -> RgbaF64 {
    let raw = RgbaF64::new(a.r + b.r, a.g + b.g, a.b + b.b, b.a);
    alpha_composite(a, raw)
}

/// Source-over of a clamped `foreground` onto `background`, with additive alpha.
pub fn alpha_composite(background: RgbaF64, foreground: RgbaF64) -> RgbaF64 {
    let fg = clamp(foreground);
    let inv = 1.0 - fg.a;
    RgbaF64 {
        r: fg.r * fg.a + background.r * inv,
        g: fg.g * fg.a + background.g * inv,
        b: fg.b * fg.a + background.b * inv,
        a: background.a + fg.a,
    }
}

pub fn clamp(c: RgbaF64) -> RgbaF64 {
    RgbaF64 {
        r: c.r.clamp(0.0, 1.0),
        g: c.g.clamp(0.0, 1.0),
        b: c.b.clamp(0.0, 1.0),
        a: c.a.clamp(0.0, 1.0),
    }
}
