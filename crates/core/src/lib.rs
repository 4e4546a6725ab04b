//! Mask-driven bokeh blur: every non-zero mask sample scatters a tinted,
//! shifted copy of the source image into an accumulator.

pub mod blurring;
pub mod pipeline;
pub mod shared;
pub mod storage;
