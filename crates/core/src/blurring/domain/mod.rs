pub mod blur_engine;
pub mod boundary_policy;
pub mod contribution_strategy;
pub mod frame_sink;
pub mod pixel_math;
pub mod weight_color;
