pub mod constants;
pub mod error;
pub mod mask;
pub mod raster;
