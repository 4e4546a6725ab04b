pub mod blur_settings;
pub mod bokeh_image_use_case;
pub mod pipeline_logger;
