pub mod image_file_reader;
pub mod image_file_writer;
pub mod png_frame_sink;
