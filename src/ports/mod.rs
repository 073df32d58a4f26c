mod file_image_source;

pub use file_image_source::FileImageSource;
