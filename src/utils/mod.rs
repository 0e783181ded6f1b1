pub mod image;
mod logger;

pub use image::{ImageData, InlineImage, load_image};
pub use logger::logger_init;
