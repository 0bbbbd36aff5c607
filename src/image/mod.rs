//! Image decoding, resizing, encoding, and saving utilities.
//!
//! The pipeline only ever sees [`RgbImage`] values; the functions here are the
//! bytes-in / bytes-out boundary around it.

mod load;
mod save;

pub use load::{decode, open, resize_for_model};
pub use save::{encode, save_image, DirectorySink, ImageSink, OutputFormat};

pub use ::image::RgbImage;

/// Side length of the square images the colorization model consumes and produces.
pub const MODEL_IMAGE_SIZE: u32 = 256;
