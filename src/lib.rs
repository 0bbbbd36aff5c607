//! # colorizer
//!
//! Colorize grayscale photographs with a pix2pix network that predicts the
//! Lab chrominance channels from lightness.
//!
//! The input is resized to 256x256, converted to a normalized L tensor, run
//! through the model, and the predicted ab channels are recombined with L and
//! converted back to sRGB.
//!
//! ## Example
//!
//! ```no_run
//! use colorizer::{Colorizer, Config};
//!
//! # fn main() -> colorizer::Result<()> {
//! let config = Config {
//!     model_path: Some("pix2pix_lab_256.onnx".into()),
//!     ..Config::default()
//! };
//! let mut colorizer = Colorizer::new(config)?;
//!
//! colorizer.process("grayscale.jpg", "color.jpg")?;
//! # Ok(())
//! # }
//! ```

pub mod color;
pub mod error;
pub mod image;
pub mod model;
pub mod pipeline;

pub use error::{Error, Result};
pub use pipeline::{Colorizer, Config, InferenceEngine, OnnxEngine};
