//! Lightness-to-color pipeline around a fixed-shape pix2pix model.

mod colorize;
mod engine;
mod tensor;

pub use colorize::{Colorizer, Config};
pub use engine::{InferenceEngine, OnnxEngine};
pub use tensor::{
    denormalize_chroma, denormalize_lightness, lightness_tensor, normalize_lightness,
    reconstruct, ChromaTensor, LightnessTensor, CHROMA_SHAPE, LIGHTNESS_SHAPE,
};
