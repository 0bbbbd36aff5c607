//! The colorization pipeline: resize, extract L, predict ab, rebuild RGB.

use std::path::{Path, PathBuf};
use std::time::Instant;

use ::image::{imageops::FilterType, DynamicImage, GenericImageView, RgbImage};

use crate::error::{Error, Result};
use crate::image::{decode, open, resize_for_model, save_image};
use crate::model::ModelCache;

use super::engine::{InferenceEngine, OnnxEngine};
use super::tensor::{lightness_tensor, reconstruct};

/// Configuration for the colorization pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    /// Explicit model file. When unset the model cache is used.
    pub model_path: Option<PathBuf>,

    /// Where to download the model from if it is not cached yet.
    pub model_url: Option<String>,

    /// Worker threads the inference runtime may use inside one call.
    pub intra_threads: usize,

    /// Output JPEG quality (1-100).
    pub output_quality: u8,

    /// Resize the result back to the source dimensions when saving.
    pub restore_dimensions: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_path: None,
            model_url: None,
            intra_threads: 4,
            output_quality: 100,
            restore_dimensions: false,
        }
    }
}

impl Config {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        if self.intra_threads == 0 {
            return Err(Error::InvalidParameter {
                name: "intra_threads".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        if !(1..=100).contains(&self.output_quality) {
            return Err(Error::InvalidParameter {
                name: "output_quality".to_string(),
                reason: "must be between 1 and 100".to_string(),
            });
        }

        if let Some(url) = &self.model_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::InvalidParameter {
                    name: "model_url".to_string(),
                    reason: format!("expected an http(s) URL, got {url:?}"),
                });
            }
        }

        Ok(())
    }
}

/// Colorizes grayscale photographs.
///
/// The model is loaded once at construction and never mutated afterwards.
/// Every call allocates its own tensors, but [`colorize`](Self::colorize) takes
/// `&mut self` because the underlying runtime session does. Callers that share
/// one colorizer between threads must serialize calls, e.g. with a `Mutex`.
pub struct Colorizer<E = OnnxEngine> {
    config: Config,
    engine: E,
}

impl Colorizer<OnnxEngine> {
    /// Create a colorizer backed by ONNX Runtime.
    ///
    /// This will download the model if it is not cached and a URL is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the model cannot be
    /// found or loaded.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        tracing::info!("Initializing colorizer with config: {config:?}");

        let model_path = match config.model_path.clone() {
            Some(path) if path.is_file() => path,
            Some(path) => return Err(Error::ModelNotFound { path }),
            None => ModelCache::new()?.resolve(config.model_url.as_deref())?,
        };

        let engine = OnnxEngine::from_file(&model_path, config.intra_threads)?;

        tracing::info!("Colorizer initialized successfully");

        Ok(Self { config, engine })
    }
}

impl<E: InferenceEngine> Colorizer<E> {
    /// Create a colorizer around any inference engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_engine(config: Config, engine: E) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, engine })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Colorize an image of any size.
    ///
    /// The result is always `256x256`. Any alpha in the input is discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails or returns a tensor of the wrong
    /// shape. No partial image is ever returned.
    pub fn colorize(&mut self, image: &DynamicImage) -> Result<RgbImage> {
        let resized = resize_for_model(image);

        let lightness = lightness_tensor(&resized)?;
        tracing::debug!("Image preprocessed");

        let start = Instant::now();
        let chroma = self.engine.infer(&lightness)?;
        tracing::debug!("Inference finished in {} ms", start.elapsed().as_millis());

        reconstruct(&lightness, &chroma)
    }

    /// Colorize an image and apply the output options from [`Config`].
    ///
    /// With `restore_dimensions` set, the `256x256` result is resized back to
    /// the source dimensions.
    ///
    /// # Errors
    ///
    /// Returns an error if colorization fails.
    pub fn colorize_for_output(&mut self, image: &DynamicImage) -> Result<RgbImage> {
        let colorized = self.colorize(image)?;

        if !self.config.restore_dimensions {
            return Ok(colorized);
        }

        let (width, height) = image.dimensions();
        Ok(::image::imageops::resize(
            &colorized,
            width,
            height,
            FilterType::Lanczos3,
        ))
    }

    /// Decode an encoded image and colorize it.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding or colorization fails.
    pub fn colorize_bytes(&mut self, bytes: &[u8]) -> Result<RgbImage> {
        let image = decode(bytes)?;
        self.colorize(&image)
    }

    /// Colorize an image file and save the result.
    ///
    /// # Arguments
    ///
    /// * `input_path` - Path to the input image
    /// * `output_path` - Path to save the colorized image; the extension
    ///   picks the format
    ///
    /// # Errors
    ///
    /// Returns an error if loading, colorization, or saving fails.
    pub fn process<P: AsRef<Path>, Q: AsRef<Path>>(
        &mut self,
        input_path: P,
        output_path: Q,
    ) -> Result<()> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        tracing::info!("Processing image: {}", input_path.display());

        let image = open(input_path)?;
        let colorized = self.colorize_for_output(&image)?;

        tracing::info!("Saving output to: {}", output_path.display());
        save_image(&colorized, output_path, self.config.output_quality)?;

        tracing::info!("Processing complete");
        Ok(())
    }
}
