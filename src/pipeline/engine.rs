//! The inference seam between the pipeline and the neural network.

use std::path::Path;

use ndarray::Array4;
use ort::session::Session;
use ort::value::Tensor;

use crate::error::{Error, Result};
use crate::model;

use super::tensor::{ChromaTensor, LightnessTensor};

/// Something that predicts chrominance from lightness.
///
/// Given a `(1, 256, 256, 1)` tensor of normalized L it returns a
/// `(1, 256, 256, 2)` tensor of normalized ab. Implementations may use
/// hardware acceleration however they like; the pipeline does not care which
/// backend runs the network.
pub trait InferenceEngine {
    /// Run the network once.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine fails. Implementations must never return
    /// a placeholder tensor in place of an error.
    fn infer(&mut self, lightness: &LightnessTensor) -> Result<ChromaTensor>;
}

impl<E: InferenceEngine + ?Sized> InferenceEngine for Box<E> {
    fn infer(&mut self, lightness: &LightnessTensor) -> Result<ChromaTensor> {
        (**self).infer(lightness)
    }
}

/// [`InferenceEngine`] backed by an ONNX Runtime session.
///
/// `Session::run` needs exclusive access, so one engine serves one call at a
/// time. Share it across threads behind a `Mutex`.
pub struct OnnxEngine {
    session: Session,
}

impl OnnxEngine {
    /// Wrap an already built session.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// Load the model at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be loaded.
    pub fn from_file(path: &Path, intra_threads: usize) -> Result<Self> {
        model::load_session(path, intra_threads).map(Self::new)
    }
}

impl InferenceEngine for OnnxEngine {
    fn infer(&mut self, lightness: &LightnessTensor) -> Result<ChromaTensor> {
        let input_value =
            Tensor::from_array(lightness.clone()).map_err(|source| Error::Inference { source })?;

        let outputs = self
            .session
            .run(ort::inputs![input_value])
            .map_err(|source| Error::Inference { source })?;

        let output = outputs
            .values()
            .next()
            .ok_or_else(|| Error::ShapeMismatch {
                expected: "ab output".to_string(),
                actual: "no output".to_string(),
            })?;

        extract_array4(&output)
    }
}

/// Extract a 4D array from an ONNX value.
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
fn extract_array4(value: &ort::value::ValueRef<'_>) -> Result<Array4<f32>> {
    let (shape_info, data) = value
        .try_extract_tensor::<f32>()
        .map_err(|source| Error::Inference { source })?;

    // Safe: tensor dimensions are always non-negative and within bounds
    let dims: Vec<usize> = shape_info.iter().map(|&x| x as usize).collect();

    if dims.len() != 4 {
        return Err(Error::ShapeMismatch {
            expected: "4D tensor".to_string(),
            actual: format!("{}D tensor", dims.len()),
        });
    }

    Array4::from_shape_vec((dims[0], dims[1], dims[2], dims[3]), data.to_vec()).map_err(|_| {
        Error::ShapeMismatch {
            expected: format!("{dims:?}"),
            actual: "reshape failed".to_string(),
        }
    })
}
