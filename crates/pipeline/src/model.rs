//! Frozen model adapters.
//!
//! The pipeline only sees [`ProfileModel`]: a `(1, 1, features)` tensor goes
//! in, a map of named `(batch, width)` tensors comes out. Which runtime
//! evaluates the model is a startup decision.

use std::collections::HashMap;
use std::path::Path;

use chargeplan_core::error::{read_json_artifact, ArtifactError, PipelineError};
use ndarray::{s, Array1, Array2, Array3, Axis};
use serde::Deserialize;

/// Named output tensors produced by one model invocation.
pub type ModelOutputs = HashMap<String, Array2<f32>>;

/// File name of the dense model artifact inside the model directory.
pub const DENSE_MODEL_FILE: &str = "model.json";

/// A frozen inference-only model.
pub trait ProfileModel: Send + Sync {
    /// Number of features the model expects in its single time step.
    fn input_width(&self) -> usize;

    /// Run the model on a `(1, 1, input_width)` tensor.
    fn infer(&self, input: &Array3<f32>) -> Result<ModelOutputs, PipelineError>;
}

/// Check that `input` is a single time step of a single batch with the
/// expected feature width.
pub(crate) fn check_input_shape(input: &Array3<f32>, width: usize) -> Result<(), PipelineError> {
    if input.shape() != [1, 1, width] {
        return Err(PipelineError::ModelInvocation(format!(
            "expected input tensor of shape [1, 1, {width}], got {:?}",
            input.shape()
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Linear,
    Relu,
    Sigmoid,
    Tanh,
}

impl Activation {
    fn apply(self, x: f32) -> f32 {
        match self {
            Self::Linear => x,
            Self::Relu => x.max(0.0),
            Self::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Self::Tanh => x.tanh(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DenseArtifact {
    output_name: String,
    #[serde(default)]
    activation: Activation,
    /// One row per output unit, one column per input feature.
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
}

/// A frozen dense output head evaluated in-process.
///
/// Loaded from a JSON export of the trained layer's kernel and bias:
/// `{"output_name": "dense", "activation": "linear", "weights": [[..]], "bias": [..]}`.
#[derive(Debug, Clone)]
pub struct DenseModel {
    output_name: String,
    activation: Activation,
    weights: Array2<f32>,
    bias: Array1<f32>,
}

impl DenseModel {
    pub fn new(
        output_name: impl Into<String>,
        activation: Activation,
        weights: Array2<f32>,
        bias: Array1<f32>,
    ) -> Result<Self, String> {
        if weights.is_empty() {
            return Err("weights are empty".into());
        }
        if weights.nrows() != bias.len() {
            return Err(format!(
                "weights have {} output rows but bias has {} entries",
                weights.nrows(),
                bias.len()
            ));
        }
        if weights.iter().chain(bias.iter()).any(|v| !v.is_finite()) {
            return Err("weights and bias must be finite".into());
        }
        Ok(Self {
            output_name: output_name.into(),
            activation,
            weights,
            bias,
        })
    }

    /// Load a dense model artifact from `path`.
    pub fn from_file(path: &Path) -> Result<Self, ArtifactError> {
        let artifact: DenseArtifact = read_json_artifact(path)?;
        let invalid = |reason: String| ArtifactError::Invalid {
            path: path.display().to_string(),
            reason,
        };

        let rows = artifact.weights.len();
        let cols = artifact.weights.first().map_or(0, Vec::len);
        if artifact.weights.iter().any(|row| row.len() != cols) {
            return Err(invalid("weight rows have differing lengths".into()));
        }
        let flat: Vec<f32> = artifact.weights.into_iter().flatten().collect();
        let weights = Array2::from_shape_vec((rows, cols), flat)
            .map_err(|e| invalid(format!("weights: {e}")))?;

        Self::new(
            artifact.output_name,
            artifact.activation,
            weights,
            Array1::from(artifact.bias),
        )
        .map_err(invalid)
    }

    pub fn output_width(&self) -> usize {
        self.weights.nrows()
    }
}

impl ProfileModel for DenseModel {
    fn input_width(&self) -> usize {
        self.weights.ncols()
    }

    fn infer(&self, input: &Array3<f32>) -> Result<ModelOutputs, PipelineError> {
        check_input_shape(input, self.input_width())?;

        let features = input.slice(s![0, 0, ..]);
        let activation = self.activation;
        let output: Array1<f32> = self.weights.dot(&features) + &self.bias;
        let output = output.mapv_into(|v| activation.apply(v));

        let mut outputs = ModelOutputs::new();
        outputs.insert(self.output_name.clone(), output.insert_axis(Axis(0)));
        Ok(outputs)
    }
}
