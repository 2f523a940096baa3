//! ONNX Runtime backend, enabled with the `onnx` feature.

use std::path::Path;
use std::sync::Mutex;

use chargeplan_core::error::{ArtifactError, PipelineError};
use ndarray::{Array2, Array3};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;

use crate::model::{check_input_shape, ModelOutputs, ProfileModel};

/// File name of the ONNX export inside the model directory.
pub const ONNX_MODEL_FILE: &str = "model.onnx";

/// A frozen model evaluated by ONNX Runtime.
///
/// `Session::run` needs exclusive access, so concurrent requests take turns
/// on the session.
pub struct OnnxModel {
    session: Mutex<Session>,
    input_width: usize,
}

impl OnnxModel {
    /// Load and optimize the ONNX graph at `path`.
    ///
    /// `input_width` is the feature width the scalers produce; the graph's
    /// own input metadata is not trusted for it.
    pub fn from_file(path: &Path, input_width: usize) -> Result<Self, ArtifactError> {
        let invalid = |reason: String| ArtifactError::Invalid {
            path: path.display().to_string(),
            reason,
        };

        let session = Session::builder()
            .map_err(|e| invalid(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| invalid(e.to_string()))?
            .with_intra_threads(1)
            .map_err(|e| invalid(e.to_string()))?
            .commit_from_file(path)
            .map_err(|e| invalid(e.to_string()))?;

        tracing::info!(path = %path.display(), input_width, "Loaded ONNX model");

        Ok(Self {
            session: Mutex::new(session),
            input_width,
        })
    }
}

impl ProfileModel for OnnxModel {
    fn input_width(&self) -> usize {
        self.input_width
    }

    fn infer(&self, input: &Array3<f32>) -> Result<ModelOutputs, PipelineError> {
        check_input_shape(input, self.input_width)?;

        let tensor = Value::from_array(input.clone())
            .map_err(|e| PipelineError::ModelInvocation(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| PipelineError::ModelInvocation("ONNX session lock poisoned".into()))?;
        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| PipelineError::ModelInvocation(e.to_string()))?;

        let mut named = ModelOutputs::new();
        for (name, value) in outputs.iter() {
            let (_, data) = value
                .try_extract_tensor::<f32>()
                .map_err(|e| PipelineError::ModelInvocation(format!("output {name}: {e}")))?;
            let row = Array2::from_shape_vec((1, data.len()), data.to_vec())
                .map_err(|e| PipelineError::ModelInvocation(format!("output {name}: {e}")))?;
            named.insert(name.to_string(), row);
        }
        Ok(named)
    }
}
