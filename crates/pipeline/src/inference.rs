//! Charge-profile inference: normalize, infer, denormalize, conserve.

use std::sync::Arc;

use chargeplan_core::error::{ArtifactError, PipelineError};
use chargeplan_core::profile::conserve_energy;
use chargeplan_core::scaler::ScalerSet;
use chargeplan_core::types::{AdjustedProfile, PredictionRequest};
use ndarray::Array3;

use crate::config::{ModelBackend, ModelConfig};
use crate::model::{DenseModel, ProfileModel, DENSE_MODEL_FILE};

/// The loaded scalers and model, shared read-only by all requests.
pub struct InferencePipeline {
    scalers: ScalerSet,
    model: Arc<dyn ProfileModel>,
    output_key: String,
}

impl std::fmt::Debug for InferencePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferencePipeline")
            .field("input_width", &self.scalers.input_width())
            .field("output_width", &self.scalers.output_width())
            .field("output_key", &self.output_key)
            .finish()
    }
}

impl InferencePipeline {
    /// Assemble a pipeline, checking that the scalers produce exactly the
    /// feature width the model consumes.
    pub fn new(
        scalers: ScalerSet,
        model: Arc<dyn ProfileModel>,
        output_key: impl Into<String>,
    ) -> Result<Self, PipelineError> {
        if scalers.input_width() != model.input_width() {
            return Err(PipelineError::ShapeMismatch {
                stage: "model input",
                expected: model.input_width(),
                actual: scalers.input_width(),
            });
        }
        Ok(Self {
            scalers,
            model,
            output_key: output_key.into(),
        })
    }

    /// Load scalers and model from the configured model directory.
    pub fn load(config: &ModelConfig) -> Result<Self, ArtifactError> {
        let scalers = ScalerSet::load_dir(&config.dir)?;

        let model: Arc<dyn ProfileModel> = match config.backend {
            ModelBackend::Dense => Arc::new(DenseModel::from_file(&config.dir.join(DENSE_MODEL_FILE))?),
            #[cfg(feature = "onnx")]
            ModelBackend::Onnx => Arc::new(crate::onnx::OnnxModel::from_file(
                &config.dir.join(crate::onnx::ONNX_MODEL_FILE),
                scalers.input_width(),
            )?),
            #[cfg(not(feature = "onnx"))]
            ModelBackend::Onnx => {
                return Err(ArtifactError::Invalid {
                    path: config.dir.display().to_string(),
                    reason: "ONNX backend requested but the `onnx` feature is not enabled".into(),
                })
            }
        };

        let pipeline = Self::new(scalers, model, config.output_key.clone()).map_err(|e| {
            ArtifactError::Invalid {
                path: config.dir.display().to_string(),
                reason: e.to_string(),
            }
        })?;

        tracing::info!(
            dir = %config.dir.display(),
            backend = ?config.backend,
            input_width = pipeline.scalers.input_width(),
            output_width = pipeline.output_width(),
            "Inference pipeline loaded"
        );
        Ok(pipeline)
    }

    /// Number of slots in a generated profile.
    pub fn output_width(&self) -> usize {
        self.scalers.output_width()
    }

    /// Number of hourly rates a request must carry.
    pub fn hourly_width(&self) -> usize {
        self.scalers.hourly_rates.width()
    }

    /// Generate an energy-conserving charging profile for `request`.
    ///
    /// Blocking and CPU-bound; async callers should run it on the blocking
    /// pool.
    pub fn generate_profile(
        &self,
        request: &PredictionRequest,
    ) -> Result<AdjustedProfile, PipelineError> {
        self.validate(request)?;

        let input = self.build_input(request)?;
        tracing::debug!(shape = ?input.shape(), "Invoking model");

        let mut outputs = self.model.infer(&input)?;
        let output = outputs.remove(&self.output_key).ok_or_else(|| {
            let mut available: Vec<_> = outputs.keys().cloned().collect();
            available.sort();
            PipelineError::ModelInvocation(format!(
                "model output '{}' not found (available: {available:?})",
                self.output_key
            ))
        })?;

        if output.nrows() != 1 {
            return Err(PipelineError::ModelInvocation(format!(
                "expected a single output row, got {}",
                output.nrows()
            )));
        }
        let normalized: Vec<f64> = output.row(0).iter().map(|v| f64::from(*v)).collect();
        let profile = self.scalers.profile.inverse(&normalized)?;

        let adjusted = conserve_energy(profile, request.total_energy)?;
        tracing::info!(
            slots = adjusted.values.len(),
            total_energy = request.total_energy,
            correction_factor = adjusted.correction_factor,
            "Generated charging profile"
        );
        Ok(adjusted)
    }

    fn validate(&self, request: &PredictionRequest) -> Result<(), PipelineError> {
        let expected = self.hourly_width();
        if request.hourly_rates.len() != expected {
            return Err(PipelineError::InvalidRequest(format!(
                "hourly_rates must contain {expected} values, got {}",
                request.hourly_rates.len()
            )));
        }
        if let Some(hour) = request.hourly_rates.iter().position(|r| !r.is_finite()) {
            return Err(PipelineError::InvalidRequest(format!(
                "hourly_rates[{hour}] is missing or not a finite number"
            )));
        }
        if !request.total_energy.is_finite() || request.total_energy <= 0.0 {
            return Err(PipelineError::InvalidRequest(format!(
                "total_energy must be a positive number, got {}",
                request.total_energy
            )));
        }
        if !request.curtailment_limit.is_finite() {
            return Err(PipelineError::InvalidRequest(
                "curtailment_limit must be a finite number".into(),
            ));
        }
        Ok(())
    }

    /// Request field feeding feature column `index`.
    fn feature_name(&self, index: usize) -> String {
        let hourly = self.hourly_width();
        match index {
            i if i < hourly => format!("hourly_rates[{i}]"),
            i if i == hourly => "total_energy".into(),
            _ => "curtailment_limit".into(),
        }
    }

    /// Scale each feature group independently, concatenate, and shape the
    /// result as one time step of one batch.
    fn build_input(&self, request: &PredictionRequest) -> Result<Array3<f32>, PipelineError> {
        let mut features = self.scalers.hourly_rates.forward(&request.hourly_rates)?;
        features.extend(self.scalers.total_energy.forward(&[request.total_energy])?);
        features.extend(self.scalers.curtailment.forward(&[request.curtailment_limit])?);

        let width = features.len();
        let features: Vec<f32> = features.into_iter().map(|v| v as f32).collect();
        if let Some(i) = features.iter().position(|v| !v.is_finite()) {
            return Err(PipelineError::InvalidRequest(format!(
                "{} is too large to represent after scaling",
                self.feature_name(i)
            )));
        }
        Array3::from_shape_vec((1, 1, width), features).map_err(|_| PipelineError::ShapeMismatch {
            stage: "feature tensor",
            expected: self.model.input_width(),
            actual: width,
        })
    }
}
