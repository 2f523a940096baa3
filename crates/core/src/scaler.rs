//! Fixed linear normalizers applied to each feature group.
//!
//! Every scaler is fitted offline and shipped as a JSON artifact of the form
//! `{"center": [..], "scale": [..]}` with one entry per feature column. The
//! forward transform is `(x - center) / scale`; the inverse is
//! `y * scale + center`. A min-max scaler with fitted `scale_`/`min_` maps to
//! `center = -min_ / scale_` and `scale = 1 / scale_`; a standard scaler maps
//! to `center = mean_` and `scale = scale_`.

use std::path::Path;

use serde::Deserialize;

use crate::error::{read_json_artifact, ArtifactError, PipelineError};

/// File names of the four scaler artifacts inside the model directory.
pub const HOURLY_RATES_FILE: &str = "scaler_hourly_rates.json";
pub const TOTAL_ENERGY_FILE: &str = "scaler_total_energy.json";
pub const CURTAILMENT_FILE: &str = "scaler_curtailment.json";
pub const PROFILE_FILE: &str = "scaler_real_profiles.json";

#[derive(Debug, Deserialize)]
struct ScalerArtifact {
    center: Vec<f64>,
    scale: Vec<f64>,
}

/// A reversible per-column linear transform.
#[derive(Debug, Clone)]
pub struct LinearScaler {
    name: &'static str,
    center: Vec<f64>,
    scale: Vec<f64>,
}

impl LinearScaler {
    /// Build a scaler from fitted parameters.
    ///
    /// Rejects empty parameter vectors, mismatched lengths, non-finite values
    /// and zero scales (the inverse would be undefined).
    pub fn new(name: &'static str, center: Vec<f64>, scale: Vec<f64>) -> Result<Self, String> {
        if center.is_empty() {
            return Err("scaler has no feature columns".into());
        }
        if center.len() != scale.len() {
            return Err(format!(
                "center has {} columns but scale has {}",
                center.len(),
                scale.len()
            ));
        }
        if let Some(i) = center.iter().position(|c| !c.is_finite()) {
            return Err(format!("center[{i}] is not finite"));
        }
        if let Some(i) = scale.iter().position(|s| !s.is_finite() || *s == 0.0) {
            return Err(format!("scale[{i}] must be finite and non-zero"));
        }
        Ok(Self {
            name,
            center,
            scale,
        })
    }

    /// Load a scaler artifact from `path`.
    pub fn from_file(name: &'static str, path: &Path) -> Result<Self, ArtifactError> {
        let artifact: ScalerArtifact = read_json_artifact(path)?;
        Self::new(name, artifact.center, artifact.scale).map_err(|reason| {
            ArtifactError::Invalid {
                path: path.display().to_string(),
                reason,
            }
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of feature columns the scaler was fitted on.
    pub fn width(&self) -> usize {
        self.center.len()
    }

    /// Normalize `x` into the model's feature space.
    pub fn forward(&self, x: &[f64]) -> Result<Vec<f64>, PipelineError> {
        self.check_width(x)?;
        Ok(x.iter()
            .zip(self.center.iter().zip(&self.scale))
            .map(|(v, (c, s))| (v - c) / s)
            .collect())
    }

    /// Map normalized values back to the original scale.
    pub fn inverse(&self, y: &[f64]) -> Result<Vec<f64>, PipelineError> {
        self.check_width(y)?;
        Ok(y.iter()
            .zip(self.center.iter().zip(&self.scale))
            .map(|(v, (c, s))| v * s + c)
            .collect())
    }

    fn check_width(&self, x: &[f64]) -> Result<(), PipelineError> {
        if x.len() != self.width() {
            return Err(PipelineError::ShapeMismatch {
                stage: self.name,
                expected: self.width(),
                actual: x.len(),
            });
        }
        Ok(())
    }
}

/// The four scalers used by the inference pipeline.
#[derive(Debug, Clone)]
pub struct ScalerSet {
    pub hourly_rates: LinearScaler,
    pub total_energy: LinearScaler,
    pub curtailment: LinearScaler,
    pub profile: LinearScaler,
}

impl ScalerSet {
    /// Load all four scaler artifacts from a model directory.
    pub fn load_dir(dir: &Path) -> Result<Self, ArtifactError> {
        let set = Self {
            hourly_rates: LinearScaler::from_file("hourly_rates scaler", &dir.join(HOURLY_RATES_FILE))?,
            total_energy: LinearScaler::from_file("total_energy scaler", &dir.join(TOTAL_ENERGY_FILE))?,
            curtailment: LinearScaler::from_file("curtailment scaler", &dir.join(CURTAILMENT_FILE))?,
            profile: LinearScaler::from_file("profile scaler", &dir.join(PROFILE_FILE))?,
        };

        for (scaler, file) in [
            (&set.total_energy, TOTAL_ENERGY_FILE),
            (&set.curtailment, CURTAILMENT_FILE),
        ] {
            if scaler.width() != 1 {
                return Err(ArtifactError::Invalid {
                    path: dir.join(file).display().to_string(),
                    reason: format!("expected a single column, found {}", scaler.width()),
                });
            }
        }

        Ok(set)
    }

    /// Width of the concatenated normalized input vector.
    pub fn input_width(&self) -> usize {
        self.hourly_rates.width() + self.total_energy.width() + self.curtailment.width()
    }

    /// Width of the denormalized profile.
    pub fn output_width(&self) -> usize {
        self.profile.width()
    }
}
