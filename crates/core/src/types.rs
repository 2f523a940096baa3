use serde::{Deserialize, Serialize};

/// Number of hourly price slots in a day-ahead curve.
pub const HOURS_PER_DAY: usize = 24;

/// Inputs for one charging-profile prediction.
///
/// Missing hourly rates are represented as `NaN`; they are rejected during
/// validation rather than fed to the scaler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub hourly_rates: Vec<f64>,
    pub total_energy: f64,
    pub curtailment_limit: f64,
}

/// Model output after denormalization and conservation correction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustedProfile {
    /// Energy per time slot; sums to the requested total energy.
    pub values: Vec<f64>,
    /// Multiplicative factor applied to the raw profile (1.0 when no
    /// correction was needed).
    pub correction_factor: f64,
}

impl AdjustedProfile {
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }
}
