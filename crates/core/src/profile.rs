//! Energy conservation correction for generated charging profiles.
//!
//! The model has no hard energy-balance constraint, so its profile may sum to
//! something other than the requested total. The correction rescales the
//! whole profile by a single factor so the sum matches exactly.

use crate::error::PipelineError;
use crate::types::AdjustedProfile;

/// Relative tolerance under which a profile sum is treated as already equal
/// to the requested total.
pub const CONSERVATION_RTOL: f64 = 1e-9;

/// Rescale `profile` so that its sum equals `total_energy`.
///
/// Fails with [`PipelineError::DegenerateProfile`] when the profile sum is
/// zero or not finite, or when the rescaled profile still misses the total
/// (a factor that overflows, or a sum dominated by cancellation).
pub fn conserve_energy(
    mut profile: Vec<f64>,
    total_energy: f64,
) -> Result<AdjustedProfile, PipelineError> {
    let profile_sum: f64 = profile.iter().sum();

    if !profile_sum.is_finite() {
        return Err(PipelineError::DegenerateProfile(format!(
            "profile sum is not finite ({profile_sum})"
        )));
    }
    if profile_sum == 0.0 {
        return Err(PipelineError::DegenerateProfile(
            "profile sums to zero; cannot rescale to the requested total".into(),
        ));
    }

    if is_close(profile_sum, total_energy) {
        return Ok(AdjustedProfile {
            values: profile,
            correction_factor: 1.0,
        });
    }

    let factor = total_energy / profile_sum;
    if !factor.is_finite() {
        return Err(PipelineError::DegenerateProfile(format!(
            "profile sum {profile_sum:e} is too small to rescale to {total_energy}"
        )));
    }
    for value in &mut profile {
        *value *= factor;
    }

    let adjusted_sum: f64 = profile.iter().sum();
    if !adjusted_sum.is_finite() || !is_close(adjusted_sum, total_energy) {
        return Err(PipelineError::DegenerateProfile(format!(
            "rescaled profile sums to {adjusted_sum}, expected {total_energy} \
             (raw sum {profile_sum:e} lost to cancellation)"
        )));
    }

    Ok(AdjustedProfile {
        values: profile,
        correction_factor: factor,
    })
}

fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= CONSERVATION_RTOL * b.abs().max(a.abs())
}
