// QualityMetrics - SNR and noise floor from a decomposition
//
// Zero noise power has no meaningful ratio or level. Those cases report
// fixed sentinels instead of infinities: SNR 0 dB and a -90 dB floor.

use crate::analysis::decompose::ensure_same_len;
use crate::analysis::types::QualityScore;
use crate::error::AnalysisError;

/// SNR reported when the noise power is exactly zero
pub const ZERO_NOISE_SNR_DB: f64 = 0.0;

/// Noise floor reported when the noise power is exactly zero
pub const SILENT_NOISE_FLOOR_DB: f64 = -90.0;

/// Mean of the squared samples.
pub fn mean_power(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|s| s * s).sum::<f64>() / samples.len() as f64
}

/// Score a channel from its clean and noise components.
///
/// - `snr_db = 10 * log10(P_clean / P_noise)`
/// - `noise_floor_db = 20 * log10(sqrt(P_noise))`
pub fn score(clean: &[f64], noise: &[f64]) -> Result<QualityScore, AnalysisError> {
    ensure_same_len(clean, noise)?;

    let signal_power = mean_power(clean);
    let noise_power = mean_power(noise);

    if noise_power == 0.0 {
        return Ok(QualityScore {
            snr_db: ZERO_NOISE_SNR_DB,
            noise_floor_db: SILENT_NOISE_FLOOR_DB,
        });
    }

    Ok(QualityScore {
        snr_db: 10.0 * (signal_power / noise_power).log10(),
        noise_floor_db: 20.0 * noise_power.sqrt().log10(),
    })
}
