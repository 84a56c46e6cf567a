// SignalDecomposer - raw = clean + noise

use crate::analysis::types::Decomposition;
use crate::error::AnalysisError;

/// Residual left after removing the in-band component: `raw[i] - clean[i]`.
pub fn decompose(raw: &[f64], clean: &[f64]) -> Result<Vec<f64>, AnalysisError> {
    ensure_same_len(raw, clean)?;
    Ok(raw.iter().zip(clean).map(|(r, c)| r - c).collect())
}

/// Pair an already filtered signal with its residual.
pub fn split(raw: &[f64], clean: Vec<f64>) -> Result<Decomposition, AnalysisError> {
    let noise = decompose(raw, &clean)?;
    Ok(Decomposition { clean, noise })
}

pub(crate) fn ensure_same_len(expected: &[f64], actual: &[f64]) -> Result<(), AnalysisError> {
    if expected.len() != actual.len() {
        return Err(AnalysisError::LengthMismatch {
            expected: expected.len(),
            actual: actual.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::synthetic;

    #[test]
    fn test_noise_is_raw_minus_clean() {
        let noise = decompose(&[1.0, 0.5, -2.0], &[0.75, 0.5, -1.0]).expect("same length");
        assert_eq!(noise, vec![0.25, 0.0, -1.0]);
    }

    #[test]
    fn test_clean_plus_noise_reconstructs_raw() {
        let raw = synthetic::mix(
            &synthetic::sine(440.0, 8_000, 2_048, 0.7),
            &synthetic::white_noise(2_048, 0.1, 7),
        );
        let clean: Vec<f64> = raw.iter().map(|s| s * 0.37 + 0.01).collect();
        let parts = split(&raw, clean).expect("split");
        for ((c, n), r) in parts.clean.iter().zip(&parts.noise).zip(&raw) {
            assert!((c + n - r).abs() <= f64::EPSILON * r.abs().max(1.0) * 4.0);
        }
    }

    #[test]
    fn test_length_mismatch_is_reported() {
        let err = decompose(&[1.0, 2.0, 3.0], &[1.0]).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::LengthMismatch {
                expected: 3,
                actual: 1
            }
        );
    }

    #[test]
    fn test_identical_inputs_leave_no_noise() {
        let raw = [0.1, -0.2, 0.3];
        assert_eq!(decompose(&raw, &raw).expect("same length"), vec![0.0; 3]);
    }
}
