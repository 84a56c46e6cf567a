// BandpassFilter - zero-phase Butterworth band-limiting
//
// The residual noise of a channel is computed by subtracting the filtered
// signal from the raw one sample by sample, so the filter must not shift
// the signal in time. Filtering therefore runs forward and backward over
// a cascade of second-order sections.
//
// Module organization:
// - design: analog prototype -> digital second-order sections
// - sos: biquad cascade, seeded single pass and forward-backward pass
// - mod.rs: parameter validation and the public `apply` entry point

mod design;
mod sos;

pub use design::{butterworth_bandpass, butterworth_lowpass};
pub use sos::{Biquad, SosFilter};

use crate::analysis::types::FilterSpec;
use crate::error::AnalysisError;

/// Band edges as fractions of the Nyquist frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedBand {
    pub low: f64,
    pub high: f64,
    /// High cutoff actually used, in Hz, after clamping below Nyquist
    pub effective_high_hz: f64,
}

impl NormalizedBand {
    /// Validate a filter spec against a sample rate.
    ///
    /// A high cutoff at or above Nyquist is clamped to `Nyquist - 1` Hz
    /// before anything else is checked.
    pub fn resolve(sample_rate: u32, spec: &FilterSpec) -> Result<Self, AnalysisError> {
        if sample_rate == 0 {
            return Err(invalid("sample rate must be greater than 0"));
        }
        if spec.order < 1 {
            return Err(invalid("order must be at least 1"));
        }

        let nyquist = f64::from(sample_rate) / 2.0;
        let low = f64::from(spec.low_cut_hz);
        let mut high = f64::from(spec.high_cut_hz);
        if high >= nyquist {
            log::debug!(
                "[BandpassFilter] clamping high cutoff {} Hz to {} Hz (Nyquist {} Hz)",
                high,
                nyquist - 1.0,
                nyquist
            );
            high = nyquist - 1.0;
        }

        if high <= 0.0 {
            return Err(invalid(format!(
                "sample rate {} Hz leaves no band below Nyquist",
                sample_rate
            )));
        }
        if low >= high {
            return Err(invalid(format!(
                "low cutoff {} Hz must be below high cutoff {} Hz",
                low, high
            )));
        }

        Ok(Self {
            low: low / nyquist,
            high: high / nyquist,
            effective_high_hz: high,
        })
    }
}

fn invalid(reason: impl Into<String>) -> AnalysisError {
    AnalysisError::InvalidFilterSpec {
        reason: reason.into(),
    }
}

/// Design the Butterworth filter described by `spec` at `sample_rate`.
///
/// A low cutoff of 0 Hz degenerates to a low-pass of the same order.
pub fn design(sample_rate: u32, spec: &FilterSpec) -> Result<SosFilter, AnalysisError> {
    let band = NormalizedBand::resolve(sample_rate, spec)?;
    let order = spec.order as usize;
    let filter = if band.low > 0.0 {
        butterworth_bandpass(order, band.low, band.high)
    } else {
        butterworth_lowpass(order, band.high)
    };
    Ok(filter)
}

/// Band-limit `samples` with a zero-phase Butterworth filter.
///
/// The output has the same length as the input and is not renormalized.
/// Fails with `InvalidFilterSpec` before any design work when the spec
/// cannot describe a band below Nyquist.
pub fn apply(
    samples: &[f64],
    sample_rate: u32,
    spec: &FilterSpec,
) -> Result<Vec<f64>, AnalysisError> {
    let filter = design(sample_rate, spec)?;
    Ok(filter.filtfilt(samples))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing::synthetic;

    fn power(samples: &[f64]) -> f64 {
        samples.iter().map(|s| s * s).sum::<f64>() / samples.len() as f64
    }

    #[test]
    fn test_inverted_band_is_rejected() {
        let spec = FilterSpec::new(500, 300, 4);
        let err = apply(&[0.0; 64], 16_000, &spec).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidFilterSpec { .. }));
    }

    #[test]
    fn test_equal_cutoffs_are_rejected() {
        let spec = FilterSpec::new(1000, 1000, 4);
        assert!(NormalizedBand::resolve(16_000, &spec).is_err());
    }

    #[test]
    fn test_zero_order_is_rejected() {
        let spec = FilterSpec::new(300, 3400, 0);
        let err = NormalizedBand::resolve(16_000, &spec).unwrap_err();
        assert!(err.message().contains("order"));
    }

    #[test]
    fn test_high_orders_keep_passband_power() {
        let tone = synthetic::sine(1000.0, 16_000, 16_000, 0.8);
        for order in [32, 33, 40] {
            let spec = FilterSpec::new(300, 3400, order);
            let filtered = apply(&tone, 16_000, &spec).expect("high order filter");
            let ratio = power(&filtered) / power(&tone);
            assert!((ratio - 1.0).abs() < 0.03, "order {order}: power ratio {ratio}");
        }
    }

    #[test]
    fn test_zero_sample_rate_is_rejected() {
        let err = apply(&[1.0], 0, &FilterSpec::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidFilterSpec { .. }));
    }

    #[test]
    fn test_high_cutoff_at_nyquist_is_clamped() {
        let spec = FilterSpec::new(300, 8000, 4);
        let band = NormalizedBand::resolve(16_000, &spec).expect("clamped band");
        assert_eq!(band.effective_high_hz, 7999.0);
        assert!(band.high < 1.0);
        assert!(apply(&[0.0; 256], 16_000, &spec).is_ok());
    }

    #[test]
    fn test_high_cutoff_above_nyquist_is_clamped() {
        let spec = FilterSpec::new(300, 10_000, 4);
        let band = NormalizedBand::resolve(8_000, &spec).expect("clamped band");
        assert_eq!(band.effective_high_hz, 3999.0);
    }

    #[test]
    fn test_clamp_that_crosses_low_cutoff_is_rejected() {
        // Nyquist 2000 Hz -> high clamps to 1999 Hz, below the 2500 Hz low edge.
        let spec = FilterSpec::new(2500, 3400, 4);
        assert!(NormalizedBand::resolve(4_000, &spec).is_err());
    }

    #[test]
    fn test_output_length_matches_input() {
        for len in [1usize, 2, 5, 26, 27, 100, 1000] {
            let input = synthetic::sine(1000.0, 16_000, len, 0.5);
            let output = apply(&input, 16_000, &FilterSpec::default()).expect("filter");
            assert_eq!(output.len(), len);
        }
    }

    #[test]
    fn test_in_band_tone_keeps_its_power() {
        let tone = synthetic::sine(1000.0, 16_000, 16_000, 0.8);
        let filtered = apply(&tone, 16_000, &FilterSpec::default()).expect("filter");
        let ratio = power(&filtered) / power(&tone);
        assert!((ratio - 1.0).abs() < 0.03, "power ratio {ratio}");
    }

    #[test]
    fn test_out_of_band_tone_is_removed() {
        let hum = synthetic::sine(50.0, 16_000, 16_000, 0.8);
        let filtered = apply(&hum, 16_000, &FilterSpec::default()).expect("filter");
        let ratio = power(&filtered) / power(&hum);
        assert!(ratio < 5e-3, "power ratio {ratio}");
    }

    #[test]
    fn test_filter_introduces_no_time_shift() {
        let tone = synthetic::sine(1000.0, 16_000, 4_000, 1.0);
        let filtered = apply(&tone, 16_000, &FilterSpec::default()).expect("filter");
        // Away from the edges the output tracks the input sample for sample.
        for i in 1_000..3_000 {
            assert!(
                (filtered[i] - tone[i]).abs() < 0.02,
                "sample {i}: {} vs {}",
                filtered[i],
                tone[i]
            );
        }
    }

    #[test]
    fn test_zero_low_cutoff_uses_lowpass() {
        let spec = FilterSpec::new(0, 3400, 4);
        let filter = design(16_000, &spec).expect("lowpass");
        assert_eq!(filter.order(), 4);
        let dc = vec![0.5; 512];
        let out = filter.filtfilt(&dc);
        assert!((out[256] - 0.5).abs() < 1e-9);
    }
}
