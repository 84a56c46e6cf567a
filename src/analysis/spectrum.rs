// SpectrumAnalyzer - normalized magnitude spectrum of a whole signal
//
// The full recording is transformed in one FFT (no windowing, no
// averaging) and only the non-redundant half of the bins is kept.
// Resolution reduction for display is left to the presentation layer.

use rustfft::{num_complex::Complex, FftPlanner};

use crate::analysis::types::Spectrum;

/// Added to the peak magnitude before normalizing so silent input divides
/// by a positive number.
pub const NORMALIZATION_EPSILON: f64 = 1e-10;

/// Number of non-redundant bins of a real-input DFT of length `n`.
pub fn bin_count(n: usize) -> usize {
    n / 2 + 1
}

/// Bin centre frequencies `k * sample_rate / n` for `k in 0..=n/2`.
pub fn bin_frequencies(n: usize, sample_rate: u32) -> Vec<f64> {
    let step = f64::from(sample_rate) / n as f64;
    (0..bin_count(n)).map(|k| k as f64 * step).collect()
}

/// Magnitudes of the non-redundant DFT bins of `samples`.
pub fn magnitude_spectrum(samples: &[f64]) -> Vec<f64> {
    let n = samples.len();
    if n == 0 {
        return Vec::new();
    }

    let mut buffer: Vec<Complex<f64>> = samples.iter().map(|&s| Complex::new(s, 0.0)).collect();

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);

    buffer[..bin_count(n)].iter().map(|c| c.norm()).collect()
}

/// Compute the normalized magnitude spectrum of a signal.
///
/// Every magnitude is divided by `max + 1e-10`, so the peak is just under
/// 1.0 and an all-zero signal yields all-zero magnitudes rather than NaN.
pub fn analyze(samples: &[f64], sample_rate: u32) -> Spectrum {
    let magnitudes = magnitude_spectrum(samples);
    let peak = magnitudes.iter().copied().fold(0.0_f64, f64::max);
    let scale = peak + NORMALIZATION_EPSILON;

    log::debug!(
        "[SpectrumAnalyzer] n={} bins={} peak={:.4e}",
        samples.len(),
        magnitudes.len(),
        peak
    );

    Spectrum {
        frequencies_hz: bin_frequencies(samples.len(), sample_rate),
        magnitudes: magnitudes.into_iter().map(|m| m / scale).collect(),
    }
}
