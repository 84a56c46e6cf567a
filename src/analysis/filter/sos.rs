// Second-order sections and zero-phase application
//
// Filters are kept as a cascade of biquads rather than a single high-order
// polynomial; an eighth-order voice-band filter at 300 Hz / 48 kHz is not
// representable accurately in transfer-function form.

use rustfft::num_complex::Complex64;
use std::f64::consts::PI;

/// A single biquad (second-order section).
///
/// Transfer function: H(z) = (b0 + b1*z^-1 + b2*z^-2) / (1 + a1*z^-1 + a2*z^-2)
///
/// Runs in Direct Form II Transposed. The section holds coefficients only;
/// state lives in the caller so one filter can be shared across threads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    /// Numerator coefficients [b0, b1, b2]
    b: [f64; 3],
    /// Denominator coefficients [a1, a2] (a0 is normalized to 1)
    a: [f64; 2],
}

impl Biquad {
    pub fn new(b: [f64; 3], a: [f64; 2]) -> Self {
        Self { b, a }
    }

    pub fn numerator(&self) -> &[f64; 3] {
        &self.b
    }

    pub fn denominator(&self) -> &[f64; 2] {
        &self.a
    }

    /// Scale the numerator, used to fold the overall gain into a section.
    pub(crate) fn scaled(self, gain: f64) -> Self {
        Self {
            b: [self.b[0] * gain, self.b[1] * gain, self.b[2] * gain],
            a: self.a,
        }
    }

    /// Check if this biquad is stable (poles inside unit circle).
    pub fn is_stable(&self) -> bool {
        self.a[1].abs() < 1.0 && self.a[0].abs() < 1.0 + self.a[1]
    }

    /// Gain at DC, i.e. H(1).
    pub fn dc_gain(&self) -> f64 {
        (self.b[0] + self.b[1] + self.b[2]) / (1.0 + self.a[0] + self.a[1])
    }

    /// State reached after an infinitely long unit-step input.
    ///
    /// Seeding the section with this state (times the first sample) removes
    /// the start-up transient.
    pub fn step_state(&self) -> [f64; 2] {
        let gain = self.dc_gain();
        let s1 = self.b[2] - self.a[1] * gain;
        let s0 = self.b[1] - self.a[0] * gain + s1;
        [s0, s1]
    }

    /// Filter `data` in place starting from `state`.
    pub fn run(&self, data: &mut [f64], state: [f64; 2]) {
        let [mut s0, mut s1] = state;
        for sample in data.iter_mut() {
            let input = *sample;
            let output = self.b[0] * input + s0;
            s0 = self.b[1] * input - self.a[0] * output + s1;
            s1 = self.b[2] * input - self.a[1] * output;
            *sample = output;
        }
    }

    fn response(&self, z_inv: Complex64) -> Complex64 {
        let z_inv2 = z_inv * z_inv;
        let num = self.b[0] + z_inv * self.b[1] + z_inv2 * self.b[2];
        let den = 1.0 + z_inv * self.a[0] + z_inv2 * self.a[1];
        num / den
    }
}

/// Cascade of biquads implementing one IIR filter.
#[derive(Debug, Clone, PartialEq)]
pub struct SosFilter {
    sections: Vec<Biquad>,
    order: usize,
}

impl SosFilter {
    /// `order` is the order of the full transfer function (number of poles).
    pub fn new(sections: Vec<Biquad>, order: usize) -> Self {
        Self { sections, order }
    }

    pub fn sections(&self) -> &[Biquad] {
        &self.sections
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn is_stable(&self) -> bool {
        self.sections.iter().all(Biquad::is_stable)
    }

    /// Edge padding used by [`SosFilter::filtfilt`]: three times the
    /// length of the equivalent transfer-function denominator.
    pub fn pad_len(&self) -> usize {
        3 * (self.order + 1)
    }

    /// Magnitude response at a normalized frequency (1.0 = Nyquist).
    pub fn magnitude_at(&self, normalized_freq: f64) -> f64 {
        let z_inv = Complex64::from_polar(1.0, -PI * normalized_freq);
        self.sections
            .iter()
            .fold(Complex64::new(1.0, 0.0), |acc, s| acc * s.response(z_inv))
            .norm()
    }

    /// Single causal pass with steady-state initial conditions scaled by
    /// the first sample.
    pub fn run_seeded(&self, data: &mut [f64]) {
        let Some(&first) = data.first() else {
            return;
        };
        let mut level = first;
        for section in &self.sections {
            let [s0, s1] = section.step_state();
            section.run(data, [s0 * level, s1 * level]);
            level *= section.dc_gain();
        }
    }

    /// Zero-phase filtering: forward pass, then a pass over the reversed
    /// output, on a signal padded at both ends by odd reflection.
    ///
    /// The output has the input's length and no time shift. Padding is
    /// clamped to `len - 1` for very short inputs.
    pub fn filtfilt(&self, input: &[f64]) -> Vec<f64> {
        if input.is_empty() {
            return Vec::new();
        }
        let pad = self.pad_len().min(input.len() - 1);
        let mut ext = odd_extend(input, pad);

        self.run_seeded(&mut ext);
        ext.reverse();
        self.run_seeded(&mut ext);
        ext.reverse();

        ext.drain(..pad);
        ext.truncate(input.len());
        ext
    }
}

/// Extend `x` by `pad` samples on each side, reflecting through the end
/// points (`2*x[0] - x[i]` on the left, `2*x[n-1] - x[n-1-i]` on the right).
fn odd_extend(x: &[f64], pad: usize) -> Vec<f64> {
    let n = x.len();
    let first = x[0];
    let last = x[n - 1];

    let mut ext = Vec::with_capacity(n + 2 * pad);
    ext.extend((1..=pad).rev().map(|i| 2.0 * first - x[i]));
    ext.extend_from_slice(x);
    ext.extend((1..=pad).map(|i| 2.0 * last - x[n - 1 - i]));
    ext
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_pole_smoother() -> Biquad {
        // y = 0.5*x + 0.5*y[-1]
        Biquad::new([0.5, 0.0, 0.0], [-0.5, 0.0])
    }

    #[test]
    fn test_odd_extend_reflects_through_end_points() {
        let ext = odd_extend(&[1.0, 2.0, 4.0, 7.0], 2);
        assert_eq!(ext, vec![-2.0, 0.0, 1.0, 2.0, 4.0, 7.0, 10.0, 12.0]);
    }

    #[test]
    fn test_odd_extend_without_padding() {
        assert_eq!(odd_extend(&[3.0], 0), vec![3.0]);
    }

    #[test]
    fn test_step_state_removes_transient() {
        let section = one_pole_smoother();
        let filter = SosFilter::new(vec![section], 1);
        let mut data = vec![2.0; 16];
        filter.run_seeded(&mut data);
        for value in data {
            assert!((value - 2.0).abs() < 1e-12, "value {value}");
        }
    }

    #[test]
    fn test_stability_check() {
        assert!(one_pole_smoother().is_stable());
        assert!(!Biquad::new([1.0, 0.0, 0.0], [0.0, 1.5]).is_stable());
    }

    #[test]
    fn test_filtfilt_preserves_length_and_constant_input() {
        let filter = SosFilter::new(vec![one_pole_smoother()], 1);
        let input = vec![0.25; 37];
        let output = filter.filtfilt(&input);
        assert_eq!(output.len(), input.len());
        for value in output {
            assert!((value - 0.25).abs() < 1e-12);
        }
    }

    #[test]
    fn test_filtfilt_short_input_clamps_padding() {
        let filter = SosFilter::new(vec![one_pole_smoother()], 1);
        assert_eq!(filter.filtfilt(&[1.5]), vec![1.5]);
        assert_eq!(filter.filtfilt(&[1.0, 1.0]).len(), 2);
        assert!(filter.filtfilt(&[]).is_empty());
    }

    #[test]
    fn test_filtfilt_is_symmetric_for_symmetric_input() {
        // Zero phase: a symmetric impulse stays centered.
        let filter = SosFilter::new(vec![one_pole_smoother()], 1);
        let mut input = vec![0.0; 81];
        input[40] = 1.0;
        let output = filter.filtfilt(&input);
        for i in 0..20 {
            assert!(
                (output[40 - i] - output[40 + i]).abs() < 1e-9,
                "asymmetry at offset {i}"
            );
        }
        let peak = output
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i);
        assert_eq!(peak, Some(40));
    }

    #[test]
    fn test_magnitude_at_dc_matches_dc_gain() {
        let filter = SosFilter::new(vec![one_pole_smoother()], 1);
        assert!((filter.magnitude_at(0.0) - 1.0).abs() < 1e-12);
        // At Nyquist: |0.5 / (1 + 0.5)| = 1/3
        assert!((filter.magnitude_at(1.0) - 1.0 / 3.0).abs() < 1e-12);
    }
}
