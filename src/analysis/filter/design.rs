// Butterworth design via the analog prototype
//
// Pipeline: prototype poles on the unit circle -> frequency transform
// (low-pass or low-pass-to-band-pass) -> bilinear transform -> pairing of
// poles and zeros into second-order sections.

use rustfft::num_complex::Complex64;
use std::f64::consts::PI;

use super::sos::{Biquad, SosFilter};

/// Sample rate used for the bilinear transform of normalized edges.
const BILINEAR_FS: f64 = 2.0;

/// Poles with a smaller imaginary part are treated as real.
const REAL_POLE_TOLERANCE: f64 = 1e-12;

/// Calculate Butterworth analog prototype poles (cutoff 1 rad/s).
pub(crate) fn butterworth_poles(order: usize) -> Vec<Complex64> {
    let n = order as f64;
    (0..order)
        .map(|k| {
            let m = -n + 1.0 + 2.0 * k as f64;
            -Complex64::from_polar(1.0, PI * m / (2.0 * n))
        })
        .collect()
}

/// Pre-warp a normalized frequency (1.0 = Nyquist) for the bilinear transform.
fn prewarp(normalized: f64) -> f64 {
    2.0 * BILINEAR_FS * (PI * normalized / BILINEAR_FS).tan()
}

/// Design a digital Butterworth band-pass with edges given as fractions of
/// Nyquist. The resulting filter has `2 * order` poles.
pub fn butterworth_bandpass(order: usize, low: f64, high: f64) -> SosFilter {
    let warped_low = prewarp(low);
    let warped_high = prewarp(high);
    let bandwidth = warped_high - warped_low;
    let center_sq = warped_low * warped_high;

    let mut analog_poles = Vec::with_capacity(2 * order);
    for pole in butterworth_poles(order) {
        let scaled = pole * (bandwidth / 2.0);
        let offset = (scaled * scaled - center_sq).sqrt();
        analog_poles.push(scaled + offset);
        analog_poles.push(scaled - offset);
    }
    // `order` analog zeros at the origin, gain bandwidth^order.
    let analog_gain = bandwidth.powi(order as i32);

    let fs2 = 2.0 * BILINEAR_FS;
    let (digital_poles, pole_product) = bilinear_poles(&analog_poles);
    let zero_product = Complex64::new(fs2.powi(order as i32), 0.0);
    let gain = analog_gain * (zero_product / pole_product).re;

    // Origin zeros map to z = +1, the excess degree lands on z = -1.
    // Interleave so every section gets one of each.
    let zeros: Vec<f64> = (0..2 * order)
        .map(|i| if i % 2 == 0 { 1.0 } else { -1.0 })
        .collect();

    log::debug!(
        "[BandpassFilter] designed order={} band=({:.5}, {:.5}) gain={:.3e}",
        order,
        low,
        high,
        gain
    );

    SosFilter::new(pair_sections(&zeros, &digital_poles, gain), 2 * order)
}

/// Design a digital Butterworth low-pass with cutoff as a fraction of Nyquist.
///
/// Used when the lower band edge sits at DC.
pub fn butterworth_lowpass(order: usize, cutoff: f64) -> SosFilter {
    let warped = prewarp(cutoff);
    let analog_poles: Vec<Complex64> = butterworth_poles(order)
        .into_iter()
        .map(|p| p * warped)
        .collect();
    let analog_gain = warped.powi(order as i32);

    let (digital_poles, pole_product) = bilinear_poles(&analog_poles);
    let gain = analog_gain * (Complex64::new(1.0, 0.0) / pole_product).re;
    let zeros = vec![-1.0; order];

    SosFilter::new(pair_sections(&zeros, &digital_poles, gain), order)
}

/// Map analog poles to the z-plane, also returning `prod(fs2 - p)`.
fn bilinear_poles(poles: &[Complex64]) -> (Vec<Complex64>, Complex64) {
    let fs2 = 2.0 * BILINEAR_FS;
    let mut product = Complex64::new(1.0, 0.0);
    let mapped = poles
        .iter()
        .map(|&p| {
            product *= fs2 - p;
            (fs2 + p) / (fs2 - p)
        })
        .collect();
    (mapped, product)
}

enum PoleGroup {
    Conjugate(Complex64),
    RealPair(f64, f64),
    Single(f64),
}

impl PoleGroup {
    fn len(&self) -> usize {
        match self {
            PoleGroup::Single(_) => 1,
            _ => 2,
        }
    }

    fn denominator(&self) -> [f64; 2] {
        match *self {
            PoleGroup::Conjugate(p) => [-2.0 * p.re, p.norm_sqr()],
            PoleGroup::RealPair(p1, p2) => [-(p1 + p2), p1 * p2],
            PoleGroup::Single(p) => [-p, 0.0],
        }
    }
}

/// Group poles into conjugate pairs (closest to the unit circle last) and
/// give each group as many real zeros as it has poles. The overall gain is
/// folded into the first section.
fn pair_sections(zeros: &[f64], poles: &[Complex64], gain: f64) -> Vec<Biquad> {
    let mut conjugates: Vec<Complex64> = poles
        .iter()
        .filter(|p| p.im > REAL_POLE_TOLERANCE)
        .copied()
        .collect();
    conjugates.sort_by(|a, b| a.norm().total_cmp(&b.norm()));

    let mut reals: Vec<f64> = poles
        .iter()
        .filter(|p| p.im.abs() <= REAL_POLE_TOLERANCE)
        .map(|p| p.re)
        .collect();
    reals.sort_by(|a, b| a.abs().total_cmp(&b.abs()));

    let mut groups: Vec<PoleGroup> = reals
        .chunks(2)
        .map(|chunk| match chunk {
            [p1, p2] => PoleGroup::RealPair(*p1, *p2),
            [p] => PoleGroup::Single(*p),
            _ => unreachable!("chunks(2) yields one or two poles"),
        })
        .collect();
    groups.extend(conjugates.into_iter().map(PoleGroup::Conjugate));

    let mut zeros = zeros.iter().copied();
    groups
        .iter()
        .enumerate()
        .map(|(index, group)| {
            let numerator = match group.len() {
                1 => match zeros.next() {
                    Some(z) => [1.0, -z, 0.0],
                    None => [1.0, 0.0, 0.0],
                },
                _ => match (zeros.next(), zeros.next()) {
                    (Some(z1), Some(z2)) => [1.0, -(z1 + z2), z1 * z2],
                    (Some(z), None) => [1.0, -z, 0.0],
                    _ => [1.0, 0.0, 0.0],
                },
            };
            let section = Biquad::new(numerator, group.denominator());
            if index == 0 {
                section.scaled(gain)
            } else {
                section
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HALF_POWER: f64 = std::f64::consts::FRAC_1_SQRT_2;

    #[test]
    fn test_prototype_poles_lie_on_left_unit_circle() {
        for order in 1..=8 {
            let poles = butterworth_poles(order);
            assert_eq!(poles.len(), order);
            for p in poles {
                assert!((p.norm() - 1.0).abs() < 1e-12);
                assert!(p.re < 0.0);
            }
        }
    }

    #[test]
    fn test_bandpass_section_count_and_stability() {
        for order in 1..=10 {
            let filter = butterworth_bandpass(order, 300.0 / 8000.0, 3400.0 / 8000.0);
            assert_eq!(filter.sections().len(), order);
            assert_eq!(filter.order(), 2 * order);
            assert!(filter.is_stable(), "order {order} unstable");
        }
    }

    #[test]
    fn test_bandpass_half_power_at_edges() {
        let (low, high) = (300.0 / 8000.0, 3400.0 / 8000.0);
        let filter = butterworth_bandpass(4, low, high);
        assert!((filter.magnitude_at(low) - HALF_POWER).abs() < 1e-6);
        assert!((filter.magnitude_at(high) - HALF_POWER).abs() < 1e-6);
    }

    #[test]
    fn test_bandpass_unity_gain_in_band_and_rejection_outside() {
        let filter = butterworth_bandpass(4, 300.0 / 8000.0, 3400.0 / 8000.0);
        let center = filter.magnitude_at(1000.0 / 8000.0);
        assert!((center - 1.0).abs() < 1e-3, "center gain {center}");
        assert!(filter.magnitude_at(0.0) < 1e-9);
        assert!(filter.magnitude_at(1.0) < 1e-9);
        assert!(filter.magnitude_at(50.0 / 8000.0) < 1e-3);
        assert!(filter.magnitude_at(7000.0 / 8000.0) < 1e-3);
    }

    #[test]
    fn test_odd_order_bandpass_is_well_formed() {
        let filter = butterworth_bandpass(3, 0.1, 0.4);
        assert_eq!(filter.sections().len(), 3);
        assert!((filter.magnitude_at(0.1) - HALF_POWER).abs() < 1e-6);
        assert!((filter.magnitude_at(0.4) - HALF_POWER).abs() < 1e-6);
    }

    #[test]
    fn test_lowpass_design() {
        for order in 1..=6 {
            let filter = butterworth_lowpass(order, 0.25);
            assert_eq!(filter.sections().len(), order.div_ceil(2));
            assert!(filter.is_stable());
            assert!((filter.magnitude_at(0.0) - 1.0).abs() < 1e-9);
            assert!((filter.magnitude_at(0.25) - HALF_POWER).abs() < 1e-6);
            assert!(filter.magnitude_at(1.0) < 1e-9);
        }
    }
}
