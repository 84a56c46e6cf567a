//! Deterministic synthetic signals for tests and demo captures.
//!
//! Noise comes from a seeded `StdRng`, so a given seed always produces the
//! same samples.

use std::path::Path;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::error::DecodeError;

/// `len` samples of `amplitude * sin(2*pi*freq*t)`.
pub fn sine(frequency_hz: f64, sample_rate: u32, len: usize, amplitude: f64) -> Vec<f64> {
    let rate = f64::from(sample_rate);
    (0..len)
        .map(|i| {
            let t = i as f64 / rate;
            amplitude * (2.0 * std::f64::consts::PI * frequency_hz * t).sin()
        })
        .collect()
}

/// Uniform white noise in `[-amplitude, amplitude)`.
pub fn white_noise(len: usize, amplitude: f64, seed: u64) -> Vec<f64> {
    if amplitude <= 0.0 {
        return vec![0.0; len];
    }
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|_| rng.gen_range(-amplitude..amplitude))
        .collect()
}

/// Sample-wise sum; the result has the length of the shorter input.
pub fn mix(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x + y).collect()
}

/// Sine tone plus white noise, the typical test capture.
pub fn noisy_tone(
    frequency_hz: f64,
    sample_rate: u32,
    len: usize,
    amplitude: f64,
    noise_amplitude: f64,
    seed: u64,
) -> Vec<f64> {
    mix(
        &sine(frequency_hz, sample_rate, len, amplitude),
        &white_noise(len, noise_amplitude, seed),
    )
}

fn float_wav_spec(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    }
}

/// Write mono 32-bit float WAV.
pub fn write_wav(path: &Path, samples: &[f64], sample_rate: u32) -> Result<(), DecodeError> {
    let mut writer = hound::WavWriter::create(path, float_wav_spec(sample_rate))?;
    for &sample in samples {
        writer.write_sample(sample as f32)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Encode mono 32-bit float WAV into memory.
pub fn encode_wav(samples: &[f64], sample_rate: u32) -> Result<Vec<u8>, DecodeError> {
    let mut bytes = Vec::new();
    {
        let cursor = std::io::Cursor::new(&mut bytes);
        let mut writer = hound::WavWriter::new(cursor, float_wav_spec(sample_rate))?;
        for &sample in samples {
            writer.write_sample(sample as f32)?;
        }
        writer.finalize()?;
    }
    Ok(bytes)
}
