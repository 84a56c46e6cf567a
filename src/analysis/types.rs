// Types module - Data structures shared by the analysis pipeline
//
// Signals are immutable once constructed; every other record is produced
// by exactly one pipeline step and handed to the caller by value.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Default low cutoff of the voice band in Hz
pub const DEFAULT_LOW_CUT_HZ: u32 = 300;

/// Default high cutoff of the voice band in Hz
pub const DEFAULT_HIGH_CUT_HZ: u32 = 3400;

/// Default Butterworth prototype order
pub const DEFAULT_FILTER_ORDER: u32 = 4;

/// Mono sample sequence paired with its sample rate
///
/// Invariants: `sample_rate > 0` and at least one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    samples: Vec<f64>,
    sample_rate: u32,
}

impl Signal {
    /// Build a signal, rejecting empty sequences and a zero sample rate.
    pub fn new(samples: Vec<f64>, sample_rate: u32) -> Result<Self, AnalysisError> {
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidSampleRate { sample_rate });
        }
        if samples.is_empty() {
            return Err(AnalysisError::EmptySignal);
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Build a signal from single-precision samples as produced by decoders.
    pub fn from_f32(samples: &[f32], sample_rate: u32) -> Result<Self, AnalysisError> {
        Self::new(samples.iter().map(|&s| f64::from(s)).collect(), sample_rate)
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when the signal holds no samples; never the case for a constructed signal.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }

    /// Sample timestamps in seconds (`i / sample_rate`).
    pub fn time_axis(&self) -> Vec<f64> {
        let rate = f64::from(self.sample_rate);
        (0..self.samples.len()).map(|i| i as f64 / rate).collect()
    }
}

/// Band-limiting parameters supplied by the caller
///
/// Cutoffs are whole Hz. Defaults describe the telephone voice band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    pub low_cut_hz: u32,
    pub high_cut_hz: u32,
    pub order: u32,
}

impl FilterSpec {
    pub fn new(low_cut_hz: u32, high_cut_hz: u32, order: u32) -> Self {
        Self {
            low_cut_hz,
            high_cut_hz,
            order,
        }
    }
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            low_cut_hz: DEFAULT_LOW_CUT_HZ,
            high_cut_hz: DEFAULT_HIGH_CUT_HZ,
            order: DEFAULT_FILTER_ORDER,
        }
    }
}

/// Split of a source signal into its in-band and residual parts
///
/// `clean[i] + noise[i]` reproduces the source because the noise is
/// defined as `source[i] - clean[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    pub clean: Vec<f64>,
    pub noise: Vec<f64>,
}

/// SNR and noise floor of one channel, both in dB
///
/// A channel whose noise power is exactly zero reports the sentinels
/// `snr_db = 0` and `noise_floor_db = -90`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityScore {
    pub snr_db: f64,
    pub noise_floor_db: f64,
}

/// Normalized magnitude spectrum
///
/// Frequencies start at 0 Hz and are strictly increasing; magnitudes are
/// scaled so the largest is (just under) 1.0, or all zero for silence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    pub frequencies_hz: Vec<f64>,
    pub magnitudes: Vec<f64>,
}

impl Spectrum {
    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    /// Frequency of the strongest bin, if any.
    pub fn peak_frequency_hz(&self) -> Option<f64> {
        self.magnitudes
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, &mag)| match best {
                Some((_, best_mag)) if best_mag >= mag => best,
                _ => Some((i, mag)),
            })
            .map(|(i, _)| self.frequencies_hz[i])
    }
}

/// Time-domain traces kept for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waveform {
    pub time: Vec<f64>,
    pub raw: Vec<f64>,
    pub noise: Vec<f64>,
}

/// Complete analysis of one channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelResult {
    pub name: String,
    pub sample_rate: u32,
    pub duration_seconds: f64,
    pub score: QualityScore,
    pub spectrum: Spectrum,
    pub waveform: Waveform,
}

impl ChannelResult {
    pub fn snr_db(&self) -> f64 {
        self.score.snr_db
    }

    pub fn noise_floor_db(&self) -> f64 {
        self.score.noise_floor_db
    }
}

/// Named signal awaiting analysis
#[derive(Debug, Clone)]
pub struct ChannelInput {
    pub name: String,
    pub signal: Signal,
}

impl ChannelInput {
    pub fn new(name: impl Into<String>, signal: Signal) -> Self {
        Self {
            name: name.into(),
            signal,
        }
    }
}
