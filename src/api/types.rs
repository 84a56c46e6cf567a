use serde::{Deserialize, Serialize};

/// Chart-ready analysis of one channel
///
/// `error` is always `None` on a successful report; it is kept so clients
/// can test a single field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelReport {
    pub name: String,
    /// SNR in dB, rounded
    pub snr: f64,
    /// Noise floor in dBFS, rounded
    pub floor: f64,
    pub sample_rate: u32,
    /// Seconds, rounded
    pub duration: f64,
    pub waveform: WaveformReport,
    pub fft: FftReport,
    pub error: Option<String>,
}

/// Decimated time-domain traces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveformReport {
    pub time: Vec<f64>,
    pub audio: Vec<f64>,
    pub noise: Vec<f64>,
}

/// Band-limited, decimated magnitude spectrum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FftReport {
    pub freqs: Vec<f64>,
    pub magnitude: Vec<f64>,
}

/// A channel that could not be decoded or analyzed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelErrorReport {
    pub name: String,
    pub error: String,
    pub code: i32,
}

/// Side-by-side comparison of several channels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareReport {
    /// Successful channels, in upload order
    pub channels: Vec<ChannelReport>,
    /// Failed channels, in upload order
    pub errors: Vec<ChannelErrorReport>,
    /// Highest-SNR channel, `None` when every channel failed
    pub best: Option<String>,
}
