// Report API - turns analysis results into the JSON payloads served to clients
//
// Full-resolution results are decimated for charting: waveform traces down
// to roughly `waveform_points` samples and the spectrum (cut at
// `spectrum_max_hz`) down to roughly `spectrum_points` bins. Scalars are
// rounded to `decimals` places. Ranking always uses the unrounded scores.

pub mod types;

pub use types::{ChannelErrorReport, ChannelReport, CompareReport, FftReport, WaveformReport};

use std::fmt;

use crate::analysis::{rank, ChannelAnalyzer, ChannelInput, ChannelResult, FilterSpec, Signal};
use crate::audio;
use crate::config::DisplayConfig;
use crate::error::{AnalysisError, DecodeError, ErrorCode};

/// Why a single upload produced no report
#[derive(Debug, Clone, PartialEq)]
pub enum ReportError {
    Decode(DecodeError),
    Analysis(AnalysisError),
}

impl ErrorCode for ReportError {
    fn code(&self) -> i32 {
        match self {
            ReportError::Decode(err) => err.code(),
            ReportError::Analysis(err) => err.code(),
        }
    }

    fn message(&self) -> String {
        match self {
            ReportError::Decode(err) => err.message(),
            ReportError::Analysis(err) => err.message(),
        }
    }
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Decode(err) => err.fmt(f),
            ReportError::Analysis(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReportError::Decode(err) => Some(err),
            ReportError::Analysis(err) => Some(err),
        }
    }
}

impl From<DecodeError> for ReportError {
    fn from(err: DecodeError) -> Self {
        ReportError::Decode(err)
    }
}

impl From<AnalysisError> for ReportError {
    fn from(err: AnalysisError) -> Self {
        ReportError::Analysis(err)
    }
}

/// One named encoded capture, as uploaded or read from disk
///
/// A capture that could not be read keeps its place in a batch and is
/// reported as a failure of that channel.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    contents: Result<Vec<u8>, DecodeError>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            contents: Ok(bytes),
        }
    }

    /// A capture whose bytes could not be obtained.
    pub fn unreadable(name: impl Into<String>, err: DecodeError) -> Self {
        Self {
            name: name.into(),
            contents: Err(err),
        }
    }

    /// Decode into an analysis signal.
    pub fn to_signal(&self) -> Result<Signal, ReportError> {
        let bytes = self.contents.as_ref().map_err(|err| err.clone())?;
        let decoded = audio::decode_bytes(bytes, &self.name)?;
        Ok(decoded.to_signal()?)
    }
}

/// Every `stride`-th element starting at index 0, with
/// `stride = max(1, len / target_points)`.
pub fn decimate(values: &[f64], target_points: usize) -> Vec<f64> {
    let stride = (values.len() / target_points.max(1)).max(1);
    values.iter().step_by(stride).copied().collect()
}

/// Round to `decimals` places using the exact binary value, ties to even.
///
/// `0.125` becomes `0.12` while `0.135` (stored slightly above the tie)
/// becomes `0.14`.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    // Fixed-precision formatting rounds the exact stored value correctly.
    format!("{:.*}", decimals as usize, value)
        .parse()
        .unwrap_or(value)
}

/// Build the chart payload for a successful channel.
pub fn build_report(result: &ChannelResult, display: &DisplayConfig) -> ChannelReport {
    let wave_points = display.waveform_points;
    let waveform = WaveformReport {
        time: decimate(&result.waveform.time, wave_points),
        audio: decimate(&result.waveform.raw, wave_points),
        noise: decimate(&result.waveform.noise, wave_points),
    };

    // Frequencies are ascending, so the display band is a prefix.
    let visible = result
        .spectrum
        .frequencies_hz
        .iter()
        .take_while(|&&f| f <= display.spectrum_max_hz)
        .count();
    let fft = FftReport {
        freqs: decimate(
            &result.spectrum.frequencies_hz[..visible],
            display.spectrum_points,
        ),
        magnitude: decimate(&result.spectrum.magnitudes[..visible], display.spectrum_points),
    };

    ChannelReport {
        name: result.name.clone(),
        snr: round_to(result.snr_db(), display.decimals),
        floor: round_to(result.noise_floor_db(), display.decimals),
        sample_rate: result.sample_rate,
        duration: round_to(result.duration_seconds, display.decimals),
        waveform,
        fft,
        error: None,
    }
}

/// Decode and analyze one upload, returning the unreduced result.
pub fn analyze_upload(upload: &Upload, filter: &FilterSpec) -> Result<ChannelResult, ReportError> {
    let signal = upload.to_signal()?;
    Ok(ChannelAnalyzer::new(*filter).analyze(&upload.name, &signal)?)
}

/// Decode, analyze and render one upload.
pub fn report_upload(
    upload: &Upload,
    filter: &FilterSpec,
    display: &DisplayConfig,
) -> Result<ChannelReport, ReportError> {
    analyze_upload(upload, filter).map(|result| build_report(&result, display))
}

/// Decode every upload, analyze the decodable ones in parallel and rank them.
///
/// Failures are reported per channel and never abort the comparison.
pub fn compare_uploads(
    uploads: &[Upload],
    filter: &FilterSpec,
    display: &DisplayConfig,
) -> CompareReport {
    let mut slots: Vec<Option<Result<ChannelResult, ReportError>>> = Vec::new();
    let mut inputs = Vec::new();
    for upload in uploads {
        match upload.to_signal() {
            Ok(signal) => {
                inputs.push(ChannelInput::new(upload.name.clone(), signal));
                slots.push(None);
            }
            Err(err) => {
                log::warn!("[Report] {}: {}", upload.name, err);
                slots.push(Some(Err(err)));
            }
        }
    }

    let mut analyzed = ChannelAnalyzer::new(*filter).analyze_all(&inputs).into_iter();
    let outcomes: Vec<Result<ChannelResult, ReportError>> = slots
        .into_iter()
        .filter_map(|slot| match slot {
            Some(failed) => Some(failed),
            None => analyzed.next().map(|r| r.map_err(ReportError::from)),
        })
        .collect();

    let best = rank(
        outcomes
            .iter()
            .filter_map(|o| o.as_ref().ok())
            .map(|r| (r.name.as_str(), &r.score)),
    )
    .ok()
    .map(str::to_string);

    let mut channels = Vec::new();
    let mut errors = Vec::new();
    for (upload, outcome) in uploads.iter().zip(outcomes) {
        match outcome {
            Ok(result) => channels.push(build_report(&result, display)),
            Err(err) => errors.push(ChannelErrorReport {
                name: upload.name.clone(),
                error: err.message(),
                code: err.code(),
            }),
        }
    }

    CompareReport {
        channels,
        errors,
        best,
    }
}
