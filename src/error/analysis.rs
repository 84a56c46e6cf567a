// Analysis error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Analysis error code constants
///
/// Error code range: 3001-3006
pub struct AnalysisErrorCodes {}

impl AnalysisErrorCodes {
    /// Cutoff/order/sample-rate combination cannot produce a valid filter
    pub const INVALID_FILTER_SPEC: i32 = 3001;

    /// Two paired sample sequences differ in length
    pub const LENGTH_MISMATCH: i32 = 3002;

    /// Ranking was asked to pick from zero channels
    pub const EMPTY_INPUT: i32 = 3003;

    /// Signal contains no samples
    pub const EMPTY_SIGNAL: i32 = 3004;

    /// Sample rate is zero
    pub const INVALID_SAMPLE_RATE: i32 = 3005;

    /// A sub-step failed while analyzing a named channel
    pub const CHANNEL_FAILURE: i32 = 3006;
}

/// Log an analysis error with structured context
///
/// Logs the numeric code, the failing component and the message. Channel
/// failures are logged with the channel name attached.
pub fn log_analysis_error(err: &AnalysisError, context: &str) {
    error!(
        "Analysis error in {}: code={}, component=AnalysisPipeline, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Analysis-related errors
///
/// Every core DSP step reports failures through this enum. The pipeline
/// wraps sub-step failures in [`AnalysisError::ChannelFailure`] so that a
/// caller analyzing several channels can attribute each failure.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Bad cutoff/order/sample-rate combination
    InvalidFilterSpec { reason: String },

    /// Paired sequences have different lengths
    LengthMismatch { expected: usize, actual: usize },

    /// No channels to rank
    EmptyInput,

    /// Signal has no samples
    EmptySignal,

    /// Sample rate must be positive
    InvalidSampleRate { sample_rate: u32 },

    /// Failure of one sub-step, tagged with the channel it belongs to
    ChannelFailure {
        channel: String,
        source: Box<AnalysisError>,
    },
}

impl AnalysisError {
    /// Wrap this error with the name of the channel being analyzed.
    ///
    /// An error that already carries a channel tag is returned unchanged.
    pub fn for_channel(self, channel: &str) -> Self {
        match self {
            tagged @ AnalysisError::ChannelFailure { .. } => tagged,
            other => AnalysisError::ChannelFailure {
                channel: channel.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// Channel name attached to this error, if any.
    pub fn channel(&self) -> Option<&str> {
        match self {
            AnalysisError::ChannelFailure { channel, .. } => Some(channel),
            _ => None,
        }
    }

    /// The underlying failure with any channel tag stripped.
    pub fn root(&self) -> &AnalysisError {
        match self {
            AnalysisError::ChannelFailure { source, .. } => source.root(),
            other => other,
        }
    }
}

impl ErrorCode for AnalysisError {
    fn code(&self) -> i32 {
        match self {
            AnalysisError::InvalidFilterSpec { .. } => AnalysisErrorCodes::INVALID_FILTER_SPEC,
            AnalysisError::LengthMismatch { .. } => AnalysisErrorCodes::LENGTH_MISMATCH,
            AnalysisError::EmptyInput => AnalysisErrorCodes::EMPTY_INPUT,
            AnalysisError::EmptySignal => AnalysisErrorCodes::EMPTY_SIGNAL,
            AnalysisError::InvalidSampleRate { .. } => AnalysisErrorCodes::INVALID_SAMPLE_RATE,
            AnalysisError::ChannelFailure { .. } => AnalysisErrorCodes::CHANNEL_FAILURE,
        }
    }

    fn message(&self) -> String {
        match self {
            AnalysisError::InvalidFilterSpec { reason } => {
                format!("Invalid filter spec: {}", reason)
            }
            AnalysisError::LengthMismatch { expected, actual } => {
                format!(
                    "Length mismatch: expected {} samples, got {}",
                    expected, actual
                )
            }
            AnalysisError::EmptyInput => "No channels to rank".to_string(),
            AnalysisError::EmptySignal => "Signal contains no samples".to_string(),
            AnalysisError::InvalidSampleRate { sample_rate } => {
                format!("Sample rate must be greater than 0 (got {})", sample_rate)
            }
            AnalysisError::ChannelFailure { channel, source } => {
                format!("Channel '{}' failed: {}", channel, source.message())
            }
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnalysisError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for AnalysisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnalysisError::ChannelFailure { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
