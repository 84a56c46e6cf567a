// Error types for the channel quality analyzer
//
// This module defines the typed failures raised by the DSP pipeline and by
// the audio decoding adapter. Every error carries a stable numeric code so
// the CLI and HTTP adapters can report failures uniformly.

mod analysis;
mod decode;

pub use analysis::{log_analysis_error, AnalysisError, AnalysisErrorCodes};
pub use decode::{DecodeError, DecodeErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the CLI and HTTP boundaries.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
