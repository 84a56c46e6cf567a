// Decode error types and constants

use crate::error::ErrorCode;
use std::fmt;

/// Decode error code constants
///
/// Error code range: 4001-4004
pub struct DecodeErrorCodes {}

impl DecodeErrorCodes {
    /// Reading the source failed
    pub const IO: i32 = 4001;

    /// Container or codec is not supported
    pub const UNSUPPORTED: i32 = 4002;

    /// Source data is corrupt or truncated
    pub const MALFORMED: i32 = 4003;

    /// Source decoded to zero samples
    pub const EMPTY: i32 = 4004;
}

/// Errors raised while turning encoded audio into mono samples
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// Underlying read failed
    Io { details: String },

    /// Format or codec not recognised
    Unsupported { reason: String },

    /// Data could not be parsed
    Malformed { reason: String },

    /// Nothing to analyze
    Empty,
}

impl ErrorCode for DecodeError {
    fn code(&self) -> i32 {
        match self {
            DecodeError::Io { .. } => DecodeErrorCodes::IO,
            DecodeError::Unsupported { .. } => DecodeErrorCodes::UNSUPPORTED,
            DecodeError::Malformed { .. } => DecodeErrorCodes::MALFORMED,
            DecodeError::Empty => DecodeErrorCodes::EMPTY,
        }
    }

    fn message(&self) -> String {
        match self {
            DecodeError::Io { details } => format!("I/O error: {}", details),
            DecodeError::Unsupported { reason } => format!("Unsupported audio: {}", reason),
            DecodeError::Malformed { reason } => format!("Malformed audio: {}", reason),
            DecodeError::Empty => "Audio contains no samples".to_string(),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DecodeError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for DecodeError {}

impl From<std::io::Error> for DecodeError {
    fn from(err: std::io::Error) -> Self {
        DecodeError::Io {
            details: err.to_string(),
        }
    }
}

impl From<hound::Error> for DecodeError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(io) => io.into(),
            hound::Error::Unsupported => DecodeError::Unsupported {
                reason: "WAV sample format".to_string(),
            },
            other => DecodeError::Malformed {
                reason: other.to_string(),
            },
        }
    }
}

impl From<symphonia::core::errors::Error> for DecodeError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        use symphonia::core::errors::Error as SymphoniaError;
        match err {
            SymphoniaError::IoError(io) => io.into(),
            SymphoniaError::Unsupported(what) => DecodeError::Unsupported {
                reason: what.to_string(),
            },
            other => DecodeError::Malformed {
                reason: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_codes() {
        assert_eq!(
            DecodeError::Io {
                details: "x".to_string()
            }
            .code(),
            DecodeErrorCodes::IO
        );
        assert_eq!(
            DecodeError::Unsupported {
                reason: "x".to_string()
            }
            .code(),
            4002
        );
        assert_eq!(
            DecodeError::Malformed {
                reason: "x".to_string()
            }
            .code(),
            4003
        );
        assert_eq!(DecodeError::Empty.code(), 4004);
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::other("disk gone");
        match DecodeError::from(io_err) {
            DecodeError::Io { details } => assert!(details.contains("disk gone")),
            other => panic!("Expected Io, got {:?}", other),
        }
    }

    #[test]
    fn test_display_includes_code() {
        let display = format!("{}", DecodeError::Empty);
        assert!(display.contains("4004"));
    }
}
