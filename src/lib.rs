// Channel Quality Core - voice-band signal quality analysis
// Band-limits each channel, splits out the residual noise, scores SNR and
// noise floor, and ranks channels against each other.

// Module declarations
pub mod analysis;
pub mod api;
pub mod audio;
pub mod config;
pub mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod testing;

// Re-exports for convenience
pub use analysis::{
    analyze_channel, compare_channels, rank, ChannelAnalyzer, ChannelInput, ChannelResult,
    Comparison, FilterSpec, QualityScore, Signal, Spectrum,
};
pub use config::AppConfig;
pub use error::{AnalysisError, DecodeError, ErrorCode};
