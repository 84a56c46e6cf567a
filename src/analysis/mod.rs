// Channel analysis pipeline
//
// One channel: raw -> bandpass -> clean, raw - clean -> noise,
// (clean, noise) -> SNR + noise floor, raw -> normalized spectrum.
//
// Module organization:
// - types: Signal, FilterSpec, QualityScore, Spectrum, ChannelResult
// - filter: zero-phase Butterworth band-limiting
// - decompose: residual noise extraction
// - metrics: SNR and noise floor
// - spectrum: FFT magnitude spectrum
// - ranking: best-channel selection
// - mod.rs: ChannelAnalyzer coordinator and multi-channel fan-out
//
// Every step is a pure function of its inputs. Channels share nothing, so
// `analyze_all` runs each one on its own scoped thread.

pub mod decompose;
pub mod filter;
pub mod metrics;
pub mod ranking;
pub mod spectrum;
pub mod types;

pub use ranking::{best_channel, rank};
pub use types::{
    ChannelInput, ChannelResult, Decomposition, FilterSpec, QualityScore, Signal, Spectrum,
    Waveform,
};

use std::thread;

use crate::error::{log_analysis_error, AnalysisError};

/// ChannelAnalyzer runs the full per-channel pipeline with one filter spec
///
/// The analyzer is immutable and `Copy`; share it freely across threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelAnalyzer {
    filter: FilterSpec,
}

impl ChannelAnalyzer {
    pub fn new(filter: FilterSpec) -> Self {
        Self { filter }
    }

    pub fn filter_spec(&self) -> &FilterSpec {
        &self.filter
    }

    /// Filter, decompose and score one channel, and compute its spectrum.
    ///
    /// Any sub-step failure is returned as `ChannelFailure` carrying
    /// `channel` and the original error.
    pub fn analyze(&self, channel: &str, signal: &Signal) -> Result<ChannelResult, AnalysisError> {
        self.run(channel, signal)
            .map_err(|err| err.for_channel(channel))
    }

    fn run(&self, channel: &str, signal: &Signal) -> Result<ChannelResult, AnalysisError> {
        let raw = signal.samples();
        let sample_rate = signal.sample_rate();

        let clean = filter::apply(raw, sample_rate, &self.filter)?;
        let parts = decompose::split(raw, clean)?;
        let score = metrics::score(&parts.clean, &parts.noise)?;
        let spectrum = spectrum::analyze(raw, sample_rate);

        tracing::info!(
            "[ChannelAnalyzer] {}: snr={:.2} dB floor={:.2} dB ({} samples @ {} Hz)",
            channel,
            score.snr_db,
            score.noise_floor_db,
            raw.len(),
            sample_rate
        );

        Ok(ChannelResult {
            name: channel.to_string(),
            sample_rate,
            duration_seconds: signal.duration_seconds(),
            score,
            spectrum,
            waveform: Waveform {
                time: signal.time_axis(),
                raw: raw.to_vec(),
                noise: parts.noise,
            },
        })
    }

    /// Analyze several channels in parallel.
    ///
    /// Returns one outcome per input, in input order. A failing channel
    /// never prevents its siblings from completing. At most
    /// `available_parallelism()` worker threads run at once.
    pub fn analyze_all(&self, inputs: &[ChannelInput]) -> Vec<Result<ChannelResult, AnalysisError>> {
        let workers = worker_count();
        let mut outcomes = Vec::with_capacity(inputs.len());
        for batch in inputs.chunks(workers) {
            outcomes.extend(self.analyze_batch(batch));
        }
        outcomes
    }

    fn analyze_batch(&self, batch: &[ChannelInput]) -> Vec<Result<ChannelResult, AnalysisError>> {
        thread::scope(|scope| {
            let handles: Vec<_> = batch
                .iter()
                .map(|input| scope.spawn(move || self.analyze(&input.name, &input.signal)))
                .collect();

            handles
                .into_iter()
                .map(|handle| {
                    let outcome = handle
                        .join()
                        .unwrap_or_else(|payload| std::panic::resume_unwind(payload));
                    if let Err(err) = &outcome {
                        log_analysis_error(err, "analyze_all");
                    }
                    outcome
                })
                .collect()
        })
    }
}

/// Worker threads per batch in `analyze_all`.
pub fn worker_count() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Run the pipeline for one channel with an explicit filter spec.
pub fn analyze_channel(
    signal: &Signal,
    filter: &FilterSpec,
    channel: &str,
) -> Result<ChannelResult, AnalysisError> {
    ChannelAnalyzer::new(*filter).analyze(channel, signal)
}

/// Outcome of comparing several channels
#[derive(Debug, Clone)]
pub struct Comparison {
    pub outcomes: Vec<Result<ChannelResult, AnalysisError>>,
    /// Highest-SNR successful channel; `EmptyInput` when none succeeded
    pub best: Result<String, AnalysisError>,
}

impl Comparison {
    pub fn successes(&self) -> impl Iterator<Item = &ChannelResult> {
        self.outcomes.iter().filter_map(|o| o.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &AnalysisError> {
        self.outcomes.iter().filter_map(|o| o.as_ref().err())
    }
}

/// Analyze every channel and rank the ones that succeeded.
pub fn compare_channels(analyzer: &ChannelAnalyzer, inputs: &[ChannelInput]) -> Comparison {
    let outcomes = analyzer.analyze_all(inputs);
    let best = rank(
        outcomes
            .iter()
            .filter_map(|o| o.as_ref().ok())
            .map(|r| (r.name.as_str(), &r.score)),
    )
    .map(str::to_string);

    match &best {
        Ok(name) => tracing::info!("[ComparisonRanker] best channel: {}", name),
        Err(err) => log_analysis_error(err, "compare_channels"),
    }

    Comparison { outcomes, best }
}
