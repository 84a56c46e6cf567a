use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use channel_quality::analysis::{ChannelAnalyzer, FilterSpec};
use channel_quality::api::{self, CompareReport, Upload};
use channel_quality::audio;
use channel_quality::config::AppConfig;
use channel_quality::error::DecodeError;
use channel_quality::testing::synthetic;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "channel_cli",
    about = "Voice-band signal quality analysis for recorded channels"
)]
struct Cli {
    /// JSON configuration file (defaults to config/analyzer.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

/// Overrides for the configured filter
#[derive(Args, Debug, Clone, Copy)]
struct FilterArgs {
    /// Low cutoff in Hz (0 for a low-pass)
    #[arg(long)]
    low_cut: Option<u32>,
    /// High cutoff in Hz, clamped below Nyquist
    #[arg(long)]
    high_cut: Option<u32>,
    /// Butterworth prototype order
    #[arg(long)]
    order: Option<u32>,
}

impl FilterArgs {
    fn apply(self, base: FilterSpec) -> FilterSpec {
        FilterSpec {
            low_cut_hz: self.low_cut.unwrap_or(base.low_cut_hz),
            high_cut_hz: self.high_cut.unwrap_or(base.high_cut_hz),
            order: self.order.unwrap_or(base.order),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze one capture and print its JSON report
    Analyze {
        file: PathBuf,
        #[command(flatten)]
        filter: FilterArgs,
        /// Write the report here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// Emit full-resolution traces instead of the decimated report
        #[arg(long)]
        full: bool,
    },
    /// Analyze several captures and name the cleanest one
    Compare {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[command(flatten)]
        filter: FilterArgs,
        /// Print the comparison as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a synthetic tone-plus-noise capture
    Synth {
        output: PathBuf,
        #[arg(long, default_value_t = 1000.0)]
        freq: f64,
        #[arg(long, default_value_t = 16_000)]
        rate: u32,
        #[arg(long, default_value_t = 1.0)]
        seconds: f64,
        #[arg(long, default_value_t = 0.5)]
        amplitude: f64,
        /// White noise amplitude
        #[arg(long, default_value_t = 0.05)]
        noise: f64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Serve the HTTP API
    Serve {
        /// Listen port (overrides config and PORT)
        #[arg(long)]
        port: Option<u16>,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli
        .config
        .as_deref()
        .map(AppConfig::load_from_file)
        .unwrap_or_else(AppConfig::load);

    match cli.command {
        Commands::Analyze {
            file,
            filter,
            output,
            full,
        } => run_analyze(&config, &file, filter.apply(config.filter), output, full),
        Commands::Compare {
            files,
            filter,
            json,
        } => run_compare(&config, &files, filter.apply(config.filter), json),
        Commands::Synth {
            output,
            freq,
            rate,
            seconds,
            amplitude,
            noise,
            seed,
        } => run_synth(&output, freq, rate, seconds, amplitude, noise, seed),
        Commands::Serve { port } => run_serve(config, port),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // Reports go to stdout; keep logs off it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn channel_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

fn run_analyze(
    config: &AppConfig,
    file: &Path,
    filter: FilterSpec,
    output: Option<PathBuf>,
    full: bool,
) -> Result<ExitCode> {
    let name = channel_name(file);
    let decoded =
        audio::decode_file(file).with_context(|| format!("decoding {}", file.display()))?;
    let signal = decoded.to_signal()?;
    let result = ChannelAnalyzer::new(filter)
        .analyze(&name, &signal)
        .with_context(|| format!("analyzing {}", file.display()))?;

    let json = if full {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string_pretty(&api::build_report(&result, &config.display))?
    };

    if let Some(path) = output {
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{json}");
    }
    Ok(ExitCode::from(0))
}

fn run_compare(
    config: &AppConfig,
    files: &[PathBuf],
    filter: FilterSpec,
    json: bool,
) -> Result<ExitCode> {
    let uploads: Vec<Upload> = files
        .iter()
        .map(|path| {
            let name = channel_name(path);
            match fs::read(path) {
                Ok(bytes) => Upload::new(name, bytes),
                Err(err) => Upload::unreadable(name, DecodeError::from(err)),
            }
        })
        .collect();

    let report = api::compare_uploads(&uploads, &filter, &config.display);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    if report.channels.is_empty() {
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::from(0))
    }
}

fn print_summary(report: &CompareReport) {
    println!(
        "{:<24} {:>10} {:>12} {:>10}",
        "channel", "snr (dB)", "floor (dB)", "secs"
    );
    for channel in &report.channels {
        let marker = if report.best.as_deref() == Some(channel.name.as_str()) {
            " *"
        } else {
            ""
        };
        println!(
            "{:<24} {:>10.2} {:>12.2} {:>10.2}{}",
            channel.name, channel.snr, channel.floor, channel.duration, marker
        );
    }
    for failure in &report.errors {
        println!("{:<24} error {}: {}", failure.name, failure.code, failure.error);
    }
    match &report.best {
        Some(best) => println!("best: {best}"),
        None => println!("best: none (no channel could be analyzed)"),
    }
}

fn run_synth(
    output: &Path,
    freq: f64,
    rate: u32,
    seconds: f64,
    amplitude: f64,
    noise: f64,
    seed: u64,
) -> Result<ExitCode> {
    if rate == 0 || !(seconds > 0.0) {
        bail!("rate and seconds must be positive");
    }
    let len = (seconds * f64::from(rate)).round() as usize;
    let samples = synthetic::noisy_tone(freq, rate, len, amplitude, noise, seed);
    synthetic::write_wav(output, &samples, rate)
        .with_context(|| format!("writing {}", output.display()))?;
    println!("wrote {} ({} samples @ {} Hz)", output.display(), len, rate);
    Ok(ExitCode::from(0))
}

#[cfg(feature = "http")]
fn run_serve(config: AppConfig, port: Option<u16>) -> Result<ExitCode> {
    let mut addr = config.server.bind_address();
    if let Some(port) = port {
        addr.set_port(port);
    }
    channel_quality::http::serve_blocking(config, addr)?;
    Ok(ExitCode::from(0))
}

#[cfg(not(feature = "http"))]
fn run_serve(_config: AppConfig, _port: Option<u16>) -> Result<ExitCode> {
    bail!("this build was compiled without the `http` feature")
}
