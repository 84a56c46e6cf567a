//! Configuration management for the analyzer
//!
//! Runtime configuration is loaded from a JSON file so cutoffs, report
//! decimation and server limits can be tuned without recompiling. Missing
//! sections fall back to defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

use crate::analysis::FilterSpec;

/// Default location of the configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/analyzer.json";

/// Environment variable that overrides `server.port`
pub const PORT_ENV_VAR: &str = "PORT";

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub filter: FilterSpec,
    pub display: DisplayConfig,
    pub server: ServerConfig,
}

/// Report decimation and formatting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Target number of points in each waveform trace
    pub waveform_points: usize,
    /// Target number of points in the displayed spectrum
    pub spectrum_points: usize,
    /// Highest frequency included in the displayed spectrum
    pub spectrum_max_hz: f64,
    /// Decimal places for snr, floor and duration
    pub decimals: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            waveform_points: 2000,
            spectrum_points: 1000,
            spectrum_max_hz: 5000.0,
            decimals: 2,
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Per-request timeout; analysis of long captures counts against it
    pub request_timeout_secs: u64,
    /// Maximum accepted request body
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 5000,
            request_timeout_secs: 120,
            max_upload_bytes: 64 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Listen address, honoring the `PORT` environment variable.
    pub fn bind_address(&self) -> SocketAddr {
        self.bind_address_with(std::env::var(PORT_ENV_VAR).ok().as_deref())
    }

    /// Listen address with an explicit port override.
    ///
    /// An override that does not parse as a port is ignored with a warning.
    pub fn bind_address_with(&self, port_override: Option<&str>) -> SocketAddr {
        let port = match port_override.map(|raw| (raw, raw.trim().parse::<u16>())) {
            Some((_, Ok(port))) => port,
            Some((raw, Err(err))) => {
                log::warn!(
                    "[Config] Ignoring {}={:?}: {}. Using port {}.",
                    PORT_ENV_VAR,
                    raw,
                    err,
                    self.port
                );
                self.port
            }
            None => self.port,
        };
        SocketAddr::new(self.host, port)
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    ///
    /// Never fails: a missing or invalid file logs a warning and yields the
    /// default configuration.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    pub fn load() -> Self {
        Self::load_from_file(DEFAULT_CONFIG_PATH)
    }
}
