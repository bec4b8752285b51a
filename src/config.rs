//! Dashboard configuration
//!
//! Loaded from an optional TOML file, then overridden by CLI arguments.

use crate::data::{resolve_encoding, ParsePolicy};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Unknown text encoding for {field}: {label}")]
    InvalidEncoding { field: &'static str, label: String },

    #[error("Invalid window size: {width}x{height}")]
    InvalidWindowSize { width: f32, height: f32 },

    #[error("Invalid export size: {width}x{height}")]
    InvalidExportSize { width: u32, height: u32 },

    #[error("Configuration file error: {0}")]
    FileError(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// Window settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: f32,
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "환율과 물가 프로젝트".to_string(),
            width: 1400.0,
            height: 800.0,
        }
    }
}

/// Input files and the column names they are expected to carry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory the file names below are resolved against
    pub dir: PathBuf,
    pub cpi_file: String,
    pub usd_file: String,
    pub eur_file: String,
    pub cpi_encoding: String,
    pub rate_encoding: String,
    /// Region column of the CPI table
    pub region_column: String,
    /// Region cell of the nationwide aggregate row
    pub nationwide_label: String,
    pub date_column: String,
    pub usd_column: String,
    pub eur_column: String,
    pub parse_policy: ParsePolicy,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            cpi_file: "CPI.csv".to_string(),
            usd_file: "USD_KRW.csv".to_string(),
            eur_file: "EUR_KRW.csv".to_string(),
            cpi_encoding: "cp949".to_string(),
            rate_encoding: "utf-8".to_string(),
            region_column: "시도별".to_string(),
            nationwide_label: "전국".to_string(),
            date_column: "Date".to_string(),
            usd_column: "USD/KRW".to_string(),
            eur_column: "EUR/KRW".to_string(),
            parse_policy: ParsePolicy::Abort,
        }
    }
}

/// Static PNG export of the comparison chart
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub width: u32,
    pub height: u32,
    /// Open the written file with the system viewer
    pub open_after_export: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            width: 1400,
            height: 800,
            open_after_export: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub log_level: LogLevel,
    /// TTF/OTF font with Hangul glyphs, installed ahead of the egui defaults
    pub font_path: Option<PathBuf>,
    pub window: WindowConfig,
    pub data: DataConfig,
    pub export: ExportConfig,
}

impl DashboardConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;

        let config: DashboardConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, label) in [
            ("data.cpi_encoding", &self.data.cpi_encoding),
            ("data.rate_encoding", &self.data.rate_encoding),
        ] {
            if resolve_encoding(label).is_none() {
                return Err(ConfigError::InvalidEncoding {
                    field,
                    label: label.clone(),
                });
            }
        }

        let WindowConfig { width, height, .. } = self.window;
        if !(width > 0.0 && height > 0.0) {
            return Err(ConfigError::InvalidWindowSize { width, height });
        }

        let ExportConfig { width, height, .. } = self.export;
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidExportSize { width, height });
        }

        Ok(())
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) -> Result<(), ConfigError> {
        if let Some(dir) = &cli.data_dir {
            self.data.dir = dir.clone();
        }
        if let Some(log_level) = &cli.log_level {
            self.log_level = LogLevel::from_str(log_level)?;
        }
        Ok(())
    }
}

/// CLI arguments structure
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Data directory override
    pub data_dir: Option<PathBuf>,
    /// Log level override
    pub log_level: Option<String>,
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Config file
/// 3. Default values
pub fn build_config(cli: &CliArgs) -> Result<DashboardConfig, ConfigError> {
    let mut config = match &cli.config_file {
        Some(path) => DashboardConfig::from_file(path)?,
        None => DashboardConfig::default(),
    };

    config.merge_with_cli(cli)?;
    config.validate()?;
    Ok(config)
}
