//! CSV Data Loader Module
//! Reads the CPI and exchange-rate sources, decodes them and hands the raw
//! tables to the processor.

use crate::config::DataConfig;
use crate::data::processor::{DataProcessor, ParsePolicy, ProcessorError};
use crate::data::series::TimeSeries;
use encoding_rs::Encoding;
use polars::prelude::*;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const CPI_LABEL: &str = "CPI";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to load CSV {}: {source}", .path.display())]
    CsvError {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
    #[error("Data format error in {}: {source}", .path.display())]
    DataFormat {
        path: PathBuf,
        #[source]
        source: ProcessorError,
    },
    #[error("Parse error in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ProcessorError,
    },
    #[error("Unknown text encoding '{0}'")]
    UnknownEncoding(String),
}

impl LoaderError {
    fn from_processor(path: &Path, source: ProcessorError) -> Self {
        let path = path.to_path_buf();
        if source.is_parse_error() {
            LoaderError::Parse { path, source }
        } else {
            LoaderError::DataFormat { path, source }
        }
    }

    /// Source file the error refers to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            LoaderError::Io { path, .. }
            | LoaderError::CsvError { path, .. }
            | LoaderError::DataFormat { path, .. }
            | LoaderError::Parse { path, .. } => Some(path),
            LoaderError::UnknownEncoding(_) => None,
        }
    }
}

/// Resolve an encoding label. `cp949` is served by the EUC-KR decoder,
/// which covers the windows-949 extension.
pub fn resolve_encoding(label: &str) -> Option<&'static Encoding> {
    match label.trim().to_ascii_lowercase().as_str() {
        "cp949" | "uhc" => Some(encoding_rs::EUC_KR),
        other => Encoding::for_label(other.as_bytes()),
    }
}

/// Wide CPI table: one row per region, one column per month.
#[derive(Debug, Clone)]
pub struct CpiSource {
    pub path: PathBuf,
    pub encoding: &'static Encoding,
    pub region_column: String,
    pub nationwide_label: String,
}

/// Long exchange-rate table: one row per date.
#[derive(Debug, Clone)]
pub struct RateSource {
    pub path: PathBuf,
    pub encoding: &'static Encoding,
    pub date_column: String,
    pub value_column: String,
}

/// The three loaded series. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Datasets {
    pub cpi: Arc<TimeSeries>,
    pub usd: Arc<TimeSeries>,
    pub eur: Arc<TimeSeries>,
}

/// Loads the CPI, USD/KRW and EUR/KRW sources.
#[derive(Debug, Clone)]
pub struct DataLoader {
    cpi: CpiSource,
    usd: RateSource,
    eur: RateSource,
    policy: ParsePolicy,
}

impl DataLoader {
    pub fn new(cpi: CpiSource, usd: RateSource, eur: RateSource, policy: ParsePolicy) -> Self {
        Self {
            cpi,
            usd,
            eur,
            policy,
        }
    }

    /// Build a loader from the `[data]` configuration section.
    pub fn from_config(config: &DataConfig) -> Result<Self, LoaderError> {
        let cpi_encoding = resolve_encoding(&config.cpi_encoding)
            .ok_or_else(|| LoaderError::UnknownEncoding(config.cpi_encoding.clone()))?;
        let rate_encoding = resolve_encoding(&config.rate_encoding)
            .ok_or_else(|| LoaderError::UnknownEncoding(config.rate_encoding.clone()))?;

        let rate_source = |file: &str, column: &str| RateSource {
            path: config.dir.join(file),
            encoding: rate_encoding,
            date_column: config.date_column.clone(),
            value_column: column.to_string(),
        };

        Ok(Self::new(
            CpiSource {
                path: config.dir.join(&config.cpi_file),
                encoding: cpi_encoding,
                region_column: config.region_column.clone(),
                nationwide_label: config.nationwide_label.clone(),
            },
            rate_source(&config.usd_file, &config.usd_column),
            rate_source(&config.eur_file, &config.eur_column),
            config.parse_policy,
        ))
    }

    /// Paths of the three sources in CPI, USD, EUR order.
    pub fn source_paths(&self) -> [&Path; 3] {
        [
            self.cpi.path.as_path(),
            self.usd.path.as_path(),
            self.eur.path.as_path(),
        ]
    }

    /// Load all three series. The first failure aborts the load.
    pub fn load(&self) -> Result<Datasets, LoaderError> {
        let cpi = self.load_cpi()?;
        let usd = self.load_rate(&self.usd)?;
        let eur = self.load_rate(&self.eur)?;

        info!(
            cpi = cpi.len(),
            usd = usd.len(),
            eur = eur.len(),
            policy = %self.policy,
            "datasets loaded"
        );

        Ok(Datasets {
            cpi: Arc::new(cpi),
            usd: Arc::new(usd),
            eur: Arc::new(eur),
        })
    }

    /// Load the CPI table and reshape its nationwide row.
    pub fn load_cpi(&self) -> Result<TimeSeries, LoaderError> {
        let source = &self.cpi;
        let df = Self::read_table(&source.path, source.encoding)?;

        DataProcessor::wide_row_to_series(
            &df,
            &source.region_column,
            &source.nationwide_label,
            CPI_LABEL,
            self.policy,
        )
        .map_err(|e| LoaderError::from_processor(&source.path, e))
    }

    /// Load one exchange-rate table. The series is labeled by its value column.
    pub fn load_rate(&self, source: &RateSource) -> Result<TimeSeries, LoaderError> {
        let df = Self::read_table(&source.path, source.encoding)?;

        DataProcessor::long_rows_to_series(
            &df,
            &source.date_column,
            &source.value_column,
            &source.value_column,
            self.policy,
        )
        .map_err(|e| LoaderError::from_processor(&source.path, e))
    }

    /// Read a file fully, decode it and parse it as an all-string table
    /// with trimmed column names.
    pub fn read_table(path: &Path, encoding: &'static Encoding) -> Result<DataFrame, LoaderError> {
        let bytes = fs::read(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        // A byte-order mark overrides `encoding` and is stripped.
        let (text, used, had_errors) = encoding.decode(&bytes);
        if had_errors {
            warn!(
                path = %path.display(),
                encoding = used.name(),
                "malformed byte sequences replaced while decoding"
            );
        }

        let mut df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .into_reader_with_file_handle(Cursor::new(text.into_owned().into_bytes()))
            .finish()
            .map_err(|source| LoaderError::CsvError {
                path: path.to_path_buf(),
                source,
            })?;

        DataProcessor::trim_column_names(&mut df)
            .map_err(|e| LoaderError::from_processor(path, e))?;

        debug!(
            path = %path.display(),
            encoding = used.name(),
            rows = df.height(),
            columns = df.width(),
            "read raw table"
        );
        Ok(df)
    }
}
