//! Data Processor Module
//! Handles header cleanup, row selection and the wide-to-long reshape of raw tables.

use crate::data::series::{SeriesError, TimePoint, TimeSeries};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

/// Day-level formats accepted for exchange-rate dates, tried in order.
/// Slash dates without a leading year are month-first.
const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%Y%m%d",
    "%m/%d/%Y",
    "%b %d, %Y",
];

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("required column '{0}' not found")]
    MissingColumn(String),
    #[error("no row with {column} = '{value}'")]
    MissingRow { column: String, value: String },
    #[error("{count} rows with {column} = '{value}', expected exactly one")]
    AmbiguousRow {
        column: String,
        value: String,
        count: usize,
    },
    #[error("column '{column}', row {row}: cannot parse '{value}' as {kind}")]
    InvalidCell {
        column: String,
        /// 1-based data row (header excluded)
        row: usize,
        value: String,
        kind: CellKind,
    },
    #[error(transparent)]
    Series(#[from] SeriesError),
}

impl ProcessorError {
    /// Cell conversion failure, as opposed to a structural problem with the table.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, ProcessorError::InvalidCell { .. })
    }

    fn invalid_cell(column: &str, row: usize, value: Option<&str>, kind: CellKind) -> Self {
        ProcessorError::InvalidCell {
            column: column.to_string(),
            row: row + 1,
            value: value.unwrap_or_default().to_string(),
            kind,
        }
    }
}

/// What a cell was expected to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    MonthLabel,
    Date,
    Number,
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellKind::MonthLabel => write!(f, "month label (YYYY.MM)"),
            CellKind::Date => write!(f, "date"),
            CellKind::Number => write!(f, "number"),
        }
    }
}

/// How a load reacts to a cell that cannot be converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsePolicy {
    /// Fail the whole load on the first bad cell
    #[default]
    Abort,
    /// Drop the offending record and log it
    Skip,
}

impl ParsePolicy {
    /// Apply the policy to one record's conversion result.
    fn admit<T>(self, result: Result<T, ProcessorError>) -> Result<Option<T>, ProcessorError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if self == ParsePolicy::Skip && e.is_parse_error() => {
                warn!(error = %e, "skipping unparseable record");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

impl fmt::Display for ParsePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsePolicy::Abort => write!(f, "abort"),
            ParsePolicy::Skip => write!(f, "skip"),
        }
    }
}

/// Turns raw string tables into typed time series.
pub struct DataProcessor;

impl DataProcessor {
    /// Strip surrounding whitespace from every column name.
    pub fn trim_column_names(df: &mut DataFrame) -> Result<(), ProcessorError> {
        let trimmed: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.trim().to_string())
            .collect();
        df.set_column_names(trimmed)?;
        Ok(())
    }

    /// Fail with `MissingColumn` unless `name` is a column of `df`.
    pub fn require_column(df: &DataFrame, name: &str) -> Result<(), ProcessorError> {
        if df.get_column_names().iter().any(|c| c.as_str() == name) {
            Ok(())
        } else {
            Err(ProcessorError::MissingColumn(name.to_string()))
        }
    }

    fn string_cells(df: &DataFrame, name: &str) -> Result<StringChunked, ProcessorError> {
        Self::require_column(df, name)?;
        let column = df.column(name)?.cast(&DataType::String)?;
        Ok(column.as_materialized_series().str()?.clone())
    }

    /// Index of the single row whose `id_col` cell equals `id_value` after trimming.
    pub fn find_row(df: &DataFrame, id_col: &str, id_value: &str) -> Result<usize, ProcessorError> {
        let ids = Self::string_cells(df, id_col)?;
        let matches: Vec<usize> = (&ids)
            .into_iter()
            .enumerate()
            .filter_map(|(i, v)| (v.map(str::trim) == Some(id_value)).then_some(i))
            .collect();

        match matches.as_slice() {
            [] => Err(ProcessorError::MissingRow {
                column: id_col.to_string(),
                value: id_value.to_string(),
            }),
            [row] => Ok(*row),
            _ => Err(ProcessorError::AmbiguousRow {
                column: id_col.to_string(),
                value: id_value.to_string(),
                count: matches.len(),
            }),
        }
    }

    /// Unpivot one row of a wide table (stack operation).
    ///
    /// Emits one `(column name, cell)` pair per column other than `id_col`,
    /// in header order. The column list is captured once up front.
    pub fn unpivot_row(
        df: &DataFrame,
        id_col: &str,
        row: usize,
    ) -> Result<Vec<(String, Option<String>)>, ProcessorError> {
        let value_cols: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .filter(|name| name != id_col)
            .collect();

        let mut records = Vec::with_capacity(value_cols.len());
        for name in value_cols {
            let cells = Self::string_cells(df, &name)?;
            let cell = cells.get(row).map(str::to_string);
            records.push((name, cell));
        }

        Ok(records)
    }

    /// Reshape the `id_value` row of a month-per-column table into a series.
    ///
    /// Column headers are month labels; each cell becomes the value for the
    /// first day of that month.
    pub fn wide_row_to_series(
        df: &DataFrame,
        id_col: &str,
        id_value: &str,
        label: &str,
        policy: ParsePolicy,
    ) -> Result<TimeSeries, ProcessorError> {
        let row = Self::find_row(df, id_col, id_value)?;
        let records = Self::unpivot_row(df, id_col, row)?;
        let month_count = records.len();

        let mut points = Vec::with_capacity(month_count);
        for (column, cell) in records {
            let point = Self::parse_month_label(&column)
                .ok_or_else(|| {
                    ProcessorError::invalid_cell(
                        &column,
                        row,
                        Some(column.as_str()),
                        CellKind::MonthLabel,
                    )
                })
                .and_then(|date| {
                    let value = Self::number_cell(&column, row, cell.as_deref())?;
                    Ok(TimePoint::new(date, value))
                });

            if let Some(point) = policy.admit(point)? {
                points.push(point);
            }
        }

        debug!(
            label,
            row,
            columns = month_count,
            points = points.len(),
            "reshaped wide row"
        );
        Ok(TimeSeries::from_points(label, points)?)
    }

    /// Build a series from a long table with one `(date, value)` pair per row.
    pub fn long_rows_to_series(
        df: &DataFrame,
        date_col: &str,
        value_col: &str,
        label: &str,
        policy: ParsePolicy,
    ) -> Result<TimeSeries, ProcessorError> {
        let dates = Self::string_cells(df, date_col)?;
        let values = Self::string_cells(df, value_col)?;

        let mut points = Vec::with_capacity(df.height());
        for (row, (date, value)) in (&dates).into_iter().zip(&values).enumerate() {
            let point = Self::date_cell(date_col, row, date).and_then(|date| {
                let value = Self::number_cell(value_col, row, value)?;
                Ok(TimePoint::new(date, value))
            });

            if let Some(point) = policy.admit(point)? {
                points.push(point);
            }
        }

        debug!(label, rows = df.height(), points = points.len(), "collected long rows");
        Ok(TimeSeries::from_points(label, points)?)
    }

    /// Parse a `YYYY.MM` month label to the first day of that month.
    ///
    /// `-` and `/` are accepted as separators too.
    pub fn parse_month_label(text: &str) -> Option<NaiveDate> {
        let (year, month) = text
            .trim()
            .split_once(|c: char| matches!(c, '.' | '-' | '/'))?;

        let is_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if year.len() != 4 || month.len() > 2 || !is_digits(year) || !is_digits(month) {
            return None;
        }

        NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
    }

    /// Parse a calendar date, ignoring any trailing time of day.
    ///
    /// Month-only values fall back to the first of the month.
    pub fn parse_date(text: &str) -> Option<NaiveDate> {
        let text = text.trim();
        let day_part = text
            .split(|c: char| c == ' ' || c == 'T')
            .next()
            .unwrap_or(text);

        // Whole text first: month-name dates contain spaces.
        [text, day_part]
            .into_iter()
            .find_map(|candidate| {
                DATE_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDate::parse_from_str(candidate, fmt).ok())
            })
            .or_else(|| Self::parse_month_label(day_part))
    }

    /// Parse a finite number, allowing `,` thousands separators.
    pub fn parse_number(text: &str) -> Option<f64> {
        let cleaned: String = text.trim().chars().filter(|&c| c != ',').collect();
        cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    fn date_cell(column: &str, row: usize, cell: Option<&str>) -> Result<NaiveDate, ProcessorError> {
        cell.and_then(Self::parse_date)
            .ok_or_else(|| ProcessorError::invalid_cell(column, row, cell, CellKind::Date))
    }

    fn number_cell(column: &str, row: usize, cell: Option<&str>) -> Result<f64, ProcessorError> {
        cell.and_then(Self::parse_number)
            .ok_or_else(|| ProcessorError::invalid_cell(column, row, cell, CellKind::Number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn cpi_table() -> DataFrame {
        df!(
            "시도별" => ["서울", "전국", "부산"],
            "2023.01" => ["101.0", "100.0", "99.1"],
            "2023.02" => ["101.4", "100.5", "99.6"]
        )
        .unwrap()
    }

    #[test]
    fn test_reshape_nationwide_row() {
        let series = DataProcessor::wide_row_to_series(
            &cpi_table(),
            "시도별",
            "전국",
            "CPI",
            ParsePolicy::Abort,
        )
        .unwrap();

        assert_eq!(series.label(), "CPI");
        assert_eq!(
            series.points(),
            &[
                TimePoint::new(ymd(2023, 1, 1), 100.0),
                TimePoint::new(ymd(2023, 2, 1), 100.5),
            ]
        );
    }

    #[test]
    fn test_reshape_emits_one_record_per_month_column() {
        let df = df!(
            "시도별" => ["전국", "서울", "부산", "대구"],
            "2022.11" => ["108.0", "1", "1", "1"],
            "2022.12" => ["108.3", "1", "1", "1"],
            "2023.01" => ["109.1", "1", "1", "1"],
            "2023.02" => ["109.5", "1", "1", "1"],
            "2023.03" => ["109.8", "1", "1", "1"]
        )
        .unwrap();

        let records = DataProcessor::unpivot_row(&df, "시도별", 0).unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(records[0], ("2022.11".to_string(), Some("108.0".to_string())));
        assert_eq!(records[4], ("2023.03".to_string(), Some("109.8".to_string())));

        let series =
            DataProcessor::wide_row_to_series(&df, "시도별", "전국", "CPI", ParsePolicy::Abort)
                .unwrap();
        assert_eq!(series.len(), 5);
        assert!(series.points().windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(series.points()[2], TimePoint::new(ymd(2023, 1, 1), 109.1));
    }

    #[test]
    fn test_unordered_month_columns_are_sorted() {
        let df = df!(
            "시도별" => ["전국"],
            "2023.03" => ["103.0"],
            "2023.01" => ["101.0"],
            "2023.02" => ["102.0"]
        )
        .unwrap();

        let series =
            DataProcessor::wide_row_to_series(&df, "시도별", "전국", "CPI", ParsePolicy::Abort)
                .unwrap();
        let values: Vec<f64> = series.points().iter().map(|p| p.value).collect();
        assert_eq!(values, vec![101.0, 102.0, 103.0]);
    }

    #[test]
    fn test_trim_column_names() {
        let mut df = df!(
            " 시도별 " => ["전국"],
            " 2023.01" => ["100.0"],
            "2023.02  " => ["100.5"]
        )
        .unwrap();

        DataProcessor::trim_column_names(&mut df).unwrap();

        let names: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["시도별", "2023.01", "2023.02"]);
        assert!(DataProcessor::require_column(&df, "시도별").is_ok());
    }

    #[test]
    fn test_missing_region_column() {
        let df = df!("지역" => ["전국"], "2023.01" => ["100.0"]).unwrap();
        let err =
            DataProcessor::wide_row_to_series(&df, "시도별", "전국", "CPI", ParsePolicy::Abort)
                .unwrap_err();
        assert!(matches!(err, ProcessorError::MissingColumn(ref c) if c == "시도별"));
        assert!(!err.is_parse_error());
    }

    #[test]
    fn test_missing_and_ambiguous_nationwide_row() {
        let df = df!("시도별" => ["서울", "부산"], "2023.01" => ["1", "2"]).unwrap();
        let err = DataProcessor::find_row(&df, "시도별", "전국").unwrap_err();
        assert!(matches!(err, ProcessorError::MissingRow { .. }));

        let df = df!("시도별" => ["전국", " 전국 "], "2023.01" => ["1", "2"]).unwrap();
        let err = DataProcessor::find_row(&df, "시도별", "전국").unwrap_err();
        assert!(matches!(err, ProcessorError::AmbiguousRow { count: 2, .. }));
    }

    #[test]
    fn test_bad_month_label_aborts_by_default() {
        let df = df!(
            "시도별" => ["전국"],
            "2023.01" => ["100.0"],
            "가중치" => ["1000"]
        )
        .unwrap();

        let err =
            DataProcessor::wide_row_to_series(&df, "시도별", "전국", "CPI", ParsePolicy::Abort)
                .unwrap_err();
        match err {
            ProcessorError::InvalidCell { column, kind, .. } => {
                assert_eq!(column, "가중치");
                assert_eq!(kind, CellKind::MonthLabel);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_skip_policy_drops_only_bad_records() {
        let df = df!(
            "Date" => ["2023-01-02", "not a date", "2023-01-04", "2023-01-05"],
            "USD/KRW" => ["1,300.5", "1301.0", "-", "1310.25"]
        )
        .unwrap();

        let series = DataProcessor::long_rows_to_series(
            &df,
            "Date",
            "USD/KRW",
            "USD/KRW",
            ParsePolicy::Skip,
        )
        .unwrap();
        assert_eq!(
            series.points(),
            &[
                TimePoint::new(ymd(2023, 1, 2), 1300.5),
                TimePoint::new(ymd(2023, 1, 5), 1310.25),
            ]
        );

        let err = DataProcessor::long_rows_to_series(
            &df,
            "Date",
            "USD/KRW",
            "USD/KRW",
            ParsePolicy::Abort,
        )
        .unwrap_err();
        match err {
            ProcessorError::InvalidCell { column, row, value, kind } => {
                assert_eq!(column, "Date");
                assert_eq!(row, 2);
                assert_eq!(value, "not a date");
                assert_eq!(kind, CellKind::Date);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_dates_are_a_format_error_even_when_skipping() {
        let df = df!(
            "Date" => ["2023-01-02", "2023/01/02"],
            "EUR/KRW" => ["1400.0", "1401.0"]
        )
        .unwrap();

        let err = DataProcessor::long_rows_to_series(
            &df,
            "Date",
            "EUR/KRW",
            "EUR/KRW",
            ParsePolicy::Skip,
        )
        .unwrap_err();
        assert!(matches!(err, ProcessorError::Series(SeriesError::DuplicateDate { .. })));
        assert!(!err.is_parse_error());
    }

    #[test]
    fn test_parse_month_label() {
        assert_eq!(DataProcessor::parse_month_label("2023.01"), Some(ymd(2023, 1, 1)));
        assert_eq!(DataProcessor::parse_month_label(" 2023.12 "), Some(ymd(2023, 12, 1)));
        assert_eq!(DataProcessor::parse_month_label("2023.1"), Some(ymd(2023, 1, 1)));
        assert_eq!(DataProcessor::parse_month_label("2023.13"), None);
        assert_eq!(DataProcessor::parse_month_label("23.01"), None);
        assert_eq!(DataProcessor::parse_month_label("시도별"), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = Some(ymd(2024, 3, 15));
        assert_eq!(DataProcessor::parse_date("2024-03-15"), expected);
        assert_eq!(DataProcessor::parse_date("2024/03/15"), expected);
        assert_eq!(DataProcessor::parse_date("2024.03.15"), expected);
        assert_eq!(DataProcessor::parse_date("20240315"), expected);
        assert_eq!(DataProcessor::parse_date("2024-03-15 00:00:00"), expected);
        assert_eq!(DataProcessor::parse_date("2024-03"), Some(ymd(2024, 3, 1)));
        assert_eq!(DataProcessor::parse_date(""), None);
    }

    #[test]
    fn test_parse_month_first_and_month_name_dates() {
        assert_eq!(DataProcessor::parse_date("01/02/2023"), Some(ymd(2023, 1, 2)));
        assert_eq!(DataProcessor::parse_date("03/15/2024"), Some(ymd(2024, 3, 15)));
        assert_eq!(DataProcessor::parse_date("Jan 02, 2023"), Some(ymd(2023, 1, 2)));
        assert_eq!(DataProcessor::parse_date(" Mar 15, 2024 "), Some(ymd(2024, 3, 15)));
        assert_eq!(DataProcessor::parse_date("15/03/2024"), None);
    }

    #[test]
    fn test_rate_rows_with_exported_date_shapes() {
        let df = df!(
            "Date" => ["01/03/2023", "01/02/2023", "Jan 04, 2023"],
            "USD/KRW" => ["1,272.5", "1,268.0", "1,260.0"]
        )
        .unwrap();

        let series = DataProcessor::long_rows_to_series(
            &df,
            "Date",
            "USD/KRW",
            "USD/KRW",
            ParsePolicy::Abort,
        )
        .unwrap();
        assert_eq!(
            series.points(),
            &[
                TimePoint::new(ymd(2023, 1, 2), 1268.0),
                TimePoint::new(ymd(2023, 1, 3), 1272.5),
                TimePoint::new(ymd(2023, 1, 4), 1260.0),
            ]
        );
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(DataProcessor::parse_number(" 1,350.25 "), Some(1350.25));
        assert_eq!(DataProcessor::parse_number("100"), Some(100.0));
        assert_eq!(DataProcessor::parse_number("-"), None);
        assert_eq!(DataProcessor::parse_number("NaN"), None);
        assert_eq!(DataProcessor::parse_number(""), None);
    }
}
