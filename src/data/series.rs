//! Time Series Module
//! Date-indexed value series shared by the loader, comparator and charts.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    #[error("duplicate date {date} in series '{label}'")]
    DuplicateDate { label: String, date: NaiveDate },
}

/// A single observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimePoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl TimePoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Labeled series ordered strictly ascending by date.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    label: String,
    points: Vec<TimePoint>,
}

impl TimeSeries {
    /// Build a series from points in any order.
    ///
    /// Points are sorted by date. Two points sharing a date are rejected
    /// rather than collapsed.
    pub fn from_points(
        label: impl Into<String>,
        mut points: Vec<TimePoint>,
    ) -> Result<Self, SeriesError> {
        let label = label.into();
        points.sort_by_key(|p| p.date);

        if let Some(pair) = points.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(SeriesError::DuplicateDate {
                label,
                date: pair[0].date,
            });
        }

        Ok(Self { label, points })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First and last date, if any.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.points.first()?.date, self.points.last()?.date))
    }

    /// Minimum and maximum value, ignoring NaN.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for p in self.points.iter().filter(|p| !p.value.is_nan()) {
            min = min.min(p.value);
            max = max.max(p.value);
        }
        if min.is_infinite() {
            None
        } else {
            Some((min, max))
        }
    }
}
