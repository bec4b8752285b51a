//! Series Comparator Module
//! Pairs the CPI series with one exchange-rate series for a two-axis view.

use crate::data::{Datasets, TimeSeries};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompareError {
    #[error("Series '{label}' has no points, nothing to compare")]
    EmptySeries { label: String },
}

/// Exchange rate to compare CPI against. Exactly one per view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Usd,
    Eur,
}

impl Selection {
    pub const ALL: [Selection; 2] = [Selection::Usd, Selection::Eur];

    /// The rate series this selection refers to.
    pub fn pick(self, datasets: &Datasets) -> &Arc<TimeSeries> {
        match self {
            Selection::Usd => &datasets.usd,
            Selection::Eur => &datasets.eur,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Selection::Usd => "CPI – USD/KRW",
            Selection::Eur => "CPI – EUR/KRW",
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// CPI and one rate series sharing a time axis, each with its own value axis.
///
/// Both series are the loaded ones, shared and unmodified: no rescaling,
/// interpolation or resampling.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonView {
    pub primary: Arc<TimeSeries>,
    pub secondary: Arc<TimeSeries>,
    pub primary_axis: String,
    pub secondary_axis: String,
}

/// Builds comparison views.
pub struct Comparator;

impl Comparator {
    /// Pair `cpi` with `other`. Fails if either series is empty.
    pub fn compare(
        cpi: &Arc<TimeSeries>,
        other: &Arc<TimeSeries>,
    ) -> Result<ComparisonView, CompareError> {
        for series in [cpi, other] {
            if series.is_empty() {
                return Err(CompareError::EmptySeries {
                    label: series.label().to_string(),
                });
            }
        }

        debug!(
            primary = cpi.label(),
            secondary = other.label(),
            primary_points = cpi.len(),
            secondary_points = other.len(),
            "built comparison view"
        );

        Ok(ComparisonView {
            primary: Arc::clone(cpi),
            secondary: Arc::clone(other),
            primary_axis: cpi.label().to_string(),
            secondary_axis: other.label().to_string(),
        })
    }

    /// Compare CPI against the selected rate series.
    pub fn compare_selected(
        datasets: &Datasets,
        selection: Selection,
    ) -> Result<ComparisonView, CompareError> {
        Self::compare(&datasets.cpi, selection.pick(datasets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TimePoint;
    use chrono::NaiveDate;

    fn jan_2023() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
    }

    fn series(label: &str, values: &[f64]) -> Arc<TimeSeries> {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                TimePoint::new(jan_2023() + chrono::Months::new(i as u32), v)
            })
            .collect();
        Arc::new(TimeSeries::from_points(label, points).unwrap())
    }

    fn datasets() -> Datasets {
        Datasets {
            cpi: series("CPI", &[100.0, 100.5]),
            usd: series("USD/KRW", &[1300.0]),
            eur: series("EUR/KRW", &[1400.0]),
        }
    }

    #[test]
    fn test_eur_selection_uses_eur_series() {
        let datasets = datasets();
        let view = Comparator::compare_selected(&datasets, Selection::Eur).unwrap();

        assert_eq!(*view.secondary, *datasets.eur);
        assert_ne!(*view.secondary, *datasets.usd);
        assert_eq!(view.secondary.points(), &[TimePoint::new(jan_2023(), 1400.0)]);
        assert_eq!(view.primary_axis, "CPI");
        assert_eq!(view.secondary_axis, "EUR/KRW");
    }

    #[test]
    fn test_compare_leaves_inputs_untouched() {
        let datasets = datasets();
        let cpi_before = (*datasets.cpi).clone();

        let usd_view = Comparator::compare(&datasets.cpi, &datasets.usd).unwrap();
        let eur_view = Comparator::compare(&datasets.cpi, &datasets.eur).unwrap();

        assert_eq!(*datasets.cpi, cpi_before);
        assert!(Arc::ptr_eq(&usd_view.primary, &datasets.cpi));
        assert!(Arc::ptr_eq(&eur_view.primary, &datasets.cpi));
        assert_eq!(*eur_view.primary, cpi_before);
        assert_eq!(usd_view.secondary_axis, "USD/KRW");
    }

    #[test]
    fn test_empty_series_rejected() {
        let empty = series("CPI", &[]);
        let usd = series("USD/KRW", &[1300.0]);

        assert_eq!(
            Comparator::compare(&empty, &usd),
            Err(CompareError::EmptySeries {
                label: "CPI".to_string()
            })
        );

        let empty_rate = series("EUR/KRW", &[]);
        assert!(matches!(
            Comparator::compare(&usd, &empty_rate),
            Err(CompareError::EmptySeries { label }) if label == "EUR/KRW"
        ));
    }

    #[test]
    fn test_selection_labels() {
        assert_eq!(Selection::default(), Selection::Usd);
        assert_eq!(Selection::Usd.to_string(), "CPI – USD/KRW");
        assert_eq!(Selection::ALL.len(), 2);
    }
}
