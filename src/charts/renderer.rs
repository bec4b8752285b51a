//! Static Chart Renderer
//! Writes the CPI / exchange-rate comparison as a PNG image using plotters.
//!
//! Layout:
//! 1. Title: "{primary} vs {secondary}" centered
//! 2. CPI on the left axis (solid), rate on the right axis (dashed)
//! 3. Legend in the upper left corner

use crate::charts::{date_to_x, format_month_tick};
use crate::compare::ComparisonView;
use crate::data::TimeSeries;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;
use thiserror::Error;
use tracing::info;

const CPI_RGB: RGBColor = RGBColor(52, 152, 219);
const RATE_RGB: RGBColor = RGBColor(231, 76, 60);

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Nothing to draw: series '{0}' is empty")]
    EmptySeries(String),
    #[error("Chart drawing failed: {0}")]
    Drawing(String),
}

fn drawing_error<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Drawing(e.to_string())
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render `view` to a PNG file at `path`.
    pub fn render_comparison_png(
        view: &ComparisonView,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        let x_range = Self::x_range(view)?;
        let primary_range = Self::y_range(&view.primary)?;
        let secondary_range = Self::y_range(&view.secondary)?;

        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(drawing_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("{} vs {}", view.primary_axis, view.secondary_axis),
                ("sans-serif", 24),
            )
            .margin(16)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .right_y_label_area_size(60)
            .build_cartesian_2d(x_range.clone(), primary_range)
            .map_err(drawing_error)?
            .set_secondary_coord(x_range, secondary_range);

        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc(view.primary_axis.as_str())
            .x_label_formatter(&|x: &f64| format_month_tick(*x))
            .draw()
            .map_err(drawing_error)?;

        chart
            .configure_secondary_axes()
            .y_desc(view.secondary_axis.as_str())
            .draw()
            .map_err(drawing_error)?;

        chart
            .draw_series(LineSeries::new(
                Self::coords(&view.primary),
                CPI_RGB.stroke_width(2),
            ))
            .map_err(drawing_error)?
            .label(view.primary_axis.as_str())
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &CPI_RGB));

        chart
            .draw_secondary_series(DashedLineSeries::new(
                Self::coords(&view.secondary),
                8,
                4,
                RATE_RGB.stroke_width(2),
            ))
            .map_err(drawing_error)?
            .label(view.secondary_axis.as_str())
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RATE_RGB));

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(drawing_error)?;

        root.present().map_err(drawing_error)?;
        info!(path = %path.display(), width, height, "comparison chart exported");
        Ok(())
    }

    fn coords(series: &TimeSeries) -> Vec<(f64, f64)> {
        series
            .points()
            .iter()
            .map(|p| (date_to_x(p.date), p.value))
            .collect()
    }

    /// Shared time axis covering both series.
    fn x_range(view: &ComparisonView) -> Result<Range<f64>, RenderError> {
        let mut start = f64::INFINITY;
        let mut end = f64::NEG_INFINITY;
        for series in [&view.primary, &view.secondary] {
            let (first, last) = series
                .date_range()
                .ok_or_else(|| RenderError::EmptySeries(series.label().to_string()))?;
            start = start.min(date_to_x(first));
            end = end.max(date_to_x(last));
        }
        if end <= start {
            end = start + 1.0;
        }
        Ok(start..end)
    }

    /// Value range padded by 10% on each side.
    fn y_range(series: &TimeSeries) -> Result<Range<f64>, RenderError> {
        let (min, max) = series
            .value_range()
            .ok_or_else(|| RenderError::EmptySeries(series.label().to_string()))?;
        let span = max - min;
        let pad = if span > 0.0 { span * 0.1 } else { 1.0 };
        Ok((min - pad)..(max + pad))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::Comparator;
    use crate::data::TimePoint;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn series(label: &str, points: &[(u32, f64)]) -> Arc<TimeSeries> {
        let points = points
            .iter()
            .map(|&(month, v)| {
                TimePoint::new(NaiveDate::from_ymd_opt(2023, month, 1).unwrap(), v)
            })
            .collect();
        Arc::new(TimeSeries::from_points(label, points).unwrap())
    }

    #[test]
    fn test_ranges_cover_both_series() {
        let cpi = series("CPI", &[(1, 100.0), (3, 110.0)]);
        let usd = series("USD/KRW", &[(2, 1300.0), (6, 1300.0)]);
        let view = Comparator::compare(&cpi, &usd).unwrap();

        let x = StaticChartRenderer::x_range(&view).unwrap();
        assert_eq!(x.start, date_to_x(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()));
        assert_eq!(x.end, date_to_x(NaiveDate::from_ymd_opt(2023, 6, 1).unwrap()));

        let primary = StaticChartRenderer::y_range(&view.primary).unwrap();
        assert!((primary.start - 99.0).abs() < 1e-9);
        assert!((primary.end - 111.0).abs() < 1e-9);

        let flat = StaticChartRenderer::y_range(&view.secondary).unwrap();
        assert_eq!(flat, 1299.0..1301.0);
    }

    #[test]
    fn test_empty_series_not_rendered() {
        let view = ComparisonView {
            primary: series("CPI", &[(1, 100.0)]),
            secondary: series("EUR/KRW", &[]),
            primary_axis: "CPI".to_string(),
            secondary_axis: "EUR/KRW".to_string(),
        };

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("chart.png");
        let err =
            StaticChartRenderer::render_comparison_png(&view, &path, 800, 600).unwrap_err();
        assert!(matches!(err, RenderError::EmptySeries(ref label) if label == "EUR/KRW"));
        assert!(!path.exists());
    }
}
