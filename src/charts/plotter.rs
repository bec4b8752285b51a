//! Chart Plotter Module
//! Creates interactive time-series charts using egui_plot.

use crate::charts::{date_to_x, format_month_tick, x_to_date};
use crate::compare::{ComparisonView, Selection};
use crate::data::TimeSeries;
use egui::Color32;
use egui_plot::{
    AxisHints, HPlacement, Legend, Line, LineStyle, Plot, PlotPoint, PlotPoints, Points,
};

pub const CPI_COLOR: Color32 = Color32::from_rgb(52, 152, 219); // Blue
pub const USD_COLOR: Color32 = Color32::from_rgb(231, 76, 60); // Red
pub const EUR_COLOR: Color32 = Color32::from_rgb(46, 204, 113); // Green

const CHART_HEIGHT: f32 = 420.0;

/// Affine map between two value ranges.
///
/// egui_plot has a single y coordinate system, so the secondary series of a
/// comparison is drawn through this mapping and its axis labels are the
/// inverse. The data itself is never rescaled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMapping {
    scale: f64,
    offset: f64,
}

impl AxisMapping {
    /// Map the `from` (min, max) range onto the `to` (min, max) range.
    pub fn between(from: (f64, f64), to: (f64, f64)) -> Self {
        let from_span = from.1 - from.0;
        let to_span = to.1 - to.0;
        let scale = if from_span.abs() > f64::EPSILON && to_span.abs() > f64::EPSILON {
            to_span / from_span
        } else {
            1.0
        };

        Self {
            scale,
            offset: to.0 - from.0 * scale,
        }
    }

    pub fn apply(&self, value: f64) -> f64 {
        value * self.scale + self.offset
    }

    pub fn invert(&self, value: f64) -> f64 {
        (value - self.offset) / self.scale
    }
}

/// Draws the dashboard charts.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Line color of an exchange-rate series.
    pub fn rate_color(selection: Selection) -> Color32 {
        match selection {
            Selection::Usd => USD_COLOR,
            Selection::Eur => EUR_COLOR,
        }
    }

    fn series_points(series: &TimeSeries, map: impl Fn(f64) -> f64) -> PlotPoints {
        series
            .points()
            .iter()
            .map(|p| [date_to_x(p.date), map(p.value)])
            .collect()
    }

    fn hover_label(name: &str, value: &PlotPoint) -> String {
        let date = x_to_date(value.x)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        if name.is_empty() {
            format!("{date}\n{:.2}", value.y)
        } else {
            format!("{name}\n{date}\n{:.2}", value.y)
        }
    }

    /// Both exchange rates on one KRW axis.
    pub fn draw_fx_trend(ui: &mut egui::Ui, usd: &TimeSeries, eur: &TimeSeries) {
        Plot::new("fx_trend")
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label("Date")
            .x_axis_formatter(|mark, _range| format_month_tick(mark.value))
            .y_axis_label("KRW")
            .label_formatter(Self::hover_label)
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(Self::series_points(usd, |v| v))
                        .color(USD_COLOR)
                        .width(1.5)
                        .name(usd.label()),
                );
                plot_ui.line(
                    Line::new(Self::series_points(eur, |v| v))
                        .color(EUR_COLOR)
                        .width(1.5)
                        .name(eur.label()),
                );
            });
    }

    /// CPI line with a marker per month.
    pub fn draw_cpi_trend(ui: &mut egui::Ui, cpi: &TimeSeries) {
        Plot::new("cpi_trend")
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label("Date")
            .x_axis_formatter(|mark, _range| format_month_tick(mark.value))
            .y_axis_label(cpi.label())
            .label_formatter(Self::hover_label)
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(Self::series_points(cpi, |v| v))
                        .color(CPI_COLOR)
                        .width(1.5)
                        .name(cpi.label()),
                );
                plot_ui.points(
                    Points::new(Self::series_points(cpi, |v| v))
                        .radius(3.0)
                        .color(CPI_COLOR),
                );
            });
    }

    /// CPI on the left axis, the selected rate dashed on an independent right axis.
    pub fn draw_comparison(ui: &mut egui::Ui, view: &ComparisonView, rate_color: Color32) {
        let (Some(primary_range), Some(secondary_range)) =
            (view.primary.value_range(), view.secondary.value_range())
        else {
            ui.label("No Data");
            return;
        };

        let mapping = AxisMapping::between(secondary_range, primary_range);

        let primary_axis = AxisHints::new_y().label(view.primary_axis.clone());
        let secondary_axis = AxisHints::new_y()
            .label(view.secondary_axis.clone())
            .placement(HPlacement::Right)
            .formatter(move |mark, _range| format!("{:.0}", mapping.invert(mark.value)));

        Plot::new("comparison")
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label("Date")
            .x_axis_formatter(|mark, _range| format_month_tick(mark.value))
            .custom_y_axes(vec![primary_axis, secondary_axis])
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(Self::series_points(&view.primary, |v| v))
                        .color(CPI_COLOR)
                        .width(2.0)
                        .name(&view.primary_axis),
                );
                plot_ui.line(
                    Line::new(Self::series_points(&view.secondary, |v| mapping.apply(v)))
                        .color(rate_color)
                        .width(1.5)
                        .style(LineStyle::dashed_dense())
                        .name(&view.secondary_axis),
                );
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_mapping_matches_ranges() {
        let mapping = AxisMapping::between((1200.0, 1400.0), (100.0, 110.0));
        assert!((mapping.apply(1200.0) - 100.0).abs() < 1e-9);
        assert!((mapping.apply(1400.0) - 110.0).abs() < 1e-9);
        assert!((mapping.apply(1300.0) - 105.0).abs() < 1e-9);
        assert!((mapping.invert(105.0) - 1300.0).abs() < 1e-9);
    }

    #[test]
    fn test_axis_mapping_degenerate_range() {
        let mapping = AxisMapping::between((1300.0, 1300.0), (100.0, 110.0));
        assert!((mapping.apply(1300.0) - 100.0).abs() < 1e-9);
        assert!((mapping.invert(100.0) - 1300.0).abs() < 1e-9);
    }

    #[test]
    fn test_rate_colors_differ() {
        assert_ne!(
            ChartPlotter::rate_color(Selection::Usd),
            ChartPlotter::rate_color(Selection::Eur)
        );
    }
}
