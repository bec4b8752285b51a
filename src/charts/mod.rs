//! Charts module - Chart rendering

mod plotter;
mod renderer;

pub use plotter::ChartPlotter;
pub use renderer::StaticChartRenderer;

use chrono::{Datelike, NaiveDate};

/// Plot x coordinate of a date (days from the common era).
pub fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// Inverse of [`date_to_x`], rounding to the nearest day.
pub fn x_to_date(x: f64) -> Option<NaiveDate> {
    if !x.is_finite() || x.abs() > i32::MAX as f64 {
        return None;
    }
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

/// `YYYY-MM` tick label for an x coordinate.
pub fn format_month_tick(x: f64) -> String {
    x_to_date(x)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_axis_conversion() {
        let date = NaiveDate::from_ymd_opt(2023, 2, 1).unwrap();
        assert_eq!(x_to_date(date_to_x(date)), Some(date));
        assert_eq!(x_to_date(date_to_x(date) + 0.4), Some(date));
        assert_eq!(format_month_tick(date_to_x(date)), "2023-02");
        assert_eq!(x_to_date(f64::NAN), None);
        assert_eq!(format_month_tick(f64::INFINITY), "");
    }
}
