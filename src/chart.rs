use std::path::Path;

use chrono::NaiveDate;
use plotters::prelude::*;

use crate::error::ReportError;

/// Chart dimensions in pixels.
#[derive(Clone, Debug)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// Renders the per-day sales totals as a bar chart PNG at `path`.
///
/// Axis labels and captions are intentionally absent: the crate builds
/// plotters without a font backend (see Cargo.toml), and drawing text
/// without one fails at runtime. The chart carries one bar per day in
/// range order.
pub fn save_sales_chart(daily: &[(NaiveDate, f64)], path: &Path) -> Result<(), ReportError> {
    save_sales_chart_sized(daily, path, &ChartOptions::default())
}

pub fn save_sales_chart_sized(
    daily: &[(NaiveDate, f64)],
    path: &Path,
    options: &ChartOptions,
) -> Result<(), ReportError> {
    if daily.is_empty() {
        return Err(ReportError::Chart("no data points to plot".to_string()));
    }

    draw(daily, path, options).map_err(|e| ReportError::Chart(e.to_string()))
}

fn draw(
    daily: &[(NaiveDate, f64)],
    path: &Path,
    options: &ChartOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_y = daily.iter().map(|(_, y)| *y).fold(f64::MIN, f64::max);
    let min_y = daily.iter().map(|(_, y)| *y).fold(0.0, f64::min);
    let head = if max_y > 0.0 { max_y * 1.05 } else { 1.0 };

    let x_range = -0.5..daily.len() as f64 - 0.5;
    let y_range = min_y..head;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .build_cartesian_2d(x_range, y_range)?;

    chart.draw_series(daily.iter().enumerate().map(|(i, (_, total))| {
        Rectangle::new([(i as f64 - 0.35, 0.0), (i as f64 + 0.35, *total)], BLUE.filled())
    }))?;

    // Baseline at zero so negative days (refunds) read correctly.
    chart.draw_series(LineSeries::new(
        vec![(-0.5, 0.0), (daily.len() as f64 - 0.5, 0.0)],
        &BLACK,
    ))?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn writes_a_png_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chart.png");
        let daily = vec![(date("2024-01-01"), 100.0), (date("2024-01-02"), 200.0)];

        save_sales_chart(&daily, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(!bytes.is_empty());
        // PNG signature
        assert_eq!(&bytes[..4], b"\x89PNG");
    }

    #[test]
    fn refuses_empty_series() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chart.png");
        assert!(save_sales_chart(&[], &path).is_err());
    }

    #[test]
    fn handles_negative_totals() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chart.png");
        let daily = vec![(date("2024-01-01"), -50.0), (date("2024-01-02"), 75.0)];
        save_sales_chart(&daily, &path).unwrap();
        assert!(path.exists());
    }
}
