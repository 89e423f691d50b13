use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use printpdf::image_crate::codecs::png::PngDecoder;
use printpdf::{BuiltinFont, Image, ImageTransform, Mm, PdfDocument};

use crate::error::ReportError;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const LINE_HEIGHT_MM: f32 = 5.5;
const CHART_DPI: f32 = 200.0;

/// Renders the report text and its chart into a PDF in the reports
/// directory, named by the caller-supplied date-range label.
///
/// Fails with [`ReportError::Render`] when a chart path is supplied but the
/// file is missing. A report without a chart (empty range) still renders.
pub fn render_with_chart(
    report_text: &str,
    chart_path: Option<&Path>,
    label: &str,
    reports_dir: &Path,
) -> Result<PathBuf, ReportError> {
    if report_text.trim().is_empty() {
        return Err(ReportError::Render("report text is empty".to_string()));
    }
    if let Some(chart) = chart_path {
        if !chart.exists() {
            return Err(ReportError::Render(format!(
                "chart image not found: {}",
                chart.display()
            )));
        }
    }

    std::fs::create_dir_all(reports_dir)
        .map_err(|e| ReportError::Render(format!("cannot create reports directory: {}", e)))?;
    let pdf_path = reports_dir.join(format!("sales_{}.pdf", label));

    render(report_text, chart_path, &pdf_path).map_err(|e| ReportError::Render(e.to_string()))?;
    Ok(pdf_path)
}

fn render(
    report_text: &str,
    chart_path: Option<&Path>,
    pdf_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        "Sales Report",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let font = doc.add_builtin_font(BuiltinFont::Courier)?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    let mut y = PAGE_HEIGHT_MM - MARGIN_MM;

    for line in report_text.lines() {
        if y < MARGIN_MM {
            let (page, layer_idx) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            layer = doc.get_page(page).get_layer(layer_idx);
            y = PAGE_HEIGHT_MM - MARGIN_MM;
        }
        layer.use_text(line, 11.0, Mm(MARGIN_MM), Mm(y), &font);
        y -= LINE_HEIGHT_MM;
    }

    if let Some(chart) = chart_path {
        let mut reader = std::io::BufReader::new(File::open(chart)?);
        let image = Image::try_from(PngDecoder::new(&mut reader)?)?;

        // 800x600 px at 200 dpi lands at roughly 102x76 mm.
        let image_height_mm =
            image.image.height.0 as f32 / CHART_DPI * 25.4;
        if y - image_height_mm < MARGIN_MM {
            let (page, layer_idx) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            layer = doc.get_page(page).get_layer(layer_idx);
            y = PAGE_HEIGHT_MM - MARGIN_MM;
        }
        image.add_to_layer(
            layer,
            ImageTransform {
                translate_x: Some(Mm(MARGIN_MM)),
                translate_y: Some(Mm(y - image_height_mm)),
                dpi: Some(CHART_DPI),
                ..Default::default()
            },
        );
    }

    doc.save(&mut BufWriter::new(File::create(pdf_path)?))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    #[test]
    fn renders_text_only_report() {
        let dir = tempdir().unwrap();
        let path = render_with_chart(
            "Sales Report: 2024-06-01 to 2024-06-30\nNo sales data found in this date range.\n",
            None,
            "2024-06-01to2024-06-30",
            dir.path(),
        )
        .unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..5], b"%PDF-");
        assert!(path.file_name().unwrap().to_str().unwrap().contains("2024-06-01to2024-06-30"));
    }

    #[test]
    fn embeds_chart_when_present() {
        let dir = tempdir().unwrap();
        let chart_path = dir.path().join("chart.png");
        let daily = vec![
            (NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 100.0),
            (NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), 200.0),
        ];
        chart::save_sales_chart(&daily, &chart_path).unwrap();

        let path = render_with_chart(
            "Total sales: 300.00",
            Some(&chart_path),
            "2024-01-01to2024-01-02",
            dir.path(),
        )
        .unwrap();

        assert!(path.exists());
        // Embedded bitmap makes the document substantially larger than text alone.
        assert!(std::fs::metadata(&path).unwrap().len() > 1000);
    }

    #[test]
    fn missing_chart_input_fails() {
        let dir = tempdir().unwrap();
        let err = render_with_chart(
            "Total sales: 300.00",
            Some(&dir.path().join("nope.png")),
            "x",
            dir.path(),
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::Render(_)));
        assert!(err.to_string().contains("nope.png"));
    }

    #[test]
    fn blank_text_fails() {
        let dir = tempdir().unwrap();
        assert!(render_with_chart("   \n", None, "x", dir.path()).is_err());
    }

    #[test]
    fn long_reports_paginate() {
        let dir = tempdir().unwrap();
        let mut text = String::from("Sales Report\n");
        for i in 0..120 {
            text.push_str(&format!("  2024-01-01  {:>12.2}\n", i as f64));
        }
        let path = render_with_chart(&text, None, "long", dir.path()).unwrap();
        assert!(path.exists());
    }
}
