//! Three-panel dashboard: daily trend, weekly average per building, and a
//! scatter of the highest readings.

use crate::domain::model::{AnalysisResult, BuildingReading, BuildingWeeklyAverage, DailyTotal};
use crate::report::ChartFormat;
use crate::utils::error::{EtlError, Result};
use chrono::{Days, Duration, NaiveDateTime};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};
use std::io::Cursor;
use std::sync::OnceLock;

const FONT_FAMILY: &str = "sans-serif";
const CAPTION_FONT: (&str, i32) = (FONT_FAMILY, 22);
const PEAK_COLOR: RGBColor = RGBColor(31, 119, 180);

/// DejaVu Sans, bundled so charts never depend on fonts installed on the host.
static EMBEDDED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
static FONT_REGISTERED: OnceLock<bool> = OnceLock::new();

/// plotters looks fonts up by family name; every text element on the
/// dashboard uses `sans-serif`, so that family must exist before drawing.
fn ensure_font() -> Result<()> {
    let registered = *FONT_REGISTERED
        .get_or_init(|| register_font(FONT_FAMILY, FontStyle::Normal, EMBEDDED_FONT).is_ok());
    if registered {
        Ok(())
    } else {
        Err(EtlError::RenderError {
            message: "embedded chart font could not be loaded".to_string(),
        })
    }
}

fn render_error<E: std::fmt::Display>(e: E) -> EtlError {
    EtlError::RenderError {
        message: e.to_string(),
    }
}

/// Renders the dashboard in memory and returns the encoded file bytes.
pub fn render_dashboard(result: &AnalysisResult, format: ChartFormat, size: (u32, u32)) -> Result<Vec<u8>> {
    let (width, height) = size;
    if width == 0 || height == 0 {
        return Err(EtlError::RenderError {
            message: format!("invalid chart size {}x{}", width, height),
        });
    }
    ensure_font()?;

    match format {
        ChartFormat::Png => render_png(result, width, height),
        ChartFormat::Svg => render_svg(result, width, height),
    }
}

fn render_png(result: &AnalysisResult, width: u32, height: u32) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        draw_dashboard(&root, result)?;
        root.present().map_err(render_error)?;
    }

    let image = image::RgbImage::from_raw(width, height, buffer).ok_or_else(|| EtlError::RenderError {
        message: "bitmap buffer does not match chart size".to_string(),
    })?;

    let mut encoded = Cursor::new(Vec::new());
    image
        .write_to(&mut encoded, image::ImageFormat::Png)
        .map_err(render_error)?;
    Ok(encoded.into_inner())
}

fn render_svg(result: &AnalysisResult, width: u32, height: u32) -> Result<Vec<u8>> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        draw_dashboard(&root, result)?;
        root.present().map_err(render_error)?;
    }
    Ok(svg.into_bytes())
}

fn draw_dashboard<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, result: &AnalysisResult) -> Result<()> {
    root.fill(&WHITE).map_err(render_error)?;

    let panels = root.split_evenly((3, 1));
    draw_daily_trend(&panels[0], &result.daily_totals)?;
    draw_weekly_averages(&panels[1], &result.weekly_averages)?;
    draw_peak_scatter(&panels[2], &result.peak_readings)?;
    Ok(())
}

/// Upper bound of the y axis with some headroom; never zero.
fn axis_max(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.fold(0.0_f64, f64::max);
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

fn draw_daily_trend<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, daily: &[DailyTotal]) -> Result<()> {
    let start = daily.first().map(|d| d.date);
    let x_max = (daily.len() as i64 - 1).max(1);
    let y_max = axis_max(daily.iter().map(|d| d.kwh));

    let mut chart = ChartBuilder::on(area)
        .caption("Daily Energy Consumption (All Buildings)", CAPTION_FONT)
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0i64..x_max, 0f64..y_max)
        .map_err(render_error)?;

    let date_label = |offset: &i64| {
        u64::try_from(*offset)
            .ok()
            .and_then(|days| start?.checked_add_days(Days::new(days)))
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    };

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("kWh")
        .x_labels(8)
        .x_label_formatter(&date_label)
        .draw()
        .map_err(render_error)?;

    chart
        .draw_series(LineSeries::new(
            daily.iter().enumerate().map(|(i, d)| (i as i64, d.kwh)),
            &BLUE,
        ))
        .map_err(render_error)?;
    Ok(())
}

fn draw_weekly_averages<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    averages: &[BuildingWeeklyAverage],
) -> Result<()> {
    let bars = averages.len().max(1) as i32;
    let y_max = axis_max(averages.iter().map(|a| a.average_weekly_kwh));

    let mut chart = ChartBuilder::on(area)
        .caption("Average Weekly Usage per Building", CAPTION_FONT)
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d((0..bars).into_segmented(), 0f64..y_max)
        .map_err(render_error)?;

    let building_label = |value: &SegmentValue<i32>| match value {
        SegmentValue::CenterOf(i) => usize::try_from(*i)
            .ok()
            .and_then(|i| averages.get(i))
            .map(|a| a.building.clone())
            .unwrap_or_default(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Building")
        .y_desc("Average Weekly kWh")
        .x_labels(averages.len().max(1))
        .x_label_formatter(&building_label)
        .draw()
        .map_err(render_error)?;

    chart
        .draw_series(averages.iter().enumerate().map(|(i, avg)| {
            let i = i as i32;
            let mut bar = Rectangle::new(
                [
                    (SegmentValue::Exact(i), 0.0),
                    (SegmentValue::Exact(i + 1), avg.average_weekly_kwh),
                ],
                GREEN.filled(),
            );
            bar.set_margin(0, 0, 8, 8);
            bar
        }))
        .map_err(render_error)?;
    Ok(())
}

fn draw_peak_scatter<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, peaks: &[BuildingReading]) -> Result<()> {
    let origin: Option<NaiveDateTime> = peaks.iter().map(|r| r.reading.timestamp).min();
    let minutes_from_origin =
        |ts: NaiveDateTime| origin.map(|o| (ts - o).num_minutes()).unwrap_or(0);

    let x_max = peaks
        .iter()
        .map(|r| minutes_from_origin(r.reading.timestamp))
        .max()
        .unwrap_or(0)
        .max(1);
    let y_max = axis_max(peaks.iter().map(|r| r.reading.kwh));

    let mut chart = ChartBuilder::on(area)
        .caption("Peak-hour Consumption Scatter Plot", CAPTION_FONT)
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0i64..x_max, 0f64..y_max)
        .map_err(render_error)?;

    let time_label = |minutes: &i64| {
        origin
            .map(|o| (o + Duration::minutes(*minutes)).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default()
    };

    chart
        .configure_mesh()
        .x_desc("Timestamp")
        .y_desc("kWh")
        .x_labels(6)
        .x_label_formatter(&time_label)
        .draw()
        .map_err(render_error)?;

    chart
        .draw_series(peaks.iter().map(|r| {
            Circle::new(
                (minutes_from_origin(r.reading.timestamp), r.reading.kwh),
                3,
                PEAK_COLOR.mix(0.6).filled(),
            )
        }))
        .map_err(render_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregate::analyse;
    use crate::domain::model::{IngestResult, MeterReading};
    use chrono::NaiveDate;

    fn sample_result() -> AnalysisResult {
        result_for_buildings("Admin", "Library")
    }

    fn result_for_buildings(first: &str, second: &str) -> AnalysisResult {
        let mut readings = Vec::new();
        for day in 1..=10 {
            for (building, kwh) in [(first, 12.0), (second, 20.0 + f64::from(day))] {
                readings.push(BuildingReading {
                    building: building.to_string(),
                    reading: MeterReading {
                        timestamp: NaiveDate::from_ymd_opt(2024, 2, day)
                            .unwrap()
                            .and_hms_opt(9, 0, 0)
                            .unwrap(),
                        kwh,
                    },
                });
            }
        }

        analyse(
            IngestResult {
                readings,
                ..Default::default()
            },
            5,
        )
    }

    #[test]
    fn test_render_png_produces_png_bytes() {
        let bytes = render_dashboard(&sample_result(), ChartFormat::Png, (600, 480)).unwrap();
        assert!(bytes.len() > 8);
        assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_render_png_draws_building_labels() {
        // 名稱排序相同，只有標籤文字不同
        let campus = render_dashboard(&result_for_buildings("Admin", "Library"), ChartFormat::Png, (600, 480)).unwrap();
        let renamed = render_dashboard(&result_for_buildings("Annex", "Lodge"), ChartFormat::Png, (600, 480)).unwrap();
        assert_ne!(campus, renamed);
    }

    #[test]
    fn test_render_png_at_default_size() {
        let bytes = render_dashboard(&sample_result(), ChartFormat::Png, (1500, 1200)).unwrap();
        let decoded = image::load_from_memory_with_format(&bytes, image::ImageFormat::Png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1500, 1200));
    }

    #[test]
    fn test_render_svg_contains_captions() {
        let bytes = render_dashboard(&sample_result(), ChartFormat::Svg, (600, 480)).unwrap();
        let svg = String::from_utf8(bytes).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Average Weekly Usage per Building"));
        assert!(svg.contains("Library"));
    }

    #[test]
    fn test_render_rejects_zero_size() {
        let err = render_dashboard(&sample_result(), ChartFormat::Png, (0, 480)).unwrap_err();
        assert!(matches!(err, EtlError::RenderError { .. }));
    }

    #[test]
    fn test_axis_max_has_floor() {
        assert_eq!(axis_max(std::iter::empty()), 1.0);
        assert_eq!(axis_max([0.0, 0.0].into_iter()), 1.0);
        assert!((axis_max([5.0, 10.0].into_iter()) - 11.0).abs() < 1e-9);
    }
}
