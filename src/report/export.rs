use crate::domain::model::{AnalysisResult, BuildingReading, BuildingSummary};
use crate::utils::error::{EtlError, Result};
use serde::Serialize;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const SEPARATOR: &str = "---------------------------------";

#[derive(Serialize)]
struct CleanedRow<'a> {
    timestamp: String,
    kwh: f64,
    building: &'a str,
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))
}

/// `timestamp,kwh,building`, one row per reading in merged order.
pub fn cleaned_data_csv(readings: &[BuildingReading]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in readings {
        writer.serialize(CleanedRow {
            timestamp: row.reading.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            kwh: row.reading.kwh,
            building: &row.building,
        })?;
    }
    writer.flush()?;
    finish_csv(writer)
}

pub fn building_summary_csv(summaries: &[BuildingSummary]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for summary in summaries {
        writer.serialize(summary)?;
    }
    writer.flush()?;
    finish_csv(writer)
}

pub fn building_summary_json(summaries: &[BuildingSummary]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(summaries)?)
}

/// 純文字摘要報告
pub fn summary_report(result: &AnalysisResult, sample_size: usize) -> String {
    let mut lines = vec![
        "Campus Energy Dashboard Summary".to_string(),
        SEPARATOR.to_string(),
        format!("Total Campus Consumption: {:.2} kWh", result.total_kwh),
        format!(
            "Highest Consuming Building: {}",
            result.highest_consumer.as_deref().unwrap_or("n/a")
        ),
    ];

    match &result.peak_load {
        Some(peak) => lines.push(format!(
            "Peak Load Time: {} ({}, {:.2} kWh)",
            peak.timestamp.format(TIMESTAMP_FORMAT),
            peak.building,
            peak.kwh
        )),
        None => lines.push("Peak Load Time: n/a".to_string()),
    }

    lines.push(format!("Buildings: {}", result.building_summaries.len()));
    lines.push(format!("Readings: {}", result.readings.len()));
    if let Some((first, last)) = result.date_range() {
        lines.push(format!("Date Range: {} to {}", first, last));
    }

    lines.push(String::new());
    lines.push("Daily Trend Sample:".to_string());
    for day in result.daily_totals.iter().take(sample_size) {
        lines.push(format!("  {}  {:.2} kWh", day.date, day.kwh));
    }

    lines.push(String::new());
    lines.push("Weekly Trend Sample:".to_string());
    for week in result.weekly_aggregates.iter().take(sample_size) {
        lines.push(format!(
            "  week ending {}  {:.2} kWh ({:.2} kWh/day over {} day(s))",
            week.week_ending, week.total_kwh, week.mean_daily_kwh, week.days
        ));
    }

    lines.push(String::new());
    lines.push("Building Reports:".to_string());
    lines.extend(result.building_reports.iter().cloned());

    if !result.skipped_files.is_empty() {
        lines.push(String::new());
        lines.push("Skipped Files:".to_string());
        for skipped in &result.skipped_files {
            lines.push(format!("  {}: {}", skipped.file, skipped.reason));
        }
    }

    let mut report = lines.join("\n");
    report.push('\n');
    report
}

/// Bundles already rendered artifacts into a single ZIP.
pub fn bundle_archive(files: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    for (name, data) in files {
        zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
        zip.write_all(data)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
