//! Reading per-building meter files into one merged, time-ordered table.

use crate::core::Storage;
use crate::domain::model::{BuildingReading, FileLoadReport, IngestResult, MeterReading, SkippedFile};
use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::path::Path;

pub const TIMESTAMP_COLUMN: &str = "timestamp";
pub const KWH_COLUMN: &str = "kwh";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Rows kept from one file, plus how many were thrown away.
#[derive(Debug, Clone, Default)]
pub struct ParsedFile {
    pub readings: Vec<MeterReading>,
    pub rows_dropped: usize,
}

/// Building name is the file stem: `data/Library.csv` -> `Library`.
pub fn building_name_from_path(file: &str) -> String {
    Path::new(file)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file)
        .to_string()
}

/// Lenient timestamp parsing. Offsets are dropped and wall-clock time kept;
/// a bare date means midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

pub fn parse_kwh(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().trim_start_matches('\u{feff}').eq_ignore_ascii_case(name))
}

/// Parses one building's CSV. A missing `timestamp` or `kwh` column rejects
/// the whole file; malformed lines and unparseable values only drop the row.
pub fn parse_building_csv(data: &[u8]) -> Result<ParsedFile> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let timestamp_idx = column_index(&headers, TIMESTAMP_COLUMN).ok_or_else(|| {
        EtlError::ValidationError {
            message: format!("missing {} column", TIMESTAMP_COLUMN),
        }
    })?;
    let kwh_idx = column_index(&headers, KWH_COLUMN).ok_or_else(|| EtlError::ValidationError {
        message: format!("missing {} column", KWH_COLUMN),
    })?;

    let mut parsed = ParsedFile::default();

    for (line, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!("Skipping bad line {}: {}", line + 2, e);
                parsed.rows_dropped += 1;
                continue;
            }
        };

        let timestamp = record.get(timestamp_idx).and_then(parse_timestamp);
        let kwh = record.get(kwh_idx).and_then(parse_kwh);

        match (timestamp, kwh) {
            (Some(timestamp), Some(kwh)) => parsed.readings.push(MeterReading { timestamp, kwh }),
            _ => parsed.rows_dropped += 1,
        }
    }

    Ok(parsed)
}

/// Reads every file through `storage`. Files that cannot be read or parsed
/// are logged and skipped; the merged rows come back sorted by timestamp.
pub async fn load_all_building_data<S: Storage>(storage: &S, files: &[String]) -> Result<IngestResult> {
    let mut result = IngestResult::default();
    tracing::info!("Starting data ingestion of {} file(s)...", files.len());

    for file in files {
        let building = building_name_from_path(file);

        let parsed = match storage.read_file(file).await {
            Ok(data) => parse_building_csv(&data),
            Err(e) => Err(e),
        };

        match parsed {
            Ok(parsed) => {
                if parsed.readings.is_empty() {
                    tracing::warn!("⚠️ {} has no valid readings", file);
                }
                if parsed.rows_dropped > 0 {
                    tracing::warn!("⚠️ Dropped {} invalid row(s) from {}", parsed.rows_dropped, file);
                }
                tracing::debug!("Loaded {} reading(s) for {}", parsed.readings.len(), building);

                result.loaded_files.push(FileLoadReport {
                    file: file.clone(),
                    building: building.clone(),
                    rows_loaded: parsed.readings.len(),
                    rows_dropped: parsed.rows_dropped,
                });
                result.readings.extend(parsed.readings.into_iter().map(|reading| BuildingReading {
                    building: building.clone(),
                    reading,
                }));
            }
            Err(e) => {
                tracing::warn!("⚠️ Skipping {}: {}", file, e);
                result.skipped_files.push(SkippedFile {
                    file: file.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    if result.readings.is_empty() {
        return Err(EtlError::NoValidInput {
            message: format!(
                "no valid readings in {} file(s), {} skipped",
                files.len(),
                result.skipped_files.len()
            ),
        });
    }

    // stable: equal timestamps keep file order
    result.readings.sort_by_key(|r| r.reading.timestamp);

    tracing::info!(
        "Data ingestion completed: {} reading(s) from {} building file(s)",
        result.readings.len(),
        result.loaded_files.len()
    );
    Ok(result)
}
