use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 單筆電表讀數
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeterReading {
    pub timestamp: NaiveDateTime,
    pub kwh: f64,
}

/// 合併後資料表的一列：讀數加上所屬建築
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingReading {
    pub building: String,
    pub reading: MeterReading,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileLoadReport {
    pub file: String,
    pub building: String,
    pub rows_loaded: usize,
    pub rows_dropped: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedFile {
    pub file: String,
    pub reason: String,
}

/// Extract 階段的產出
#[derive(Debug, Clone, Default)]
pub struct IngestResult {
    pub readings: Vec<BuildingReading>,
    pub loaded_files: Vec<FileLoadReport>,
    pub skipped_files: Vec<SkippedFile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub kwh: f64,
}

/// Monday..=Sunday bucket, labelled by its closing Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeeklyAggregate {
    pub week_ending: NaiveDate,
    pub total_kwh: f64,
    pub days: usize,
    pub mean_daily_kwh: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingSummary {
    pub building: String,
    pub readings: usize,
    pub mean_kwh: f64,
    pub min_kwh: f64,
    pub max_kwh: f64,
    pub total_kwh: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingWeeklyAverage {
    pub building: String,
    pub weeks: usize,
    pub average_weekly_kwh: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakLoad {
    pub building: String,
    pub timestamp: NaiveDateTime,
    pub kwh: f64,
}

/// Transform 階段的產出，Load 階段需要的全部資料
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub readings: Vec<BuildingReading>,
    pub daily_totals: Vec<DailyTotal>,
    pub weekly_aggregates: Vec<WeeklyAggregate>,
    pub building_summaries: Vec<BuildingSummary>,
    pub weekly_averages: Vec<BuildingWeeklyAverage>,
    pub peak_readings: Vec<BuildingReading>,
    pub peak_load: Option<PeakLoad>,
    pub total_kwh: f64,
    pub highest_consumer: Option<String>,
    pub building_reports: Vec<String>,
    pub loaded_files: Vec<FileLoadReport>,
    pub skipped_files: Vec<SkippedFile>,
}

impl AnalysisResult {
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.daily_totals.first()?;
        let last = self.daily_totals.last()?;
        Some((first.date, last.date))
    }
}

#[derive(Debug, Clone)]
pub struct Building {
    pub name: String,
    pub meter_readings: Vec<MeterReading>,
}

impl Building {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meter_readings: Vec::new(),
        }
    }

    pub fn add_reading(&mut self, reading: MeterReading) {
        self.meter_readings.push(reading);
    }

    pub fn calculate_total_consumption(&self) -> f64 {
        self.meter_readings.iter().map(|r| r.kwh).sum()
    }

    pub fn generate_report(&self) -> String {
        format!(
            "Building: {} | Total Consumption: {:?} kWh",
            self.name,
            self.calculate_total_consumption()
        )
    }

    /// Returns `None` for a building without readings.
    pub fn summary(&self) -> Option<BuildingSummary> {
        let first = self.meter_readings.first()?;
        let (min_kwh, max_kwh) = self
            .meter_readings
            .iter()
            .fold((first.kwh, first.kwh), |(min, max), r| {
                (min.min(r.kwh), max.max(r.kwh))
            });
        let total_kwh = self.calculate_total_consumption();
        let readings = self.meter_readings.len();

        Some(BuildingSummary {
            building: self.name.clone(),
            readings,
            mean_kwh: total_kwh / readings as f64,
            min_kwh,
            max_kwh,
            total_kwh,
        })
    }
}

/// 依名稱排序保存所有建築
#[derive(Debug, Clone, Default)]
pub struct BuildingManager {
    buildings: BTreeMap<String, Building>,
}

impl BuildingManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_readings(readings: &[BuildingReading]) -> Self {
        let mut manager = Self::new();
        for row in readings {
            manager.add_reading(&row.building, row.reading.timestamp, row.reading.kwh);
        }
        manager
    }

    pub fn add_reading(&mut self, building_name: &str, timestamp: NaiveDateTime, kwh: f64) {
        self.buildings
            .entry(building_name.to_string())
            .or_insert_with(|| Building::new(building_name))
            .add_reading(MeterReading { timestamp, kwh });
    }

    pub fn buildings(&self) -> impl Iterator<Item = &Building> {
        self.buildings.values()
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    pub fn generate_all_reports(&self) -> Vec<String> {
        self.buildings.values().map(Building::generate_report).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_building_totals_and_report() {
        let mut building = Building::new("Library");
        building.add_reading(MeterReading { timestamp: at(1, 0), kwh: 10.5 });
        building.add_reading(MeterReading { timestamp: at(1, 1), kwh: 4.5 });

        assert_eq!(building.calculate_total_consumption(), 15.0);
        assert_eq!(
            building.generate_report(),
            "Building: Library | Total Consumption: 15.0 kWh"
        );
    }

    #[test]
    fn test_building_summary_statistics() {
        let mut building = Building::new("Gym");
        for (hour, kwh) in [(0, 2.0), (1, 8.0), (2, 5.0)] {
            building.add_reading(MeterReading { timestamp: at(2, hour), kwh });
        }

        let summary = building.summary().unwrap();
        assert_eq!(summary.readings, 3);
        assert_eq!(summary.min_kwh, 2.0);
        assert_eq!(summary.max_kwh, 8.0);
        assert_eq!(summary.total_kwh, 15.0);
        assert_eq!(summary.mean_kwh, 5.0);

        assert!(Building::new("Empty").summary().is_none());
    }

    #[test]
    fn test_manager_groups_by_building_in_name_order() {
        let mut manager = BuildingManager::new();
        manager.add_reading("Science", at(1, 0), 3.0);
        manager.add_reading("Admin", at(1, 0), 1.0);
        manager.add_reading("Science", at(1, 1), 4.0);

        assert_eq!(manager.len(), 2);
        assert!(!manager.is_empty());
        let science = manager.buildings().find(|b| b.name == "Science").unwrap();
        assert_eq!(science.meter_readings.len(), 2);
        assert_eq!(
            manager.generate_all_reports(),
            vec![
                "Building: Admin | Total Consumption: 1.0 kWh".to_string(),
                "Building: Science | Total Consumption: 7.0 kWh".to_string(),
            ]
        );
    }
}
