//! Time bucketing and per-building statistics over merged meter readings.

use crate::domain::model::{
    AnalysisResult, BuildingManager, BuildingReading, BuildingSummary, BuildingWeeklyAverage,
    DailyTotal, IngestResult, MeterReading, PeakLoad, WeeklyAggregate,
};
use chrono::{Datelike, Days, NaiveDate};
use std::collections::BTreeMap;

/// Sunday closing the Monday..=Sunday week that contains `date`.
pub fn week_ending(date: NaiveDate) -> NaiveDate {
    let offset = 6 - date.weekday().num_days_from_monday();
    date + Days::new(u64::from(offset))
}

/// Daily sums from the first to the last day seen. Days without readings
/// are present with zero.
pub fn daily_totals<'a, I>(readings: I) -> Vec<DailyTotal>
where
    I: IntoIterator<Item = &'a MeterReading>,
{
    let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for reading in readings {
        *buckets.entry(reading.timestamp.date()).or_default() += reading.kwh;
    }

    let (Some(&first), Some(&last)) = (buckets.keys().next(), buckets.keys().next_back()) else {
        return Vec::new();
    };

    first
        .iter_days()
        .take_while(|date| *date <= last)
        .map(|date| DailyTotal {
            date,
            kwh: buckets.get(&date).copied().unwrap_or(0.0),
        })
        .collect()
}

/// Folds contiguous daily totals into Sunday-ending weeks.
pub fn weekly_aggregates(daily: &[DailyTotal]) -> Vec<WeeklyAggregate> {
    let mut weeks: Vec<WeeklyAggregate> = Vec::new();

    for day in daily {
        let ending = week_ending(day.date);
        match weeks.last_mut() {
            Some(week) if week.week_ending == ending => {
                week.total_kwh += day.kwh;
                week.days += 1;
            }
            _ => weeks.push(WeeklyAggregate {
                week_ending: ending,
                total_kwh: day.kwh,
                days: 1,
                mean_daily_kwh: 0.0,
            }),
        }
    }

    for week in &mut weeks {
        week.mean_daily_kwh = week.total_kwh / week.days as f64;
    }
    weeks
}

pub fn building_summaries(manager: &BuildingManager) -> Vec<BuildingSummary> {
    manager.buildings().filter_map(|b| b.summary()).collect()
}

/// Mean of each building's weekly sums over that building's own date range.
pub fn weekly_average_per_building(manager: &BuildingManager) -> Vec<BuildingWeeklyAverage> {
    manager
        .buildings()
        .filter_map(|building| {
            let weeks = weekly_aggregates(&daily_totals(&building.meter_readings));
            if weeks.is_empty() {
                return None;
            }
            let total: f64 = weeks.iter().map(|w| w.total_kwh).sum();
            Some(BuildingWeeklyAverage {
                building: building.name.clone(),
                weeks: weeks.len(),
                average_weekly_kwh: total / weeks.len() as f64,
            })
        })
        .collect()
}

/// The `count` largest readings, highest first; ties stay in input order.
pub fn peak_readings(readings: &[BuildingReading], count: usize) -> Vec<BuildingReading> {
    let mut sorted = readings.to_vec();
    sorted.sort_by(|a, b| b.reading.kwh.total_cmp(&a.reading.kwh));
    sorted.truncate(count);
    sorted
}

/// First reading carrying the maximum kWh.
pub fn peak_load(readings: &[BuildingReading]) -> Option<PeakLoad> {
    let mut peak: Option<&BuildingReading> = None;
    for row in readings {
        if peak.map_or(true, |p| row.reading.kwh > p.reading.kwh) {
            peak = Some(row);
        }
    }

    peak.map(|row| PeakLoad {
        building: row.building.clone(),
        timestamp: row.reading.timestamp,
        kwh: row.reading.kwh,
    })
}

/// Building with the largest total; on a tie the first name wins.
pub fn highest_consumer(summaries: &[BuildingSummary]) -> Option<String> {
    let mut best: Option<&BuildingSummary> = None;
    for summary in summaries {
        if best.map_or(true, |b| summary.total_kwh > b.total_kwh) {
            best = Some(summary);
        }
    }
    best.map(|s| s.building.clone())
}

pub fn analyse(data: IngestResult, peak_count: usize) -> AnalysisResult {
    let manager = BuildingManager::from_readings(&data.readings);
    if manager.is_empty() {
        tracing::warn!("No building readings to aggregate");
    }

    let daily = daily_totals(data.readings.iter().map(|r| &r.reading));
    let weekly = weekly_aggregates(&daily);
    let summaries = building_summaries(&manager);
    let weekly_averages = weekly_average_per_building(&manager);
    let total_kwh = data.readings.iter().map(|r| r.reading.kwh).sum();

    tracing::debug!(
        "Aggregated {} day(s), {} week(s), {} building(s)",
        daily.len(),
        weekly.len(),
        manager.len()
    );

    AnalysisResult {
        peak_readings: peak_readings(&data.readings, peak_count),
        peak_load: peak_load(&data.readings),
        highest_consumer: highest_consumer(&summaries),
        building_reports: manager.generate_all_reports(),
        readings: data.readings,
        daily_totals: daily,
        weekly_aggregates: weekly,
        building_summaries: summaries,
        weekly_averages,
        total_kwh,
        loaded_files: data.loaded_files,
        skipped_files: data.skipped_files,
    }
}
