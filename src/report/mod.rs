pub mod dashboard;
pub mod export;

use crate::utils::error::EtlError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const CLEANED_DATA_FILE: &str = "cleaned_energy_data.csv";
pub const SUMMARY_CSV_FILE: &str = "building_summary.csv";
pub const SUMMARY_JSON_FILE: &str = "building_summary.json";
pub const SUMMARY_TEXT_FILE: &str = "summary.txt";
pub const DASHBOARD_STEM: &str = "dashboard";
pub const DEFAULT_ARCHIVE_FILE: &str = "energy_report.zip";

pub const SUMMARY_FORMATS: &[&str] = &["csv", "json"];
pub const CHART_FORMATS: &[&str] = &["png", "svg"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartFormat {
    #[default]
    Png,
    Svg,
}

impl ChartFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ChartFormat::Png => "png",
            ChartFormat::Svg => "svg",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", DASHBOARD_STEM, self.extension())
    }
}

impl fmt::Display for ChartFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ChartFormat {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ChartFormat::Png),
            "svg" => Ok(ChartFormat::Svg),
            other => Err(EtlError::InvalidConfigValueError {
                field: "chart_format".to_string(),
                value: other.to_string(),
                reason: format!("Unsupported chart format. Valid formats: {}", CHART_FORMATS.join(", ")),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_format_parsing() {
        assert_eq!("PNG".parse::<ChartFormat>().unwrap(), ChartFormat::Png);
        assert_eq!("svg".parse::<ChartFormat>().unwrap(), ChartFormat::Svg);
        assert!("gif".parse::<ChartFormat>().is_err());
        assert_eq!(ChartFormat::Svg.file_name(), "dashboard.svg");
    }
}
