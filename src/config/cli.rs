use crate::core::ConfigProvider;
use crate::report::{ChartFormat, CHART_FORMATS, DEFAULT_ARCHIVE_FILE, SUMMARY_FORMATS};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "campus-energy-dashboard")]
#[command(about = "Aggregate building meter CSVs into a campus energy dashboard")]
pub struct CliConfig {
    #[arg(long, default_value = "data", help = "Folder holding one CSV per building")]
    pub data_dir: String,

    #[arg(long, default_value = "output")]
    pub output_dir: String,

    #[arg(long, default_value = "csv", help = "Extension of meter files")]
    pub file_extension: String,

    #[arg(long, default_value = "200", help = "Readings plotted in the peak scatter")]
    pub peak_readings: usize,

    #[arg(long, default_value = "5", help = "Days/weeks listed in summary.txt")]
    pub trend_sample_size: usize,

    #[arg(long, value_delimiter = ',', default_value = "csv")]
    pub summary_formats: Vec<String>,

    #[arg(long, default_value = "png")]
    pub chart_format: String,

    #[arg(long, default_value = "1500")]
    pub chart_width: u32,

    #[arg(long, default_value = "1200")]
    pub chart_height: u32,

    #[arg(long, help = "Also bundle every output into energy_report.zip")]
    pub archive: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory use per phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl ConfigProvider for CliConfig {
    fn data_dir(&self) -> &str {
        &self.data_dir
    }

    fn output_dir(&self) -> &str {
        &self.output_dir
    }

    fn file_extension(&self) -> &str {
        &self.file_extension
    }

    fn peak_readings(&self) -> usize {
        self.peak_readings
    }

    fn trend_sample_size(&self) -> usize {
        self.trend_sample_size
    }

    fn summary_formats(&self) -> &[String] {
        &self.summary_formats
    }

    fn chart_format(&self) -> ChartFormat {
        self.chart_format.parse().unwrap_or_default()
    }

    fn chart_size(&self) -> (u32, u32) {
        (self.chart_width, self.chart_height)
    }

    fn archive_filename(&self) -> Option<&str> {
        self.archive.then_some(DEFAULT_ARCHIVE_FILE)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("data_dir", &self.data_dir)?;
        validation::validate_path("output_dir", &self.output_dir)?;
        validation::validate_file_extension("file_extension", &self.file_extension)?;
        validation::validate_positive_number("peak_readings", self.peak_readings, 1)?;
        validation::validate_positive_number("trend_sample_size", self.trend_sample_size, 1)?;
        validation::validate_allowed_values("summary_formats", &self.summary_formats, SUMMARY_FORMATS)?;
        validation::validate_allowed_values(
            "chart_format",
            std::slice::from_ref(&self.chart_format),
            CHART_FORMATS,
        )?;
        validation::validate_range("chart_width", self.chart_width, 200, 8000)?;
        validation::validate_range("chart_height", self.chart_height, 200, 8000)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CliConfig::parse_from(["campus-energy-dashboard"]);

        assert_eq!(config.data_dir(), "data");
        assert_eq!(config.output_dir(), "output");
        assert_eq!(config.peak_readings(), 200);
        assert_eq!(config.trend_sample_size(), 5);
        assert_eq!(config.summary_formats(), &["csv".to_string()]);
        assert_eq!(config.chart_format(), ChartFormat::Png);
        assert_eq!(config.chart_size(), (1500, 1200));
        assert_eq!(config.archive_filename(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = CliConfig::parse_from([
            "campus-energy-dashboard",
            "--data-dir",
            "meters",
            "--summary-formats",
            "csv,json",
            "--chart-format",
            "svg",
            "--archive",
        ]);

        assert_eq!(config.data_dir(), "meters");
        assert_eq!(config.summary_formats().len(), 2);
        assert_eq!(config.chart_format(), ChartFormat::Svg);
        assert_eq!(config.archive_filename(), Some("energy_report.zip"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let config = CliConfig::parse_from(["campus-energy-dashboard", "--chart-format", "gif"]);
        assert!(config.validate().is_err());

        let config = CliConfig::parse_from(["campus-energy-dashboard", "--peak-readings", "0"]);
        assert!(config.validate().is_err());

        let config = CliConfig::parse_from(["campus-energy-dashboard", "--chart-width", "50"]);
        assert!(config.validate().is_err());
    }
}
