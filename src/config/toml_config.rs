use crate::core::ConfigProvider;
use crate::report::{ChartFormat, CHART_FORMATS, DEFAULT_ARCHIVE_FILE, SUMMARY_FORMATS};
use crate::utils::error::{EtlError, Result};
use crate::utils::logger::LOG_LEVELS;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_file_extension")]
    pub file_extension: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_peak_readings")]
    pub peak_readings: usize,
    #[serde(default = "default_trend_sample_size")]
    pub trend_sample_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_summary_formats")]
    pub summary_formats: Vec<String>,
    #[serde(default)]
    pub chart: ChartConfig,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_chart_format")]
    pub format: String,
    #[serde(default = "default_chart_width")]
    pub width: u32,
    #[serde(default = "default_chart_height")]
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_file_extension() -> String {
    "csv".to_string()
}

fn default_peak_readings() -> usize {
    200
}

fn default_trend_sample_size() -> usize {
    5
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_summary_formats() -> Vec<String> {
    vec!["csv".to_string()]
}

fn default_chart_format() -> String {
    "png".to_string()
}

fn default_chart_width() -> u32 {
    1500
}

fn default_chart_height() -> u32 {
    1200
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            file_extension: default_file_extension(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            peak_readings: default_peak_readings(),
            trend_sample_size: default_trend_sample_size(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            summary_formats: default_summary_formats(),
            chart: ChartConfig::default(),
            compression: None,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            format: default_chart_format(),
            width: default_chart_width(),
            height: default_chart_height(),
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("pipeline.name", &self.pipeline.name)?;
        validation::validate_path("input.data_dir", &self.input.data_dir)?;
        validation::validate_file_extension("input.file_extension", &self.input.file_extension)?;
        validation::validate_path("output.output_dir", &self.output.output_dir)?;

        validation::validate_positive_number("analysis.peak_readings", self.analysis.peak_readings, 1)?;
        validation::validate_positive_number(
            "analysis.trend_sample_size",
            self.analysis.trend_sample_size,
            1,
        )?;

        validation::validate_allowed_values(
            "output.summary_formats",
            &self.output.summary_formats,
            SUMMARY_FORMATS,
        )?;
        validation::validate_allowed_values(
            "output.chart.format",
            std::slice::from_ref(&self.output.chart.format),
            CHART_FORMATS,
        )?;
        validation::validate_range("output.chart.width", self.output.chart.width, 200, 8000)?;
        validation::validate_range("output.chart.height", self.output.chart.height, 200, 8000)?;

        if let Some(filename) = self.archive_filename() {
            validation::validate_path("output.compression.filename", filename)?;
        }

        if let Some(level) = self.monitoring.as_ref().and_then(|m| m.log_level.as_ref()) {
            validation::validate_allowed_values(
                "monitoring.log_level",
                std::slice::from_ref(level),
                LOG_LEVELS,
            )?;
        }

        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }
}

impl ConfigProvider for TomlConfig {
    fn data_dir(&self) -> &str {
        &self.input.data_dir
    }

    fn output_dir(&self) -> &str {
        &self.output.output_dir
    }

    fn file_extension(&self) -> &str {
        &self.input.file_extension
    }

    fn peak_readings(&self) -> usize {
        self.analysis.peak_readings
    }

    fn trend_sample_size(&self) -> usize {
        self.analysis.trend_sample_size
    }

    fn summary_formats(&self) -> &[String] {
        &self.output.summary_formats
    }

    fn chart_format(&self) -> ChartFormat {
        self.output.chart.format.parse().unwrap_or_default()
    }

    fn chart_size(&self) -> (u32, u32) {
        (self.output.chart.width, self.output.chart.height)
    }

    fn archive_filename(&self) -> Option<&str> {
        match &self.output.compression {
            Some(compression) if compression.enabled => {
                Some(compression.filename.as_deref().unwrap_or(DEFAULT_ARCHIVE_FILE))
            }
            _ => None,
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let toml_content = r#"
[pipeline]
name = "campus"
version = "1.0.0"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.data_dir(), "data");
        assert_eq!(config.output_dir(), "output");
        assert_eq!(config.file_extension(), "csv");
        assert_eq!(config.peak_readings(), 200);
        assert_eq!(config.trend_sample_size(), 5);
        assert_eq!(config.summary_formats(), &["csv".to_string()]);
        assert_eq!(config.chart_format(), ChartFormat::Png);
        assert_eq!(config.chart_size(), (1500, 1200));
        assert_eq!(config.archive_filename(), None);
        assert!(!config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[pipeline]
name = "campus-energy"
description = "Weekly facilities report"
version = "2.1.0"

[input]
data_dir = "./meters"
file_extension = "csv"

[analysis]
peak_readings = 50
trend_sample_size = 7

[output]
output_dir = "./reports"
summary_formats = ["csv", "json"]

[output.chart]
format = "svg"
width = 1200
height = 900

[output.compression]
enabled = true

[monitoring]
enabled = true
log_level = "debug"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.pipeline.name, "campus-energy");
        assert_eq!(config.data_dir(), "./meters");
        assert_eq!(config.peak_readings(), 50);
        assert_eq!(config.trend_sample_size(), 7);
        assert_eq!(config.summary_formats().len(), 2);
        assert_eq!(config.chart_format(), ChartFormat::Svg);
        assert_eq!(config.chart_size(), (1200, 900));
        assert_eq!(config.archive_filename(), Some("energy_report.zip"));
        assert!(config.monitoring_enabled());
        assert_eq!(config.log_level(), Some("debug"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CAMPUS_TEST_DATA_DIR", "/srv/meters");

        let toml_content = r#"
[pipeline]
name = "test"
version = "1.0"

[input]
data_dir = "${CAMPUS_TEST_DATA_DIR}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.data_dir(), "/srv/meters");

        std::env::remove_var("CAMPUS_TEST_DATA_DIR");
    }

    #[test]
    fn test_unset_env_var_is_left_in_place() {
        let toml_content = r#"
[pipeline]
name = "test"
version = "1.0"

[output]
output_dir = "${CAMPUS_TEST_SURELY_UNSET}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.output_dir(), "${CAMPUS_TEST_SURELY_UNSET}");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[pipeline]
name = "test"
version = "1.0"

[output]
summary_formats = ["xlsx"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let toml_content = r#"
[pipeline]
name = "test"
version = "1.0"

[output.chart]
format = "gif"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_level_validation() {
        let with_level = |level: &str| {
            TomlConfig::from_toml_str(&format!(
                "[pipeline]\nname = \"test\"\nversion = \"1.0\"\n\n[monitoring]\nenabled = false\nlog_level = \"{}\"\n",
                level
            ))
            .unwrap()
        };

        assert!(with_level("warn").validate().is_ok());
        assert!(with_level("TRACE").validate().is_ok());
        let err = with_level("loud").validate().unwrap_err();
        assert!(matches!(
            err,
            EtlError::InvalidConfigValueError { ref field, .. } if field == "monitoring.log_level"
        ));
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = TomlConfig::from_toml_str("[pipeline\nname = ").unwrap_err();
        assert!(matches!(err, EtlError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[pipeline]
name = "file-test"
version = "1.0"

[output.compression]
enabled = true
filename = "weekly.zip"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.pipeline.name, "file-test");
        assert_eq!(config.archive_filename(), Some("weekly.zip"));
    }
}
