use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data source error at '{path}': {message}")]
    DataSourceError { path: String, message: String },

    #[error("No valid input: {message}")]
    NoValidInput { message: String },

    #[error("Dashboard rendering failed: {message}")]
    RenderError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Processing,
    Output,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            EtlError::DataSourceError { .. }
            | EtlError::NoValidInput { .. }
            | EtlError::CsvError(_)
            | EtlError::ValidationError { .. } => ErrorCategory::Input,
            EtlError::SerializationError(_) => ErrorCategory::Processing,
            EtlError::RenderError { .. } | EtlError::ZipError(_) => ErrorCategory::Output,
            EtlError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::ValidationError { .. } => ErrorSeverity::Low,
            EtlError::NoValidInput { .. } | EtlError::DataSourceError { .. } => {
                ErrorSeverity::Medium
            }
            EtlError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// 依嚴重程度決定程式結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::DataSourceError { path, .. } => {
                format!("Data folder not found: {}", path)
            }
            EtlError::NoValidInput { message } => {
                format!("No data available ({}). Ending program.", message)
            }
            EtlError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting for {}: {}", field, reason)
            }
            EtlError::RenderError { .. } => "Could not draw the dashboard".to_string(),
            EtlError::IoError(e) => format!("File system error: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the command line flags or the TOML configuration file"
            }
            ErrorCategory::Input => {
                "Make sure the data folder holds CSV files with 'timestamp' and 'kwh' columns"
            }
            ErrorCategory::Processing => "Inspect the input data for unexpected values",
            ErrorCategory::Output => "Check the chart settings and the output folder",
            ErrorCategory::System => "Check file permissions and free disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_is_medium_severity() {
        let err = EtlError::NoValidInput {
            message: "no csv files".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert_eq!(err.exit_code(), 2);
        assert!(err.user_friendly_message().contains("no csv files"));
    }

    #[test]
    fn test_config_errors_share_category() {
        let err = EtlError::InvalidConfigValueError {
            field: "output.chart.format".to_string(),
            value: "gif".to_string(),
            reason: "unsupported".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("gif"));
    }

    #[test]
    fn test_io_error_is_critical() {
        let err: EtlError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.exit_code(), 3);
    }
}
