use thiserror::Error;

#[derive(Error, Debug)]
pub enum GanzhiError {
    #[error("Lunar lookup failed for {date}: {reason}")]
    ProviderLookup { date: String, reason: String },

    #[error("Unknown {kind} symbol: {symbol}")]
    SymbolLookup { kind: &'static str, symbol: String },

    #[error("Invalid pillar {stem}{branch}: stem and branch parity differ")]
    InvalidPillar { stem: String, branch: String },

    #[error("Invalid civil moment: {message}")]
    InvalidMoment { message: String },

    #[error("Calendar table error at line {line}: {message}")]
    TableError { line: u64, message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigError { field: String, message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    ValidationError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Calendar,
    Input,
    Storage,
    Configuration,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl GanzhiError {
    pub fn provider_lookup(year: i32, month: u32, day: u32, reason: impl Into<String>) -> Self {
        Self::ProviderLookup {
            date: format!("{:04}-{:02}-{:02}", year, month, day),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ProviderLookup { .. }
            | Self::SymbolLookup { .. }
            | Self::InvalidPillar { .. }
            | Self::TableError { .. } => ErrorCategory::Calendar,
            Self::InvalidMoment { .. } => ErrorCategory::Input,
            Self::CsvError(_) | Self::IoError(_) | Self::SerializationError(_) => {
                ErrorCategory::Storage
            }
            Self::ConfigError { .. } | Self::ValidationError { .. } => {
                ErrorCategory::Configuration
            }
            Self::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidMoment { .. } | Self::ProviderLookup { .. } => ErrorSeverity::Medium,
            Self::SymbolLookup { .. }
            | Self::InvalidPillar { .. }
            | Self::TableError { .. }
            | Self::ConfigError { .. }
            | Self::ValidationError { .. }
            | Self::ProcessingError { .. }
            | Self::CsvError(_) => ErrorSeverity::High,
            Self::IoError(_) | Self::SerializationError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Calendar => {
                "Check that the calendar table covers the requested dates and uses valid stem-branch symbols"
            }
            ErrorCategory::Input => "Pass a valid Gregorian date, an hour in 0-23 and a minute in 0-59",
            ErrorCategory::Storage => "Check file paths and permissions for the archive files",
            ErrorCategory::Configuration => "Review the configuration file and command line flags",
            ErrorCategory::Processing => "Make sure the signal directory contains signal files",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Calendar => format!("曆表查詢失敗: {}", self),
            ErrorCategory::Input => format!("輸入時間無效: {}", self),
            ErrorCategory::Storage => format!("檔案讀寫失敗: {}", self),
            ErrorCategory::Configuration => format!("配置錯誤: {}", self),
            ErrorCategory::Processing => format!("處理失敗: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, GanzhiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_lookup_formats_date() {
        let err = GanzhiError::provider_lookup(2024, 2, 5, "out of range");
        assert_eq!(
            err.to_string(),
            "Lunar lookup failed for 2024-02-05: out of range"
        );
        assert_eq!(err.category(), ErrorCategory::Calendar);
    }

    #[test]
    fn test_severity_ordering() {
        let io = GanzhiError::IoError(std::io::Error::other("disk"));
        let moment = GanzhiError::InvalidMoment {
            message: "hour 24".to_string(),
        };
        assert!(io.severity() > moment.severity());
        assert_eq!(io.severity(), ErrorSeverity::Critical);
    }
}
