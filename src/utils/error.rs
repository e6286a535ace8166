use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Store returned HTTP {status} for {endpoint}")]
    UpstreamStatus { endpoint: String, status: u16 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LayoutError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LayoutError::ApiError(_) | LayoutError::UpstreamStatus { .. } => ErrorCategory::Network,
            LayoutError::ConfigError { .. }
            | LayoutError::ConfigValidationError { .. }
            | LayoutError::InvalidConfigValueError { .. }
            | LayoutError::MissingConfigError { .. } => ErrorCategory::Configuration,
            LayoutError::SerializationError(_) => ErrorCategory::Data,
            LayoutError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 網路問題通常重試即可
            LayoutError::ApiError(_) => ErrorSeverity::Medium,
            LayoutError::UpstreamStatus { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            LayoutError::UpstreamStatus { .. } => ErrorSeverity::High,
            LayoutError::SerializationError(_) => ErrorSeverity::High,
            LayoutError::ConfigError { .. }
            | LayoutError::ConfigValidationError { .. }
            | LayoutError::InvalidConfigValueError { .. }
            | LayoutError::MissingConfigError { .. } => ErrorSeverity::High,
            LayoutError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check that the store is reachable and retry the request",
            ErrorCategory::Configuration => "Review the configuration file and command line flags",
            ErrorCategory::Data => "The store returned a payload that is not valid JSON; inspect the response",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            LayoutError::ApiError(e) if e.is_timeout() => {
                "The warehouse store did not answer in time".to_string()
            }
            LayoutError::ApiError(_) => "Could not reach the warehouse store".to_string(),
            LayoutError::UpstreamStatus { status, .. } => {
                format!("The warehouse store rejected the request (HTTP {})", status)
            }
            LayoutError::MissingConfigError { field } => {
                format!("Missing configuration value: {}", field)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LayoutError>;
