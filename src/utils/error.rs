use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Server returned {status}: {body}")]
    ServerStatusError { status: u16, body: String },

    #[error("Build trigger failed: {message}")]
    TriggerError { message: String },

    #[error("Log stream failed: {message}")]
    StreamError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error on '{field}': {message}")]
    ValidationError { field: String, message: String },

    #[error("Nothing to export: the log buffer is empty")]
    ExportUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Configuration,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RunnerError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        RunnerError::ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn stream(message: impl Into<String>) -> Self {
        RunnerError::StreamError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            RunnerError::ValidationError { .. } | RunnerError::ExportUnavailable => {
                ErrorCategory::Input
            }
            RunnerError::HttpError(_)
            | RunnerError::ServerStatusError { .. }
            | RunnerError::TriggerError { .. }
            | RunnerError::StreamError { .. } => ErrorCategory::Network,
            RunnerError::ConfigError { .. }
            | RunnerError::InvalidConfigValueError { .. }
            | RunnerError::UrlError(_) => ErrorCategory::Configuration,
            RunnerError::IoError(_) | RunnerError::SerializationError(_) => {
                ErrorCategory::Storage
            }
        }
    }

    /// 所有錯誤都可由使用者重新提交恢復，嚴重度只用來決定 CLI 的退出碼
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RunnerError::ExportUnavailable => ErrorSeverity::Low,
            RunnerError::HttpError(_)
            | RunnerError::ServerStatusError { .. }
            | RunnerError::TriggerError { .. }
            | RunnerError::StreamError { .. } => ErrorSeverity::Medium,
            RunnerError::ValidationError { .. }
            | RunnerError::ConfigError { .. }
            | RunnerError::InvalidConfigValueError { .. }
            | RunnerError::UrlError(_) => ErrorSeverity::High,
            RunnerError::IoError(_) | RunnerError::SerializationError(_) => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            RunnerError::ValidationError { message, .. } => message.clone(),
            RunnerError::HttpError(e) if e.is_connect() => {
                "Could not reach the build server".to_string()
            }
            RunnerError::HttpError(_) => "The build server request failed".to_string(),
            RunnerError::ServerStatusError { status, .. } => {
                format!("The build server answered with HTTP {}", status)
            }
            RunnerError::TriggerError { .. } => "The build could not be started".to_string(),
            RunnerError::StreamError { .. } => "The build log stream was interrupted".to_string(),
            RunnerError::ExportUnavailable => "There are no log lines to export yet".to_string(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Check the form fields and submit again",
            ErrorCategory::Network => {
                "Make sure the build server is running, then re-submit the build"
            }
            ErrorCategory::Configuration => "Check the CLI flags and the TOML configuration file",
            ErrorCategory::Storage => "Check that the export directory exists and is writable",
        }
    }
}

pub type Result<T> = std::result::Result<T, RunnerError>;
