use crate::domain::model::{ApplicationStatus, PostingId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to load {resource}: {message}")]
    FetchFailed { resource: String, message: String },

    #[error("Status update failed: {message}")]
    TransitionFailed { message: String },

    #[error("No applications selected")]
    EmptySelection,

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Action not offered: {from} -> {to}")]
    ActionUnavailable {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },

    #[error("No pipeline column for posting {posting} / {status}")]
    UnknownColumn {
        posting: PostingId,
        status: ApplicationStatus,
    },

    #[error("Pipeline is not loaded")]
    NotLoaded,

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation error in '{field}': {message}")]
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
    Input,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

pub const GENERIC_TRANSITION_FAILURE: &str = "Failed to update application status";
pub const GENERIC_BULK_FAILURE: &str = "Failed to bulk update applications";

impl PipelineError {
    pub fn fetch_failed(resource: &str, message: impl Into<String>) -> Self {
        Self::FetchFailed {
            resource: resource.to_string(),
            message: message.into(),
        }
    }

    pub fn transition_failed(message: impl Into<String>) -> Self {
        Self::TransitionFailed {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FetchFailed { .. } | Self::TransitionFailed { .. } => ErrorCategory::Network,
            Self::EmptySelection
            | Self::InvalidInput { .. }
            | Self::ActionUnavailable { .. }
            | Self::UnknownColumn { .. }
            | Self::NotLoaded
            | Self::SerializationError(_) => ErrorCategory::Input,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::CsvError(_) | Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 使用者操作層級，畫面上提示即可
            Self::EmptySelection | Self::ActionUnavailable { .. } | Self::InvalidInput { .. } => {
                ErrorSeverity::Low
            }
            // 可重試
            Self::FetchFailed { .. } | Self::TransitionFailed { .. } => ErrorSeverity::Medium,
            Self::UnknownColumn { .. }
            | Self::NotLoaded
            | Self::SerializationError(_)
            | Self::CsvError(_)
            | Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorSeverity::High,
            Self::IoError(_) => ErrorSeverity::Critical,
        }
    }

    /// 顯示給使用者的訊息，限定在出錯的面板內
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::FetchFailed { resource, .. } => format!("Failed to load {}.", resource),
            Self::TransitionFailed { message } => message.clone(),
            Self::EmptySelection => "Select at least one application first.".to_string(),
            Self::InvalidInput { message } => format!("Some records were skipped: {}", message),
            Self::ActionUnavailable { from, to } => {
                format!("{} applications cannot be moved to {}.", from, to)
            }
            Self::UnknownColumn { posting, status } => {
                format!("Posting {} has no {} column.", posting, status)
            }
            Self::NotLoaded => "The pipeline has not been loaded yet.".to_string(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check that the backend is reachable and the token is still valid, then retry"
            }
            ErrorCategory::Input => "Reload the pipeline and retry with a valid selection",
            ErrorCategory::Configuration => {
                "Check the --base-url / --token flags or the config file values"
            }
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
