use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiagError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Backend returned {status}: {body}")]
    BackendError { status: u16, body: String },

    #[error("Authentication failed at {stage}: {details}")]
    AuthError { stage: String, details: String },

    #[error("Session error: {message}")]
    SessionError { message: String },

    #[error("Check '{check}' failed: {details}")]
    CheckError { check: String, details: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

/// 錯誤分類，用於決定報告和重試策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Auth,
    Config,
    Storage,
    Data,
}

/// 錯誤嚴重程度，對應 CLI 退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DiagError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DiagError::ApiError(_) | DiagError::BackendError { .. } => ErrorCategory::Network,
            DiagError::AuthError { .. } => ErrorCategory::Auth,
            DiagError::IoError(_) | DiagError::SessionError { .. } => ErrorCategory::Storage,
            DiagError::SerializationError(_) | DiagError::CheckError { .. } => ErrorCategory::Data,
            DiagError::ConfigValidationError { .. }
            | DiagError::InvalidConfigValueError { .. }
            | DiagError::MissingConfigError { .. } => ErrorCategory::Config,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 網絡問題通常是暫時的，可以重試
            DiagError::ApiError(_) => ErrorSeverity::Medium,
            DiagError::BackendError { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            DiagError::BackendError { .. } => ErrorSeverity::High,
            DiagError::AuthError { .. } => ErrorSeverity::High,
            DiagError::SessionError { .. } => ErrorSeverity::Low,
            DiagError::CheckError { .. } => ErrorSeverity::High,
            DiagError::IoError(_) | DiagError::SerializationError(_) => ErrorSeverity::High,
            // 配置錯誤必須先修正才能繼續
            DiagError::ConfigValidationError { .. }
            | DiagError::InvalidConfigValueError { .. }
            | DiagError::MissingConfigError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            DiagError::ApiError(_) => {
                "Check the backend URL and your network connection, then retry".to_string()
            }
            DiagError::BackendError { status, .. } if *status == 401 || *status == 403 => {
                "Verify the anon key and credentials have access to this project".to_string()
            }
            DiagError::BackendError { status, .. } if *status >= 500 => {
                "The backend is having trouble; wait a moment and retry".to_string()
            }
            DiagError::BackendError { .. } => {
                "Inspect the response body; the request may not match the backend schema"
                    .to_string()
            }
            DiagError::AuthError { .. } => {
                "Double-check the test account email and password".to_string()
            }
            DiagError::SessionError { .. } => {
                "Delete the stored session file and sign in again".to_string()
            }
            DiagError::CheckError { check, .. } => {
                format!("Re-run only this check with --checks {} for details", check)
            }
            DiagError::IoError(_) => {
                "Check that the session directory exists and is writable".to_string()
            }
            DiagError::SerializationError(_) => {
                "The backend returned an unexpected payload shape".to_string()
            }
            DiagError::ConfigValidationError { field, .. }
            | DiagError::InvalidConfigValueError { field, .. }
            | DiagError::MissingConfigError { field } => {
                format!("Fix the '{}' entry in the config file or CLI flags", field)
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach the backend: {}", self),
            ErrorCategory::Auth => format!("Sign-in problem: {}", self),
            ErrorCategory::Config => format!("Configuration problem: {}", self),
            ErrorCategory::Storage => format!("Local storage problem: {}", self),
            ErrorCategory::Data => format!("Unexpected data: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, DiagError>;
