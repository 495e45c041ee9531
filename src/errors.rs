use std::error::Error;
use std::fmt;

use crate::api_connection::connection::ApiConnectionError;

/// Failures surfaced by the planning pipeline.
///
/// Every variant carries a user-facing message and maps onto an HTTP-style
/// status so a host service can forward it unchanged.
#[derive(Debug)]
pub enum PlannerError {
    /// The caller sent something we cannot plan for.
    InvalidRequest(String),
    /// The generator timed out, answered with an error status or said nothing.
    UpstreamFailure { status: u16, message: String },
    /// The generator answered, but not with a usable plan.
    MalformedResponse(String),
    /// The service itself is missing required settings.
    Configuration(String),
}

impl PlannerError {
    pub fn status_code(&self) -> u16 {
        match self {
            PlannerError::InvalidRequest(_) => 400,
            PlannerError::UpstreamFailure { status, .. } => *status,
            PlannerError::MalformedResponse(_) => 502,
            PlannerError::Configuration(_) => 500,
        }
    }

    pub fn is_client_fault(&self) -> bool {
        matches!(self, PlannerError::InvalidRequest(_))
    }

    pub fn message(&self) -> &str {
        match self {
            PlannerError::InvalidRequest(msg)
            | PlannerError::MalformedResponse(msg)
            | PlannerError::Configuration(msg) => msg,
            PlannerError::UpstreamFailure { message, .. } => message,
        }
    }
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannerError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            PlannerError::UpstreamFailure { status, message } => {
                write!(f, "Upstream failure ({}): {}", status, message)
            }
            PlannerError::MalformedResponse(msg) => write!(f, "Malformed response: {}", msg),
            PlannerError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl Error for PlannerError {}

impl From<ApiConnectionError> for PlannerError {
    fn from(err: ApiConnectionError) -> Self {
        match err {
            ApiConnectionError::MissingApiKey(key_name) => PlannerError::Configuration(format!(
                "尚未設定 {}，無法呼叫 DeepSeek 服務。",
                key_name
            )),
            ApiConnectionError::Timeout => PlannerError::UpstreamFailure {
                status: 504,
                message: "DeepSeek 回應逾時，請稍後再試。".to_string(),
            },
            ApiConnectionError::ApiError { status, error_body } => PlannerError::UpstreamFailure {
                status: status.as_u16(),
                message: format!("DeepSeek API 回應錯誤（{}）：{}", status.as_u16(), error_body),
            },
            ApiConnectionError::EmptyContent => PlannerError::UpstreamFailure {
                status: 502,
                message: "DeepSeek 回傳內容為空，無法產生食譜。".to_string(),
            },
            ApiConnectionError::NetworkError(e) => PlannerError::UpstreamFailure {
                status: 502,
                message: format!("DeepSeek API 呼叫失敗：{}", e),
            },
            ApiConnectionError::SerializationError(e) => PlannerError::UpstreamFailure {
                status: 502,
                message: format!("DeepSeek API 呼叫失敗：{}", e),
            },
        }
    }
}
