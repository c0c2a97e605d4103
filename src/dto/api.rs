//! Response envelope shared by every `/api/v1` endpoint.

use actix_web::http::StatusCode;
use serde::Serialize;

/// Outcome code carried in the `code` field of every response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseCode {
    Success = 0,
    InvalidParams = 1,
    DatabaseError = 2,
    NotFound = 3,
    InternalError = 4,
    ValidationError = 5,
}

impl ResponseCode {
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::Success => "操作成功",
            Self::InvalidParams => "参数错误",
            Self::DatabaseError => "数据库操作失败",
            Self::NotFound => "资源未找到",
            Self::InternalError => "服务器内部错误",
            Self::ValidationError => "数据验证失败",
        }
    }

    pub const fn status(self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InvalidParams | Self::ValidationError => StatusCode::BAD_REQUEST,
            Self::DatabaseError | Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON body `{code, message, data?, total?, timestamp}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self::build(ResponseCode::Success, None, Some(data), None)
    }

    pub fn with_total(data: T, total: usize) -> Self {
        Self::build(ResponseCode::Success, None, Some(data), Some(total))
    }

    fn build(
        code: ResponseCode,
        message: Option<String>,
        data: Option<T>,
        total: Option<usize>,
    ) -> Self {
        Self {
            code: code as i32,
            message: message.unwrap_or_else(|| code.default_message().to_string()),
            data,
            total,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl ApiResponse<()> {
    /// Error body; a blank message falls back to the code's default text.
    pub fn error(code: ResponseCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = (!message.trim().is_empty()).then_some(message);
        Self::build(code, message, None, None)
    }
}
