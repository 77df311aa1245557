use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

pub mod error_codes {
    pub const VALIDATION_ERROR: i32 = 1000;
    pub const GUEST_EXISTS: i32 = 1001;
    pub const AUTH_FAILED: i32 = 1002;
    pub const NOT_INVITED: i32 = 1003;
    pub const NOT_FOUND: i32 = 1004;
    pub const RATE_LIMIT: i32 = 1005;
    pub const INTERNAL_ERROR: i32 = 5000;
}

#[derive(Debug)]
pub enum AppError {
    Unauthorized,
    NotInvited,
    GuestNotFound,
    PhoneTaken,
    RateLimited(u64),
    Validation(String),
    Database(sqlx::Error),
    Internal,
}

#[derive(Serialize)]
struct ErrorResponse {
    code: i32,
    error_message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, error_message) = match self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                error_codes::AUTH_FAILED,
                "未授权访问".to_string(),
            ),
            AppError::NotInvited => (
                StatusCode::FORBIDDEN,
                error_codes::NOT_INVITED,
                "该宾客尚未收到邀请，无法提交回执".to_string(),
            ),
            AppError::GuestNotFound => (
                StatusCode::NOT_FOUND,
                error_codes::NOT_FOUND,
                "宾客不存在".to_string(),
            ),
            AppError::PhoneTaken => (
                StatusCode::CONFLICT,
                error_codes::GUEST_EXISTS,
                "该手机号已登记过宾客".to_string(),
            ),
            AppError::RateLimited(window_secs) => (
                StatusCode::TOO_MANY_REQUESTS,
                error_codes::RATE_LIMIT,
                format!("请求过于频繁，请在{}秒后重试", window_secs),
            ),
            AppError::Validation(message) => {
                (StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR, message)
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_codes::INTERNAL_ERROR,
                    "内部服务器错误".to_string(),
                )
            }
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_codes::INTERNAL_ERROR,
                "内部服务器错误".to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            code,
            error_message,
        });

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            // 手机号唯一索引冲突单独映射，其余数据库错误统一按内部错误处理
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::PhoneTaken,
            _ => AppError::Database(e),
        }
    }
}
