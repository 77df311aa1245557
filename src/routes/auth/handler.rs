use axum::extract::{Json, State};

use crate::{
    AppState,
    error::AppError,
    utils::{generate_token, verify_password},
};

use super::model::{LoginRequest, LoginResponse};

/// 管理员登录，签发后台接口使用的 Bearer token
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if req.username != state.config.admin_username {
        return Err(AppError::Unauthorized);
    }

    // 验证密码
    match verify_password(&req.password, &state.config.admin_password_hash) {
        Ok(true) => {}
        Ok(false) => return Err(AppError::Unauthorized),
        Err(e) => {
            tracing::error!("Password verification failed: {}", e);
            return Err(AppError::Unauthorized);
        }
    }

    // 生成 token
    let (token, expires_at) =
        generate_token(&req.username, &state.config).map_err(|_| AppError::Internal)?;
    tracing::info!("Admin {} logged in", req.username);
    Ok(Json(LoginResponse { token, expires_at }))
}
