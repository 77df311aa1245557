use axum::extract::{Json, Path, State};

use crate::{
    AppState,
    error::AppError,
    routes::guest::model::Guest,
    utils::{normalize_phone, validate_phone},
};

use super::model::UpdateAttendanceRequest;

/// 宾客回执入口，不需要登录，用手机号定位记录。
/// 只有已受邀的宾客才允许提交，否则返回403且不落库。
#[axum::debug_handler]
pub async fn update_attendance(
    State(state): State<AppState>,
    Path(phone): Path<String>,
    Json(req): Json<UpdateAttendanceRequest>,
) -> Result<Json<Guest>, AppError> {
    if !validate_phone(&phone) {
        return Err(AppError::Validation("手机号格式无效".to_string()));
    }
    let phone = normalize_phone(&phone);

    let guest = Guest::find_by_phone(&state.pool, &phone)
        .await?
        .ok_or(AppError::GuestNotFound)?;

    guest.check_rsvp(req.is_attending, req.attending_guest_count)?;

    // 不出席时人数按0记录
    let attending_guest_count = if req.is_attending {
        req.attending_guest_count
    } else {
        0
    };

    let updated = Guest::record_attendance(&state.pool, &phone, req.is_attending, attending_guest_count)
        .await?
        .ok_or(AppError::GuestNotFound)?;

    tracing::info!(
        "Guest {} responded: attending={}, headcount={}",
        updated.id,
        updated.is_attending,
        updated.attending_guest_count
    );
    Ok(Json(updated))
}
