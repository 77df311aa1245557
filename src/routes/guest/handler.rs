use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    error::AppError,
    query::{self, GuestFilter},
    utils::{normalize_phone, validate_phone},
};

use super::model::{CreateGuestRequest, Guest, UpdateInvitationRequest};

/// 列出宾客，支持按关系和所属方过滤。过滤在取回的快照上进行
#[axum::debug_handler]
pub async fn list_guests(
    State(state): State<AppState>,
    Query(criteria): Query<GuestFilter>,
) -> Result<Json<Vec<Guest>>, AppError> {
    let guests = Guest::list(&state.pool).await?;
    Ok(Json(query::filter(guests, &criteria)))
}

#[axum::debug_handler]
pub async fn create_guest(
    State(state): State<AppState>,
    Json(req): Json<CreateGuestRequest>,
) -> Result<(StatusCode, Json<Guest>), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("宾客姓名不能为空".to_string()));
    }
    if !validate_phone(&req.phone) {
        return Err(AppError::Validation("手机号格式无效".to_string()));
    }
    if req.guest_count < 1 {
        return Err(AppError::Validation("随行人数至少为1".to_string()));
    }

    let phone = normalize_phone(&req.phone);
    let guest = Guest::create(&state.pool, &req, &phone).await?;
    tracing::info!("Created guest {} ({})", guest.name, guest.id);
    Ok((StatusCode::CREATED, Json(guest)))
}

/// 邀请状态按请求体取值写入，管理后台也会用它来撤回邀请
#[axum::debug_handler]
pub async fn update_invitation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateInvitationRequest>,
) -> Result<Json<Guest>, AppError> {
    match Guest::set_invited(&state.pool, id, req.is_invited).await? {
        Some(guest) => {
            tracing::info!("Set is_invited={} for guest {}", guest.is_invited, guest.id);
            Ok(Json(guest))
        }
        None => Err(AppError::GuestNotFound),
    }
}

/// 硬删除，不可恢复
#[axum::debug_handler]
pub async fn delete_guest(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if Guest::delete(&state.pool, id).await? {
        tracing::info!("Deleted guest {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::GuestNotFound)
    }
}
