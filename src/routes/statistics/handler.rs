use axum::extract::{Json, State};

use crate::{
    AppState,
    error::AppError,
    query::{self, StatisticsSummary},
    routes::guest::model::Guest,
};

/// 统计直接在当前宾客快照上重新计算，不单独持久化
#[axum::debug_handler]
pub async fn get_statistics(
    State(state): State<AppState>,
) -> Result<Json<StatisticsSummary>, AppError> {
    let guests = Guest::list(&state.pool).await?;
    Ok(Json(query::summarize(&guests)))
}
