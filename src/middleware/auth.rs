use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{AppState, error::AppError, utils::verify_token};

/// 校验 Bearer token，并把解析出的 Claims 放进请求扩展
pub async fn auth_middleware(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(TypedHeader(auth)) = auth else {
        return Err(AppError::Unauthorized);
    };

    match verify_token(auth.token(), &state.config) {
        Ok(claims) => {
            tracing::debug!("Authorized admin request for {}", claims.sub);
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        Err(e) => {
            tracing::debug!("Rejected bearer token: {}", e);
            Err(AppError::Unauthorized)
        }
    }
}
