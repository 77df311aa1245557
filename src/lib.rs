use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use config::Config;
use sqlx::PgPool;

pub mod config;
pub mod error;
pub mod middleware;
pub mod query;
pub mod routes;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
}

/// 组装完整路由，公开路由和受保护路由分开挂载
pub fn app(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/login", post(routes::auth::login))
        // 宾客通过手机号提交回执，无需登录
        .route(
            "/guests/{id}/attendance",
            patch(routes::rsvp::update_attendance),
        );

    let protected_routes = Router::new()
        .route(
            "/guests",
            get(routes::guest::list_guests).post(routes::guest::create_guest),
        )
        .route("/guests/{id}/invite", patch(routes::guest::update_invitation))
        .route("/guests/{id}", delete(routes::guest::delete_guest))
        .route("/statistics", get(routes::statistics::get_statistics))
        // 应用认证中间件
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let api_base_uri = state.config.api_base_uri.clone();
    Router::new()
        .nest(
            &api_base_uri,
            Router::new().merge(public_routes).merge(protected_routes),
        )
        .with_state(state)
}
