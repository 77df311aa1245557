use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use wedding_backend::{AppState, app, config::Config, utils};

const ADMIN_PASSWORD: &str = "hunter2";

fn test_config() -> Config {
    Config {
        // 连接池是惰性的，下面的用例都不会真正访问数据库
        database_url: "postgres://localhost:5432/unused".to_string(),
        redis_url: "redis://localhost:6379".to_string(),
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        api_base_uri: "/api".to_string(),
        jwt_secret: "integration-test-secret".to_string(),
        jwt_expiration_secs: 3600,
        admin_username: "admin".to_string(),
        admin_password_hash: utils::hash_password(ADMIN_PASSWORD).unwrap(),
        rate_limit_window_secs: 60,
        rate_limit_requests: 100,
    }
}

fn test_app() -> (Router, Config) {
    let config = test_config();
    let state = AppState {
        pool: PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap(),
        config: config.clone(),
    };
    (app(state), config)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn admin_routes_require_a_token() {
    let (app, _) = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/guests")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_tokens_are_rejected() {
    let (app, _) = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/statistics")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let (app, _) = test_app();
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"username": "admin", "password": "wrong"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_issues_a_token_the_middleware_accepts() {
    let (app, _) = test_app();
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"username": "admin", "password": ADMIN_PASSWORD}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let token = body["token"].as_str().unwrap().to_string();
    assert!(body["expires_at"].as_i64().unwrap() > 0);

    // 带上签发的token后，请求穿过认证中间件，在参数校验处被拒绝，
    // 而不是在认证处被拒绝
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/guests",
            Some(&token),
            json!({
                "name": "   ",
                "phone": "0501234567",
                "relation": "family",
                "side": "bride",
                "guest_count": 1
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_guest_rejects_malformed_phone() {
    let (app, config) = test_app();
    let (token, _) = utils::generate_token("admin", &config).unwrap();
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/guests",
            Some(&token),
            json!({
                "name": "张三",
                "phone": "12ab",
                "relation": "friend",
                "side": "groom",
                "guest_count": "2"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], json!(1000));
}

#[tokio::test]
async fn attendance_endpoint_is_public_but_validates_phone() {
    let (app, _) = test_app();
    // 没有 Authorization 头也能到达回执接口，手机号非法时返回400
    let response = app
        .oneshot(json_request(
            "PATCH",
            "/api/guests/not-a-phone/attendance",
            None,
            json!({"is_attending": true, "attending_guest_count": "2"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn routes_outside_the_base_uri_are_not_found() {
    let (app, _) = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/guests")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
