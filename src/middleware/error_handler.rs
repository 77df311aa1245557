use axum::{
    body::{Body, to_bytes},
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::{error, warn};

pub async fn log_errors(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;
    let status = response.status();

    if status.is_server_error() {
        let (mut parts, body) = response.into_parts();
        let bytes = match to_bytes(body, 1024).await {
            Ok(b) => b,
            Err(e) => {
                error!("Failed to read error response body: {}", e);
                return Response::from_parts(parts, Body::empty());
            }
        };

        error!(
            "{} {} failed - Status: {}, Body: {}",
            method,
            path,
            parts.status,
            String::from_utf8_lossy(&bytes)
        );

        // body 已被读取，重新构建响应
        parts.headers.remove(axum::http::header::CONTENT_LENGTH);
        Response::from_parts(parts, Body::from(bytes))
    } else {
        if status.is_client_error() {
            warn!("{} {} rejected - Status: {}", method, path, status);
        }
        response
    }
}
