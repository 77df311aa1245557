use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use redis::AsyncCommands;

use crate::{config::Config, error::AppError};

/// 基于 Redis 固定窗口计数的限流器。回执接口不需要登录，
/// 靠它来挡住对手机号的暴力猜测。
#[derive(Clone)]
pub struct RateLimiter {
    redis: Arc<redis::Client>,
    config: Arc<Config>,
}

impl RateLimiter {
    pub fn new(redis: redis::Client, config: Config) -> Self {
        Self {
            redis: Arc::new(redis),
            config: Arc::new(config),
        }
    }

    pub async fn check_rate_limit(self: Arc<Self>, req: Request<Body>, next: Next) -> Response {
        // 优先取反向代理头里的原始IP，取不到时退回连接IP
        let remote_ip = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ci| ci.0.ip().to_string());
        let ip = req
            .headers()
            .get("x-real-ip")
            .and_then(|h| h.to_str().ok())
            .or_else(|| {
                req.headers()
                    .get("x-forwarded-for")
                    .and_then(|h| h.to_str().ok())
                    .and_then(|s| s.split(',').find(|ip| !ip.trim().is_empty()))
            })
            .or_else(|| remote_ip.as_deref())
            .unwrap_or("unknown")
            .trim()
            .to_string();

        let key = format!("rate_limit:{}", ip);
        let window_secs = self.config.rate_limit_window().as_secs();

        // Redis 不可用时放行请求，宾客回执不应因此不可用
        let mut conn = match self.redis.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!("Rate limiter unavailable, letting request through: {}", e);
                return next.run(req).await;
            }
        };

        let count: i64 = match conn.incr(&key, 1).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!("Rate limiter INCR failed, letting request through: {}", e);
                return next.run(req).await;
            }
        };

        if count == 1 {
            // 窗口内首个请求，设置过期时间
            let expired: Result<(), redis::RedisError> =
                conn.expire(&key, window_secs as i64).await;
            if let Err(e) = expired {
                tracing::warn!("Rate limiter EXPIRE failed for {}: {}", key, e);
            }
        }

        if count > self.config.rate_limit_requests as i64 {
            tracing::warn!("Rate limit exceeded for {}", ip);
            return AppError::RateLimited(window_secs).into_response();
        }

        next.run(req).await
    }
}

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    limiter.check_rate_limit(req, next).await
}
