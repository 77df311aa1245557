use std::env;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub jwt_secret: String,
    pub jwt_expiration_secs: u64,
    pub admin_username: String,
    pub admin_password_hash: String,
    pub rate_limit_window_secs: u64,
    pub rate_limit_requests: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let jwt_expiration = env::var("JWT_EXPIRATION")?
            .trim_end_matches('h')
            .parse::<u64>()
            .unwrap_or(24);
        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            redis_url: env::var("REDIS_URL")?,
            server_host: env::var("SERVER_HOST")?,
            server_port: env::var("SERVER_PORT")?.parse().unwrap_or(5000),
            api_base_uri: env::var("API_BASE_URI").unwrap_or_else(|_| "/api".to_string()),
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_expiration_secs: jwt_expiration * 3600,
            admin_username: env::var("ADMIN_USERNAME")?,
            admin_password_hash: env::var("ADMIN_PASSWORD_HASH")?,
            rate_limit_window_secs: env::var("RATE_LIMIT_WINDOW")?.parse().unwrap_or(60),
            rate_limit_requests: env::var("RATE_LIMIT_REQUESTS")?.parse().unwrap_or(100),
        })
    }

    pub fn jwt_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_expiration_secs)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }
}
