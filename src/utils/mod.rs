use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::Config;

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password.as_bytes(), DEFAULT_COST)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password.as_bytes(), hash)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // 管理员用户名
    pub exp: i64,    // 过期时间
    pub iat: i64,    // 签发时间
}

pub fn generate_token(
    username: &str,
    config: &Config,
) -> Result<(String, i64), jsonwebtoken::errors::Error> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::seconds(config.jwt_expiration().as_secs() as i64))
        .expect("valid timestamp")
        .timestamp();

    let claims = Claims {
        sub: username.to_string(),
        exp: expiration,
        iat: Utc::now().timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )?;

    Ok((token, expiration))
}

pub fn verify_token(token: &str, config: &Config) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// 手机号校验针对用户原始输入：8到15位，只允许数字和常见分隔符
pub fn validate_phone(raw: &str) -> bool {
    let len = raw.chars().count();
    (8..=15).contains(&len)
        && raw
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '(' | ')' | '-'))
}

/// 存储和查询统一使用规范化手机号：去掉空白和连字符
pub fn normalize_phone(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

// 前端下拉框提交的人数是字符串，这里同时接受数字和数字字符串
pub fn flexible_i32<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntOrString {
        Int(i32),
        Str(String),
    }

    match IntOrString::deserialize(deserializer)? {
        IntOrString::Int(n) => Ok(n),
        IntOrString::Str(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom("expected an integer")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost/test".to_string(),
            redis_url: "redis://localhost".to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 5000,
            api_base_uri: "/api".to_string(),
            jwt_secret: "test-secret".to_string(),
            jwt_expiration_secs: 3600,
            admin_username: "admin".to_string(),
            admin_password_hash: String::new(),
            rate_limit_window_secs: 60,
            rate_limit_requests: 100,
        }
    }

    #[test]
    fn token_roundtrip_preserves_subject() {
        let config = test_config();
        let (token, expires_at) = generate_token("admin", &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.exp, expires_at);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let config = test_config();
        let mut other = test_config();
        other.jwt_secret = "another-secret".to_string();
        let (token, _) = generate_token("admin", &other).unwrap();
        assert!(verify_token(&token, &config).is_err());
    }

    #[test]
    fn password_hash_roundtrip() {
        let hashed = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hashed).unwrap());
        assert!(!verify_password("wrong", &hashed).unwrap());
    }

    #[test]
    fn phone_validation_accepts_common_formats() {
        assert!(validate_phone("0501234567"));
        assert!(validate_phone("+972 50-1234567"));
        assert!(validate_phone("(050) 123 4567"));
        assert!(!validate_phone("1234567")); // 过短
        assert!(!validate_phone("05012345678901234")); // 过长
        assert!(!validate_phone("050abc4567"));
    }

    #[test]
    fn phone_normalization_strips_separators() {
        assert_eq!(normalize_phone("050-123 4567"), "0501234567");
        assert_eq!(normalize_phone("+972 50-123-4567"), "+972501234567");
        assert_eq!(normalize_phone("(050)1234567"), "(050)1234567");
    }

    #[derive(Deserialize)]
    struct Wrapper {
        #[serde(deserialize_with = "flexible_i32")]
        count: i32,
    }

    #[test]
    fn flexible_count_accepts_numbers_and_strings() {
        let from_int: Wrapper = serde_json::from_value(serde_json::json!({"count": 3})).unwrap();
        assert_eq!(from_int.count, 3);
        let from_str: Wrapper = serde_json::from_value(serde_json::json!({"count": "4"})).unwrap();
        assert_eq!(from_str.count, 4);
        assert!(serde_json::from_value::<Wrapper>(serde_json::json!({"count": "x"})).is_err());
    }
}
