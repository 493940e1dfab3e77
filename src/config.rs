use anyhow::{bail, Context};
use jsonwebtoken::Algorithm;

/// One year.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = std::env::var("APP_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(8080);

        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            algorithm: parse_algorithm(
                &std::env::var("JWT_ALGORITHM").unwrap_or_else(|_| "HS256".into()),
            )?,
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(30),
        };
        jwt.validate()?;

        Ok(Self {
            database_url,
            max_connections,
            host,
            port,
            jwt,
        })
    }
}

impl JwtConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }
        if !(1..=MAX_TTL_MINUTES).contains(&self.ttl_minutes) {
            bail!(
                "JWT_TTL_MINUTES must be between 1 and {MAX_TTL_MINUTES}, got {}",
                self.ttl_minutes
            );
        }
        Ok(())
    }
}

/// Only the HMAC family is accepted: tokens are signed and checked with one shared secret.
pub fn parse_algorithm(raw: &str) -> anyhow::Result<Algorithm> {
    let algorithm: Algorithm = raw
        .trim()
        .parse()
        .with_context(|| format!("unknown JWT_ALGORITHM {raw:?}"))?;
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => bail!("JWT_ALGORITHM must be a symmetric HMAC scheme, got {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_algorithm_accepts_hmac_family() {
        assert_eq!(parse_algorithm("HS256").unwrap(), Algorithm::HS256);
        assert_eq!(parse_algorithm(" HS512 ").unwrap(), Algorithm::HS512);
    }

    #[test]
    fn parse_algorithm_rejects_asymmetric_and_garbage() {
        assert!(parse_algorithm("RS256").is_err());
        assert!(parse_algorithm("none").is_err());
    }

    #[test]
    fn validate_rejects_blank_secret_and_bad_ttl() {
        let mut cfg = JwtConfig {
            secret: "  ".into(),
            algorithm: Algorithm::HS256,
            ttl_minutes: 30,
        };
        assert!(cfg.validate().is_err());

        cfg.secret = "s3cret".into();
        cfg.ttl_minutes = 0;
        assert!(cfg.validate().is_err());

        cfg.ttl_minutes = 30;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_caps_ttl_before_it_can_overflow() {
        let mut cfg = JwtConfig {
            secret: "s3cret".into(),
            algorithm: Algorithm::HS256,
            ttl_minutes: i64::MAX,
        };
        assert!(cfg.validate().is_err());

        cfg.ttl_minutes = MAX_TTL_MINUTES + 1;
        assert!(cfg.validate().is_err());

        cfg.ttl_minutes = MAX_TTL_MINUTES;
        assert!(cfg.validate().is_ok());
        let keys = crate::auth::jwt::JwtKeys::new(&cfg);
        assert!(keys.verify(&keys.issue(1).unwrap()).is_ok());
    }
}
