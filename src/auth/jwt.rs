use std::sync::Arc;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::{auth::claims::Claims, config::JwtConfig, state::AppState};

/// The only verification failure callers ever see; the concrete cause is logged, never returned.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("invalid or expired token")]
pub struct InvalidToken;

/// Signing material derived once from [`JwtConfig`] and shared read-only.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
    algorithm: Algorithm,
    ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(cfg.secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(cfg.secret.as_bytes())),
            algorithm: cfg.algorithm,
            ttl: Duration::minutes(cfg.ttl_minutes),
        }
    }

    pub fn issue(&self, user_id: i64) -> anyhow::Result<String> {
        self.issue_at(user_id, OffsetDateTime::now_utc())
    }

    pub fn issue_at(&self, user_id: i64, now: OffsetDateTime) -> anyhow::Result<String> {
        let claims = Claims {
            user_id,
            expires_at: (now + self.ttl).unix_timestamp(),
            issued_at: now.unix_timestamp(),
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)?;
        debug!(user_id, exp = claims.expires_at, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, InvalidToken> {
        self.verify_at(token, OffsetDateTime::now_utc())
    }

    /// Checks signature and algorithm, then requires `exp > now` with no leeway.
    pub fn verify_at(&self, token: &str, now: OffsetDateTime) -> Result<Claims, InvalidToken> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => data.claims,
            Err(e) => {
                debug!(error = %e, "jwt rejected");
                return Err(InvalidToken);
            }
        };

        if claims.expires_at <= now.unix_timestamp() {
            debug!(user_id = claims.user_id, exp = claims.expires_at, "jwt expired");
            return Err(InvalidToken);
        }

        debug!(user_id = claims.user_id, "jwt verified");
        Ok(claims)
    }
}
