use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::password::hash_password_async,
    error::{ApiError, ApiResult},
    users::{dto::CreateUserRequest, repo::UserRepo, repo_types::User},
};

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Validates, hashes and stores a new user. The existing record is left untouched on a
/// duplicate email, including when two registrations race past the pre-check.
pub async fn register(users: &dyn UserRepo, payload: CreateUserRequest) -> ApiResult<User> {
    let email = normalize_email(&payload.email);

    if !is_valid_email(&email) {
        warn!("invalid email");
        return Err(ApiError::validation("email", "Invalid email"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("password", "Password must not be empty"));
    }

    if users.find_by_email(&email).await?.is_some() {
        warn!("email already registered");
        return Err(email_taken());
    }

    let hash = hash_password_async(payload.password)
        .await
        .map_err(ApiError::internal)?;

    let user = users.create(&email, &hash).await?.ok_or_else(|| {
        warn!("email registered concurrently");
        email_taken()
    })?;

    info!(user_id = user.id, "user registered");
    Ok(user)
}

fn email_taken() -> ApiError {
    ApiError::Conflict("A user with this email already exists.".into())
}
