use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    Form,
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, extract::AppJson};

/// Request body for login. Accepts JSON `{email, password}` or an OAuth2
/// password form (`username`, `password`).
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
struct PasswordForm {
    username: String,
    password: String,
}

#[async_trait]
impl<S> FromRequest<S> for LoginRequest
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(form) = Form::<PasswordForm>::from_request(req, state).await?;
            return Ok(Self {
                email: form.username,
                password: form.password,
            });
        }

        let AppJson(body) = AppJson::<LoginRequest>::from_request(req, state).await?;
        Ok(body)
    }
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer",
        }
    }
}
