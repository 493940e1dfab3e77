use serde::{Deserialize, Serialize};

/// JWT payload used for authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    #[serde(rename = "exp")]
    pub expires_at: i64, // unix timestamp
    #[serde(rename = "iat")]
    pub issued_at: i64, // unix timestamp
}
