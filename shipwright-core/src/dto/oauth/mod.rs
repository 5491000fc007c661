//! OAuth token exchange DTOs

use serde::{Deserialize, Serialize};

/// Resource owner password credentials grant
#[derive(Serialize)]
pub struct PasswordGrant<'a> {
    pub grant_type: &'static str,
    pub username: &'a str,
    pub password: &'a str,
}

impl<'a> PasswordGrant<'a> {
    pub fn new(username: &'a str, password: &'a str) -> Self {
        Self {
            grant_type: "password",
            username,
            password,
        }
    }
}

/// Token endpoint response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
}
