//! Authentication Models
//! Mission: Define user records, token claims and the auth wire types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User account as stored in the credential store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // argon2id PHC string - never serialize
    pub created_at: String,
}

/// JWT Claims payload
///
/// Never persisted. Rebuilt from a token string by `JwtHandler::validate_token`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub iat: i64, // issued at (unix seconds)
    pub exp: i64, // expires at (unix seconds)
    pub iss: String,
}

impl Claims {
    /// Identity carried by these claims
    pub fn identity(&self) -> AuthUser {
        AuthUser {
            user_id: self.user_id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Authenticated caller identity.
///
/// This is the only value the auth middleware places into request
/// extensions; handlers read `user_id`, `username` and `email` from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
    pub username: String,
    pub email: String,
}

impl AuthUser {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

/// Register request body
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl RegisterRequest {
    /// Names of required fields that are blank
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.username.trim().is_empty() {
            missing.push("username");
        }
        if self.email.trim().is_empty() {
            missing.push("email");
        }
        if self.password.is_empty() {
            missing.push("password");
        }
        missing
    }
}

/// Login request body. `username` takes precedence over `email` when both are sent.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: String,
}

/// Which credential-store column a login attempt is matched against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginIdentity {
    Username(String),
    Email(String),
}

impl LoginIdentity {
    /// Which field identified the caller, without its value
    pub fn kind(&self) -> &'static str {
        match self {
            LoginIdentity::Username(_) => "username",
            LoginIdentity::Email(_) => "email",
        }
    }
}

impl LoginRequest {
    pub fn identity(&self) -> Option<LoginIdentity> {
        if let Some(username) = self.username.as_deref().map(str::trim) {
            if !username.is_empty() {
                return Some(LoginIdentity::Username(username.to_string()));
            }
        }
        let email = self.email.trim();
        if email.is_empty() {
            None
        } else {
            Some(LoginIdentity::Email(email.to_string()))
        }
    }
}

/// User response (sanitized)
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

impl From<AuthUser> for UserResponse {
    fn from(user: AuthUser) -> Self {
        Self {
            id: user.user_id,
            username: user.username,
            email: user.email,
        }
    }
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserResponse,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: UserResponse,
}

/// Refresh response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub token: String,
}
