//! JWT Token Handler
//! Mission: Issue, validate and refresh HS256-signed identity tokens
//!
//! Tokens are self-contained: validation checks signature, algorithm,
//! issuer and expiry only, never the credential store.

use crate::auth::models::{AuthUser, Claims};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use tracing::debug;

/// Lifetime of every issued token
pub const TOKEN_LIFETIME_HOURS: i64 = 24;

/// A token may be refreshed once its remaining lifetime is at most this long
pub const REFRESH_WINDOW_SECS: i64 = 3600;

pub const DEFAULT_ISSUER: &str = "app";

/// JWT Handler for token operations
pub struct JwtHandler {
    secret: String,
    issuer: String,
    expiration_hours: i64,
}

impl JwtHandler {
    /// Create a new JWT handler with secret key
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            issuer: DEFAULT_ISSUER.to_string(),
            expiration_hours: TOKEN_LIFETIME_HOURS,
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Generate a JWT token for a user
    pub fn generate_token(&self, user: &AuthUser) -> Result<String, TokenError> {
        self.generate_token_at(user, Utc::now())
    }

    pub(crate) fn generate_token_at(
        &self,
        user: &AuthUser,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::MissingSigningKey);
        }

        let expiration = now
            .checked_add_signed(Duration::hours(self.expiration_hours))
            .ok_or_else(|| TokenError::Encoding("Invalid timestamp".to_string()))?;

        let claims = Claims {
            user_id: user.user_id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            iss: self.issuer.clone(),
        };

        debug!(
            "Generating JWT for user {} ({}), expires in {}h",
            user.username, user.user_id, self.expiration_hours
        );

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Validate a JWT token and extract claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::MissingSigningKey);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss"]);

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )?;

        debug!("Validated JWT for user {}", decoded.claims.username);

        Ok(decoded.claims)
    }

    /// Exchange a token that is close to expiry for a fresh one with the same identity
    pub fn refresh_token(&self, token: &str) -> Result<String, TokenError> {
        self.refresh_token_at(token, Utc::now())
    }

    pub(crate) fn refresh_token_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = self.validate_token(token)?;

        let remaining = claims.exp - now.timestamp();
        if remaining > REFRESH_WINDOW_SECS {
            debug!(
                "Refresh refused for {}: {}s of lifetime left",
                claims.username, remaining
            );
            return Err(TokenError::NotEligible);
        }

        self.generate_token_at(&claims.identity(), now)
    }
}

/// Token service errors
#[derive(Debug)]
pub enum TokenError {
    /// Signing key is empty
    MissingSigningKey,
    /// Claims could not be serialized or signed
    Encoding(String),
    /// Signature or signing algorithm does not match
    InvalidSignature,
    Expired,
    /// Token could not be parsed
    Malformed,
    WrongIssuer,
    /// More than `REFRESH_WINDOW_SECS` of lifetime remain
    NotEligible,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSigningKey => write!(f, "JWT signing key is not configured"),
            Self::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            Self::InvalidSignature => write!(f, "Token signature or algorithm mismatch"),
            Self::Expired => write!(f, "Token expired"),
            Self::Malformed => write!(f, "Token could not be parsed"),
            Self::WrongIssuer => write!(f, "Token issued by an unexpected issuer"),
            Self::NotEligible => write!(f, "Token not eligible for refresh yet"),
        }
    }
}

impl std::error::Error for TokenError {}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => Self::InvalidSignature,
            ErrorKind::InvalidIssuer => Self::WrongIssuer,
            _ => Self::Malformed,
        }
    }
}
