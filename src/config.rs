//! Process configuration
//!
//! Read once at start-up from CLI flags, falling back to the environment
//! (a `.env` file is loaded first by `main`).

use clap::Parser;
use std::net::SocketAddr;

#[derive(Parser, Debug, Clone)]
#[command(name = "lyked")]
#[command(about = "Lyked backend - user accounts and upload metadata API")]
pub struct AppConfig {
    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value = "8084")]
    pub port: u16,

    /// HMAC-SHA256 signing key for identity tokens
    #[arg(long, env = "JWT_SECRET_KEY", default_value = "", hide_env_values = true)]
    pub jwt_secret: String,

    /// `iss` claim written into and required from tokens
    #[arg(long, env = "TOKEN_ISSUER", default_value = "app")]
    pub token_issuer: String,

    /// Credential store (SQLite file)
    #[arg(long, env = "AUTH_DB_PATH", default_value = "lyked_auth.db")]
    pub auth_db_path: String,

    /// Upload document store (SQLite file)
    #[arg(long, env = "UPLOADS_DB_PATH", default_value = "lyked_uploads.db")]
    pub uploads_db_path: String,
}

impl AppConfig {
    /// Reject configurations the server cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingSigningKey);
        }
        if self.token_issuer.trim().is_empty() {
            return Err(ConfigError::Invalid("TOKEN_ISSUER must not be empty"));
        }
        if self.auth_db_path.trim().is_empty() {
            return Err(ConfigError::MissingDatabasePath("AUTH_DB_PATH"));
        }
        if self.uploads_db_path.trim().is_empty() {
            return Err(ConfigError::MissingDatabasePath("UPLOADS_DB_PATH"));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::Invalid("HOST/PORT do not form a socket address"))
    }
}

/// Configuration errors (fatal at start-up)
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    MissingSigningKey,
    MissingDatabasePath(&'static str),
    Invalid(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSigningKey => write!(f, "JWT_SECRET_KEY is not set"),
            Self::MissingDatabasePath(var) => write!(f, "{} is not set", var),
            Self::Invalid(reason) => write!(f, "Invalid configuration: {}", reason),
        }
    }
}

impl std::error::Error for ConfigError {}
