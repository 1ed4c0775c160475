//! Lyked Backend Library
//!
//! User registration/login with stateless JWT sessions, plus per-user upload
//! metadata. `main.rs` wires these together; tests drive `routes::build_router`.

pub mod auth;
pub mod config;
pub mod db;
pub mod middleware;
pub mod routes;
pub mod uploads;

pub use config::{AppConfig, ConfigError};
pub use routes::{build_router, AppState};
