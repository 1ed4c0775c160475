//! Authentication Module
//! Mission: Stateless JWT sessions, Argon2 credentials and identity propagation

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod user_store;

pub use api::AuthState;
pub use jwt::{JwtHandler, TokenError};
pub use middleware::auth_middleware;
pub use models::{AuthUser, Claims, User};
pub use user_store::UserStore;
