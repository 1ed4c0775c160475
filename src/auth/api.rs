//! Authentication API Endpoints
//! Mission: Register, login, logout and token refresh over HTTP

use crate::auth::{
    jwt::{JwtHandler, TokenError},
    middleware::bearer_token,
    models::{
        AuthUser, LoginIdentity, LoginRequest, LoginResponse, RefreshResponse, RegisterRequest,
        RegisterResponse, UserResponse,
    },
    password,
    user_store::UserStore,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub user_store: Arc<UserStore>,
    pub jwt_handler: Arc<JwtHandler>,
}

impl AuthState {
    pub fn new(user_store: Arc<UserStore>, jwt_handler: Arc<JwtHandler>) -> Self {
        Self {
            user_store,
            jwt_handler,
        }
    }
}

/// Register endpoint - POST /users/register
pub async fn register(
    State(state): State<AuthState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), AuthApiError> {
    let Json(payload) = payload.map_err(|e| AuthApiError::InvalidRequest(e.body_text()))?;

    let missing = payload.missing_fields();
    if !missing.is_empty() {
        return Err(AuthApiError::MissingFields {
            message: "Username, email, and password are required",
            fields: missing,
        });
    }

    let username = payload.username.trim().to_string();
    let email = payload.email.trim().to_string();
    let password = payload.password;

    let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| {
            error!("Password hashing task failed: {}", e);
            AuthApiError::InternalError
        })?
        .map_err(|e| {
            error!("{}", e);
            AuthApiError::InternalError
        })?;

    let user = state
        .user_store
        .create_user(&username, &email, &password_hash)
        .map_err(|e| {
            if e.is_duplicate() {
                warn!("Registration rejected for {}: {}", username, e);
                AuthApiError::UserAlreadyExists
            } else {
                error!("Failed to register user {}: {}", username, e);
                AuthApiError::InternalError
            }
        })?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user: UserResponse::from_user(&user),
        }),
    ))
}

/// Login endpoint - POST /users/login
///
/// Unknown identities and wrong passwords both run one Argon2 verification
/// and end in the same 401.
pub async fn login(
    State(state): State<AuthState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AuthApiError> {
    let Json(payload) = payload.map_err(|e| AuthApiError::InvalidRequest(e.body_text()))?;

    let identity = match payload.identity() {
        Some(identity) if !payload.password.is_empty() => identity,
        identity => {
            let mut fields = Vec::new();
            if identity.is_none() {
                fields.push("email");
            }
            if payload.password.is_empty() {
                fields.push("password");
            }
            return Err(AuthApiError::MissingFields {
                message: "Email and password are required",
                fields,
            });
        }
    };

    info!("🔐 Login attempt by {}", identity.kind());

    let lookup = match &identity {
        LoginIdentity::Username(username) => state.user_store.get_user_by_username(username),
        LoginIdentity::Email(email) => state.user_store.get_user_by_email(email),
    };
    let user = lookup.map_err(|e| {
        error!("User lookup failed: {}", e);
        AuthApiError::InternalError
    })?;

    let password = payload.password;
    let (valid, user) = tokio::task::spawn_blocking(move || {
        let valid = match &user {
            Some(user) => password::verify_password(&password, &user.password_hash),
            None => password::verify_dummy(&password),
        };
        (valid, user)
    })
    .await
    .map_err(|e| {
        error!("Password verification task failed: {}", e);
        AuthApiError::InternalError
    })?;

    let user = match user {
        Some(user) if valid => user,
        _ => {
            warn!("❌ Failed login attempt by {}", identity.kind());
            return Err(AuthApiError::InvalidCredentials);
        }
    };

    let token = state
        .jwt_handler
        .generate_token(&AuthUser::from_user(&user))
        .map_err(|e| {
            error!("Failed to issue token for {}: {}", user.username, e);
            AuthApiError::InternalError
        })?;

    info!("✅ Login successful: {} ({})", user.username, user.id);

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: UserResponse::from_user(&user),
    }))
}

/// Logout endpoint - POST /users/logout
///
/// Tokens are stateless, so there is nothing to revoke server side; the
/// client drops its copy.
pub async fn logout(user: AuthUser) -> Json<Value> {
    info!("👋 Logout: {} ({})", user.username, user.user_id);
    Json(json!({ "message": "Logged out successfully" }))
}

/// Refresh endpoint - POST /users/refresh-token
pub async fn refresh_token(
    State(state): State<AuthState>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>, AuthApiError> {
    let token = bearer_token(&headers).map_err(|_| AuthApiError::InvalidToken)?;

    let token = state.jwt_handler.refresh_token(token).map_err(|e| match e {
        TokenError::NotEligible => AuthApiError::NotEligibleForRefresh,
        TokenError::MissingSigningKey | TokenError::Encoding(_) => {
            error!("Token refresh failed: {}", e);
            AuthApiError::InternalError
        }
        _ => AuthApiError::InvalidToken,
    })?;

    Ok(Json(RefreshResponse { token }))
}

/// Get current user info - GET /users/me
/// Built from the token identity (no database lookup needed)
pub async fn get_current_user(user: AuthUser) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}

/// Auth API errors
#[derive(Debug)]
pub enum AuthApiError {
    /// Body was not valid JSON for the endpoint
    InvalidRequest(String),
    MissingFields {
        message: &'static str,
        fields: Vec<&'static str>,
    },
    InvalidCredentials,
    InvalidToken,
    NotEligibleForRefresh,
    UserAlreadyExists,
    InternalError,
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AuthApiError::InvalidRequest(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid request data", "details": details }),
            ),
            AuthApiError::MissingFields { message, fields } => (
                StatusCode::BAD_REQUEST,
                json!({ "error": message, "fields": fields }),
            ),
            AuthApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Invalid email/username or password" }),
            ),
            AuthApiError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Invalid or expired token" }),
            ),
            AuthApiError::NotEligibleForRefresh => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Token not eligible for refresh yet" }),
            ),
            AuthApiError::UserAlreadyExists => (
                StatusCode::CONFLICT,
                json!({ "error": "Username or email already exists" }),
            ),
            AuthApiError::InternalError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::middleware::auth_middleware;
    use axum::{body::Body, http::Request, middleware, routing::post, Router};
    use chrono::{Duration, Utc};
    use tower::ServiceExt;

    fn test_state() -> AuthState {
        AuthState::new(
            Arc::new(UserStore::in_memory().unwrap()),
            Arc::new(JwtHandler::new("api-test-secret".to_string())),
        )
    }

    fn app(state: AuthState) -> Router {
        Router::new()
            .route("/register", post(register))
            .route("/login", post(login))
            .with_state(state)
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_register_hides_password() {
        let state = test_state();
        let (status, body) = post_json(
            app(state.clone()),
            "/register",
            json!({ "username": "alice", "email": "a@x.com", "password": "secret123" }),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "User registered successfully");
        assert!(body["user"]["id"].is_string());
        assert_eq!(body["user"]["username"], "alice");
        assert!(!body.to_string().contains("secret123"));
        assert!(body["user"].get("password").is_none());

        let stored = state.user_store.get_user_by_username("alice").unwrap().unwrap();
        assert!(stored.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_register_missing_fields() {
        let (status, body) = post_json(
            app(test_state()),
            "/register",
            json!({ "username": "alice", "email": "" }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Username, email, and password are required");
        assert_eq!(body["fields"], json!(["email", "password"]));
    }

    #[tokio::test]
    async fn test_register_rejects_non_json() {
        let response = app(test_state())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/register")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let state = test_state();
        let (status, _) = post_json(
            app(state.clone()),
            "/register",
            json!({ "username": "alice", "email": "a@x.com", "password": "secret123" }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = post_json(
            app(state.clone()),
            "/register",
            json!({ "username": "mallory", "email": "a@x.com", "password": "other" }),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Username or email already exists");

        let stored = state.user_store.get_user_by_email("a@x.com").unwrap().unwrap();
        assert_eq!(stored.username, "alice");
    }

    #[tokio::test]
    async fn test_login_by_email_and_username() {
        let state = test_state();
        post_json(
            app(state.clone()),
            "/register",
            json!({ "username": "alice", "email": "a@x.com", "password": "secret123" }),
        )
        .await;

        let (status, body) = post_json(
            app(state.clone()),
            "/login",
            json!({ "email": "a@x.com", "password": "secret123" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Login successful");
        assert_eq!(body["user"]["email"], "a@x.com");

        let claims = state
            .jwt_handler
            .validate_token(body["token"].as_str().unwrap())
            .unwrap();
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.user_id, body["user"]["id"].as_str().unwrap());

        let (status, _) = post_json(
            app(state),
            "/login",
            json!({ "username": "alice", "password": "secret123" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let state = test_state();
        post_json(
            app(state.clone()),
            "/register",
            json!({ "username": "alice", "email": "a@x.com", "password": "secret123" }),
        )
        .await;

        let wrong_password = post_json(
            app(state.clone()),
            "/login",
            json!({ "username": "alice", "password": "nope" }),
        )
        .await;
        let unknown_user = post_json(
            app(state),
            "/login",
            json!({ "email": "ghost@x.com", "password": "nope" }),
        )
        .await;

        assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password, unknown_user);
        assert_eq!(
            wrong_password.1,
            json!({ "error": "Invalid email/username or password" })
        );
    }

    #[tokio::test]
    async fn test_login_missing_fields() {
        let (status, body) =
            post_json(app(test_state()), "/login", json!({ "email": "a@x.com" })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["fields"], json!(["password"]));
    }

    #[tokio::test]
    async fn test_refresh_near_expiry_returns_new_token() {
        let state = test_state();
        let user = AuthUser {
            user_id: "7f1c2a4e-0000-4000-8000-000000000002".to_string(),
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
        };
        let issued = Utc::now() - Duration::hours(24) + Duration::minutes(30);
        let old = state.jwt_handler.generate_token_at(&user, issued).unwrap();
        let old_claims = state.jwt_handler.validate_token(&old).unwrap();

        let app = Router::new()
            .route("/refresh-token", post(refresh_token))
            .route_layer(middleware::from_fn_with_state(
                state.jwt_handler.clone(),
                auth_middleware,
            ))
            .with_state(state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/refresh-token")
                    .header("Authorization", format!("Bearer {}", old))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        let fresh = body["token"].as_str().unwrap();
        assert_ne!(fresh, old);

        let claims = state.jwt_handler.validate_token(fresh).unwrap();
        assert_eq!(claims.identity(), user);
        assert!(claims.exp > old_claims.exp);
    }

    #[test]
    fn test_auth_api_error_responses() {
        let invalid_creds = AuthApiError::InvalidCredentials.into_response();
        assert_eq!(invalid_creds.status(), StatusCode::UNAUTHORIZED);

        let conflict = AuthApiError::UserAlreadyExists.into_response();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let not_eligible = AuthApiError::NotEligibleForRefresh.into_response();
        assert_eq!(not_eligible.status(), StatusCode::UNAUTHORIZED);

        let internal = AuthApiError::InternalError.into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
