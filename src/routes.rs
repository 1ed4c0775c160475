//! Router assembly
//!
//! Public routes: register, login, health. Everything else sits behind
//! `auth_middleware`.

use crate::auth::{api as auth_api, auth_middleware, AuthState, JwtHandler, UserStore};
use crate::middleware::request_logging;
use crate::uploads::{api as upload_api, UploadState, UploadStore};
use axum::{
    extract::FromRef,
    http::{header, Method},
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

/// Application state, built once in `main` and handed to the router
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthState,
    pub uploads: UploadState,
}

impl AppState {
    pub fn new(
        user_store: Arc<UserStore>,
        upload_store: Arc<UploadStore>,
        jwt_handler: Arc<JwtHandler>,
    ) -> Self {
        Self {
            auth: AuthState::new(user_store.clone(), jwt_handler),
            uploads: UploadState {
                upload_store,
                user_store,
            },
        }
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl FromRef<AppState> for UploadState {
    fn from_ref(state: &AppState) -> Self {
        state.uploads.clone()
    }
}

pub fn build_router(state: AppState) -> Router {
    let jwt_handler = state.auth.jwt_handler.clone();

    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/users/register", post(auth_api::register))
        .route("/users/login", post(auth_api::login));

    let protected_routes = Router::new()
        .route("/users/logout", post(auth_api::logout))
        .route("/users/refresh-token", post(auth_api::refresh_token))
        .route("/users/me", get(auth_api::get_current_user))
        .route("/upload/upload", post(upload_api::create_upload))
        .route("/upload/delete", delete(upload_api::delete_upload))
        .route("/upload/all", get(upload_api::list_uploads))
        .route_layer(middleware::from_fn_with_state(jwt_handler, auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
        .expose_headers([header::CONTENT_LENGTH])
        .max_age(Duration::from_secs(12 * 3600))
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
