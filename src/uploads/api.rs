//! Upload API Endpoints
//! Mission: CRUD over the caller's upload documents

use crate::auth::{models::AuthUser, user_store::UserStore};
use crate::uploads::{
    models::{
        CreateUploadRequest, CreateUploadResponse, DeleteUploadParams, Upload,
        UploadListResponse,
    },
    store::UploadStore,
};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct UploadState {
    pub upload_store: Arc<UploadStore>,
    pub user_store: Arc<UserStore>,
}

/// Create upload - POST /upload/upload
pub async fn create_upload(
    State(state): State<UploadState>,
    user: AuthUser,
    payload: Result<Json<CreateUploadRequest>, JsonRejection>,
) -> Result<Json<CreateUploadResponse>, UploadApiError> {
    let Json(payload) = payload.map_err(|e| UploadApiError::InvalidRequest(e.body_text()))?;

    if payload.video_link.trim().is_empty() {
        return Err(UploadApiError::MissingField("Video Link is required"));
    }

    // Token identity can outlive the account
    let owner = state
        .user_store
        .get_user_by_id(&user.user_id)
        .map_err(|e| {
            error!("User lookup failed for {}: {}", user.user_id, e);
            UploadApiError::InternalError
        })?;
    if owner.is_none() {
        warn!("Upload rejected, user {} no longer exists", user.user_id);
        return Err(UploadApiError::UserNotFound);
    }

    let upload = Upload {
        id: Uuid::new_v4().to_string(),
        user_id: user.user_id,
        title: payload.title,
        description: payload.description,
        video_link: payload.video_link.trim().to_string(),
        folders: payload.folders,
        tags: payload.tags,
        created_at: Utc::now().to_rfc3339(),
    };

    state.upload_store.insert(&upload).map_err(|e| {
        error!("Failed to save upload: {}", e);
        UploadApiError::InternalError
    })?;

    Ok(Json(CreateUploadResponse {
        message: "Upload successful".to_string(),
        upload_id: upload.id,
    }))
}

/// Delete upload - DELETE /upload/delete?id=...
pub async fn delete_upload(
    State(state): State<UploadState>,
    user: AuthUser,
    Query(params): Query<DeleteUploadParams>,
) -> Result<Json<Value>, UploadApiError> {
    let id = params
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or(UploadApiError::MissingField("Upload ID is required"))?;

    let deleted = state
        .upload_store
        .delete_for_user(id.trim(), &user.user_id)
        .map_err(|e| {
            error!("Failed to delete upload {}: {}", id, e);
            UploadApiError::InternalError
        })?;

    if !deleted {
        return Err(UploadApiError::UploadNotFound);
    }

    Ok(Json(json!({ "message": "Upload deleted successfully" })))
}

/// List uploads - GET /upload/all
pub async fn list_uploads(
    State(state): State<UploadState>,
    user: AuthUser,
) -> Result<Json<UploadListResponse>, UploadApiError> {
    let uploads = state
        .upload_store
        .list_for_user(&user.user_id)
        .map_err(|e| {
            error!("Failed to fetch uploads for {}: {}", user.user_id, e);
            UploadApiError::InternalError
        })?;

    Ok(Json(UploadListResponse { uploads }))
}

/// Upload API errors
#[derive(Debug)]
pub enum UploadApiError {
    InvalidRequest(String),
    MissingField(&'static str),
    UserNotFound,
    UploadNotFound,
    InternalError,
}

impl IntoResponse for UploadApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            UploadApiError::InvalidRequest(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid upload data", "details": details }),
            ),
            UploadApiError::MissingField(message) => {
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            UploadApiError::UserNotFound => {
                (StatusCode::BAD_REQUEST, json!({ "error": "User not found" }))
            }
            UploadApiError::UploadNotFound => {
                (StatusCode::NOT_FOUND, json!({ "error": "Upload not found" }))
            }
            UploadApiError::InternalError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
