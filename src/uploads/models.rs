//! Upload documents and request/response bodies

use serde::{Deserialize, Serialize};

/// Upload metadata document owned by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Upload {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub video_link: String,
    #[serde(default)]
    pub folders: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: String,
}

/// POST /upload/upload body. Owner comes from the token, never from here.
#[derive(Debug, Default, Deserialize)]
pub struct CreateUploadRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub video_link: String,
    #[serde(default)]
    pub folders: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteUploadParams {
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateUploadResponse {
    pub message: String,
    pub upload_id: String,
}

#[derive(Debug, Serialize)]
pub struct UploadListResponse {
    pub uploads: Vec<Upload>,
}
