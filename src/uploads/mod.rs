//! Upload metadata: document store and protected CRUD handlers

pub mod api;
pub mod models;
pub mod store;

pub use api::UploadState;
pub use store::UploadStore;
