//! Hosted image storage.
//!
//! `ImageStore` is injected into the catalog service; `CloudinaryImageStore` talks to the real
//! service and `mock::MockImageStore` records calls for tests.

pub mod cloudinary;
pub mod mock;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

pub use cloudinary::CloudinaryImageStore;

#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("io error: {0}")]
    Io(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("image not deleted: {0}")]
    NotDeleted(String),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResourceType {
    Image,
    Video,
    Raw,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Image => "image",
            ResourceType::Video => "video",
            ResourceType::Raw => "raw",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadOptions {
    pub folder: String,
    pub overwrite: bool,
    pub resource_type: ResourceType,
}

impl UploadOptions {
    /// Image upload into `folder`, replacing any asset with the same id.
    pub fn image(folder: impl Into<String>) -> Self {
        Self { folder: folder.into(), overwrite: true, resource_type: ResourceType::Image }
    }
}

/// Result of a successful upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadedImage {
    pub url: String,
    pub public_id: String,
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn upload(&self, path: &Path, opts: &UploadOptions) -> Result<UploadedImage, ImageStoreError>;
    async fn destroy(&self, public_id: &str) -> Result<(), ImageStoreError>;
}
