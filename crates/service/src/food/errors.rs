use thiserror::Error;

/// Business errors for catalog workflows
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("caller is not an admin")]
    Unauthorized,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("image upload failed: {0}")]
    Upload(String),
    #[error("food item not found")]
    NotFound,
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl CatalogError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            CatalogError::Unauthorized => 2001,
            CatalogError::Validation(_) => 2002,
            CatalogError::NotFound => 2003,
            CatalogError::Upload(_) => 2101,
            CatalogError::Persistence(_) => 2200,
        }
    }

    /// Upload and persistence failures are internal; their detail stays in the logs.
    pub fn is_internal(&self) -> bool {
        matches!(self, CatalogError::Upload(_) | CatalogError::Persistence(_))
    }
}

impl From<models::errors::ModelError> for CatalogError {
    fn from(e: models::errors::ModelError) -> Self {
        match e {
            models::errors::ModelError::Validation(msg) => CatalogError::Validation(msg),
            models::errors::ModelError::Db(msg) => CatalogError::Persistence(msg),
        }
    }
}
