use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use models::user::Role;

use super::errors::CatalogError;

/// Remote image owned by exactly one food item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    pub public_id: String,
}

/// Persisted catalog entry (business view)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub image: ImageRef,
}

/// Caller as seen by the authorization check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogUser {
    pub id: Uuid,
    pub role: Role,
}

impl CatalogUser {
    pub fn is_admin(&self) -> bool { self.role == Role::Admin }
}

/// Raw fields as submitted; `price` arrives as text from the form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoodCandidate {
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: String,
}

/// Validated fields, ready to be combined with an uploaded image.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodFields {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
}

/// Insert payload for the document store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFood {
    pub fields: FoodFields,
    pub image: ImageRef,
}

impl FoodCandidate {
    pub fn validate(self) -> Result<FoodFields, CatalogError> {
        let price = self
            .price
            .trim()
            .parse::<f64>()
            .map_err(|_| CatalogError::Validation("price must be a number".into()))?;
        models::food::validate_fields(&self.name, &self.description, price, &self.category)?;
        Ok(FoodFields {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            price,
            category: self.category.trim().to_string(),
        })
    }
}

impl From<models::food::Model> for FoodItem {
    fn from(m: models::food::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            price: m.price,
            category: m.category,
            image: ImageRef { url: m.image_url, public_id: m.image_public_id },
        }
    }
}
