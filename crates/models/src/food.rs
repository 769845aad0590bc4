use sea_orm::{entity::prelude::*, Set, DatabaseConnection, QueryOrder};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "food")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    pub category: String,
    pub image_url: String,
    pub image_public_id: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn require_text(field: &str, value: &str) -> Result<(), errors::ModelError> {
    if value.trim().is_empty() {
        return Err(errors::ModelError::Validation(format!("{field} required")));
    }
    Ok(())
}

pub fn validate_price(price: f64) -> Result<(), errors::ModelError> {
    if !price.is_finite() {
        return Err(errors::ModelError::Validation("price must be a number".into()));
    }
    Ok(())
}

/// Field checks shared by the service boundary and `create`.
pub fn validate_fields(name: &str, description: &str, price: f64, category: &str) -> Result<(), errors::ModelError> {
    require_text("name", name)?;
    require_text("description", description)?;
    validate_price(price)?;
    require_text("category", category)?;
    Ok(())
}

pub fn validate_image(url: &str, public_id: &str) -> Result<(), errors::ModelError> {
    require_text("image url", url)?;
    require_text("image public_id", public_id)?;
    Ok(())
}

pub async fn create(
    db: &DatabaseConnection,
    name: &str,
    description: &str,
    price: f64,
    category: &str,
    image_url: &str,
    image_public_id: &str,
) -> Result<Model, errors::ModelError> {
    validate_fields(name, description, price, category)?;
    validate_image(image_url, image_public_id)?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(description.to_string()),
        price: Set(price),
        category: Set(category.to_string()),
        image_url: Set(image_url.to_string()),
        image_public_id: Set(image_public_id.to_string()),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// All rows, oldest first.
pub async fn list(db: &DatabaseConnection) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Returns whether a row was removed.
pub async fn hard_delete(db: &DatabaseConnection, id: Uuid) -> Result<bool, errors::ModelError> {
    let res = Entity::delete_by_id(id).exec(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(res.rows_affected > 0)
}
