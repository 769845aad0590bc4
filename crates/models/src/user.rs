use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Roles stored in `user.role`. Unknown values are treated as plain users.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Self {
        if s == "admin" { Role::Admin } else { Role::User }
    }
}

impl Model {
    pub fn role(&self) -> Role { Role::parse(&self.role) }
}

pub fn validate_email(email: &str) -> Result<(), errors::ModelError> {
    if !email.contains('@') { return Err(errors::ModelError::Validation("invalid email".into())); }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() { return Err(errors::ModelError::Validation("name required".into())); }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, name: &str, email: &str, role: Role) -> Result<Model, errors::ModelError> {
    validate_email(email)?;
    validate_name(name)?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        role: Set(role.as_str().to_string()),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn hard_delete(db: &DatabaseConnection, id: Uuid) -> Result<(), errors::ModelError> {
    Entity::delete_by_id(id).exec(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admin_string_is_admin() {
        assert_eq!(Role::parse("admin"), Role::Admin);
        assert_eq!(Role::parse("Admin"), Role::User);
        assert_eq!(Role::parse(""), Role::User);
        assert_eq!(Role::Admin.as_str(), "admin");
    }

    #[test]
    fn email_requires_at_sign() {
        assert!(validate_email("bob.example.com").is_err());
        assert!(validate_email("bob@example.com").is_ok());
    }
}
