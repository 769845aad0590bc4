use sea_orm::{DatabaseConnection, EntityTrait};
use uuid::Uuid;

use crate::food::domain::{CatalogUser, FoodItem, NewFood};
use crate::food::errors::CatalogError;
use crate::food::repository::CatalogRepository;

pub struct SeaOrmCatalogRepository {
    pub db: DatabaseConnection,
}

#[async_trait::async_trait]
impl CatalogRepository for SeaOrmCatalogRepository {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<CatalogUser>, CatalogError> {
        let res = models::user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| CatalogError::Persistence(e.to_string()))?;
        Ok(res.map(|u| CatalogUser { id: u.id, role: u.role() }))
    }

    async fn find_food_by_id(&self, id: Uuid) -> Result<Option<FoodItem>, CatalogError> {
        let res = models::food::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| CatalogError::Persistence(e.to_string()))?;
        Ok(res.map(FoodItem::from))
    }

    async fn insert_food(&self, food: NewFood) -> Result<FoodItem, CatalogError> {
        let f = food.fields;
        let created = models::food::create(
            &self.db,
            &f.name,
            &f.description,
            f.price,
            &f.category,
            &food.image.url,
            &food.image.public_id,
        )
        .await?;
        Ok(created.into())
    }

    async fn delete_food_by_id(&self, id: Uuid) -> Result<bool, CatalogError> {
        Ok(models::food::hard_delete(&self.db, id).await?)
    }

    async fn find_all_food(&self) -> Result<Vec<FoodItem>, CatalogError> {
        let rows = models::food::list(&self.db).await?;
        Ok(rows.into_iter().map(FoodItem::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::food::domain::{FoodFields, ImageRef, Role};
    use crate::test_support::get_db;

    #[tokio::test]
    async fn seaorm_repository_roundtrip() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skip: cannot connect to db: {}", e);
                return Ok(());
            }
        };
        let repo = SeaOrmCatalogRepository { db: db.clone() };

        let email = format!("repo_{}@example.com", Uuid::new_v4());
        let admin = models::user::create(&db, "Repo Admin", &email, Role::Admin).await?;
        let caller = repo.find_user_by_id(admin.id).await?.unwrap();
        assert!(caller.is_admin());

        let item = repo
            .insert_food(NewFood {
                fields: FoodFields { name: "Rolls".into(), description: "Spring".into(), price: 6.5, category: "Rolls".into() },
                image: ImageRef { url: "https://img/r.png".into(), public_id: format!("food-items/{}", Uuid::new_v4()) },
            })
            .await?;
        let found = repo.find_food_by_id(item.id).await?.unwrap();
        assert_eq!(found, item);
        assert!(repo.find_all_food().await?.iter().any(|f| f.id == item.id));

        assert!(repo.delete_food_by_id(item.id).await?);
        assert!(repo.find_food_by_id(item.id).await?.is_none());
        assert!(!repo.delete_food_by_id(item.id).await?);

        models::user::hard_delete(&db, admin.id).await?;
        Ok(())
    }
}
