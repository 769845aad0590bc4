use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{CatalogUser, FoodItem, NewFood};
use super::errors::CatalogError;

/// Document store operations the catalog relies on.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<CatalogUser>, CatalogError>;

    async fn find_food_by_id(&self, id: Uuid) -> Result<Option<FoodItem>, CatalogError>;
    /// Persists the item and assigns its identifier.
    async fn insert_food(&self, food: NewFood) -> Result<FoodItem, CatalogError>;
    /// Returns whether a record was removed.
    async fn delete_food_by_id(&self, id: Uuid) -> Result<bool, CatalogError>;
    async fn find_all_food(&self) -> Result<Vec<FoodItem>, CatalogError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::food::domain::Role;

    #[derive(Default)]
    pub struct MockCatalogRepository {
        users: Mutex<HashMap<Uuid, CatalogUser>>,
        foods: Mutex<Vec<FoodItem>>, // insertion order
        pub insert_calls: AtomicUsize,
        pub delete_calls: AtomicUsize,
        pub fail_insert: AtomicBool,
        pub fail_delete: AtomicBool,
        pub fail_list: AtomicBool,
    }

    impl MockCatalogRepository {
        pub fn add_user(&self, role: Role) -> Uuid {
            let user = CatalogUser { id: Uuid::new_v4(), role };
            self.users.lock().unwrap().insert(user.id, user);
            user.id
        }

        /// Store an item directly, bypassing the call counters.
        pub fn seed_food(&self, name: &str, public_id: &str) -> FoodItem {
            let item = FoodItem {
                id: Uuid::new_v4(),
                name: name.to_string(),
                description: format!("{name} description"),
                price: 10.0,
                category: "Seeded".to_string(),
                image: crate::food::domain::ImageRef {
                    url: format!("https://images.example.com/{public_id}.png"),
                    public_id: public_id.to_string(),
                },
            };
            self.foods.lock().unwrap().push(item.clone());
            item
        }

        pub fn food_count(&self) -> usize { self.foods.lock().unwrap().len() }

        pub fn inserts(&self) -> usize { self.insert_calls.load(Ordering::SeqCst) }

        pub fn deletes(&self) -> usize { self.delete_calls.load(Ordering::SeqCst) }
    }

    #[async_trait]
    impl CatalogRepository for MockCatalogRepository {
        async fn find_user_by_id(&self, id: Uuid) -> Result<Option<CatalogUser>, CatalogError> {
            Ok(self.users.lock().unwrap().get(&id).copied())
        }

        async fn find_food_by_id(&self, id: Uuid) -> Result<Option<FoodItem>, CatalogError> {
            Ok(self.foods.lock().unwrap().iter().find(|f| f.id == id).cloned())
        }

        async fn insert_food(&self, food: NewFood) -> Result<FoodItem, CatalogError> {
            self.insert_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_insert.load(Ordering::SeqCst) {
                return Err(CatalogError::Persistence("insert rejected".into()));
            }
            let item = FoodItem {
                id: Uuid::new_v4(),
                name: food.fields.name,
                description: food.fields.description,
                price: food.fields.price,
                category: food.fields.category,
                image: food.image,
            };
            self.foods.lock().unwrap().push(item.clone());
            Ok(item)
        }

        async fn delete_food_by_id(&self, id: Uuid) -> Result<bool, CatalogError> {
            self.delete_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_delete.load(Ordering::SeqCst) {
                return Err(CatalogError::Persistence("delete rejected".into()));
            }
            let mut foods = self.foods.lock().unwrap();
            let before = foods.len();
            foods.retain(|f| f.id != id);
            Ok(foods.len() < before)
        }

        async fn find_all_food(&self) -> Result<Vec<FoodItem>, CatalogError> {
            if self.fail_list.load(Ordering::SeqCst) {
                return Err(CatalogError::Persistence("list rejected".into()));
            }
            Ok(self.foods.lock().unwrap().clone())
        }
    }
}
