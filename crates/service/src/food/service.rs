use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::domain::{FoodCandidate, FoodItem, ImageRef, NewFood};
use super::errors::CatalogError;
use super::repository::CatalogRepository;
use super::temp_file::TempUpload;
use crate::image::{ImageStore, UploadOptions};

/// Catalog service configuration
#[derive(Clone, Debug)]
pub struct CatalogConfig {
    /// Remote folder every food image is uploaded into.
    pub image_folder: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { image_folder: "food-items".into() }
    }
}

/// Food catalog business service independent of web framework.
///
/// Every call is a sequential chain of awaited collaborator calls; nothing is retried.
pub struct FoodCatalogService<R: CatalogRepository + ?Sized, I: ImageStore + ?Sized> {
    repo: Arc<R>,
    images: Arc<I>,
    cfg: CatalogConfig,
}

/// Trait-object form used by the HTTP layer.
pub type DynFoodCatalogService = FoodCatalogService<dyn CatalogRepository, dyn ImageStore>;

impl<R: CatalogRepository + ?Sized, I: ImageStore + ?Sized> FoodCatalogService<R, I> {
    pub fn new(repo: Arc<R>, images: Arc<I>, cfg: CatalogConfig) -> Self {
        Self { repo, images, cfg }
    }

    /// Unknown callers and non-admins are both rejected.
    async fn authorize(&self, caller_id: Uuid) -> Result<(), CatalogError> {
        match self.repo.find_user_by_id(caller_id).await? {
            Some(user) if user.is_admin() => Ok(()),
            Some(_) => {
                debug!(%caller_id, "caller is not an admin");
                Err(CatalogError::Unauthorized)
            }
            None => {
                debug!(%caller_id, "caller not found");
                Err(CatalogError::Unauthorized)
            }
        }
    }

    /// Add a food item: check the caller, upload the image, then persist the record.
    ///
    /// The temporary file is removed exactly once on every path; a failed removal is only logged.
    /// If persisting fails after a successful upload, the remote image is left in place.
    #[instrument(skip(self, input, image), fields(caller_id = %caller_id, name = %input.name))]
    pub async fn create_food(
        &self,
        caller_id: Uuid,
        input: FoodCandidate,
        image: Option<TempUpload>,
    ) -> Result<FoodItem, CatalogError> {
        if let Err(e) = self.authorize(caller_id).await {
            if let Some(tmp) = image {
                tmp.release().await;
            }
            return Err(e);
        }

        let Some(image) = image else {
            return Err(CatalogError::Validation("Image file is required".into()));
        };

        let fields = match input.validate() {
            Ok(f) => f,
            Err(e) => {
                image.release().await;
                return Err(e);
            }
        };

        let opts = UploadOptions::image(self.cfg.image_folder.clone());
        let uploaded = self.images.upload(image.path(), &opts).await;
        image.release().await;
        let uploaded = uploaded.map_err(|e| {
            error!(error = %e, "image upload failed");
            CatalogError::Upload(e.to_string())
        })?;

        let public_id = uploaded.public_id.clone();
        let new_food = NewFood {
            fields,
            image: ImageRef { url: uploaded.url, public_id: uploaded.public_id },
        };
        let item = self.repo.insert_food(new_food).await.map_err(|e| {
            // the uploaded image stays orphaned; no compensating destroy
            error!(error = %e, %public_id, "food insert failed after upload");
            e
        })?;

        info!(food_id = %item.id, public_id = %item.image.public_id, "food_added");
        Ok(item)
    }

    /// All food items in store order. Open read, no caller check.
    ///
    /// # Examples
    /// ```
    /// use service::food::{repository::mock::MockCatalogRepository, service::{CatalogConfig, FoodCatalogService}};
    /// use service::image::mock::MockImageStore;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockCatalogRepository::default());
    /// repo.seed_food("Greek salad", "food-items/salad");
    /// let svc = FoodCatalogService::new(repo, Arc::new(MockImageStore::default()), CatalogConfig::default());
    /// let foods = tokio_test::block_on(svc.list_foods()).unwrap();
    /// assert_eq!(foods.len(), 1);
    /// assert_eq!(foods[0].image.public_id, "food-items/salad");
    /// ```
    pub async fn list_foods(&self) -> Result<Vec<FoodItem>, CatalogError> {
        let foods = self.repo.find_all_food().await.map_err(|e| {
            error!(error = %e, "food listing failed");
            e
        })?;
        debug!(count = foods.len(), "food_listed");
        Ok(foods)
    }

    /// Remove a food item and, best-effort, its remote image.
    ///
    /// Failing to destroy the image is logged and never changes the result.
    #[instrument(skip(self), fields(caller_id = %caller_id, food_id = %food_id))]
    pub async fn delete_food(&self, caller_id: Uuid, food_id: Uuid) -> Result<(), CatalogError> {
        self.authorize(caller_id).await?;

        let item = self
            .repo
            .find_food_by_id(food_id)
            .await?
            .ok_or(CatalogError::NotFound)?;

        let public_id = item.image.public_id.as_str();
        if !public_id.is_empty() {
            if let Err(e) = self.images.destroy(public_id).await {
                warn!(%public_id, error = %e, "could not delete remote image");
            }
        }

        let removed = self.repo.delete_food_by_id(food_id).await.map_err(|e| {
            error!(error = %e, "food delete failed");
            e
        })?;
        // a concurrent delete won the race
        if !removed {
            return Err(CatalogError::NotFound);
        }

        info!("food_removed");
        Ok(())
    }
}
