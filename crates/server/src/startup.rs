use std::sync::Arc;

use axum::Router;
use configs::AppConfig;
use migration::{Migrator, MigratorTrait};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, auth::ServerState};
use service::food::{
    repo::seaorm::SeaOrmCatalogRepository,
    repository::CatalogRepository,
    service::{CatalogConfig, DynFoodCatalogService, FoodCatalogService},
};
use service::image::{CloudinaryImageStore, ImageStore};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Wire the production collaborators behind the catalog service.
pub fn build_catalog(db: sea_orm::DatabaseConnection, cfg: &AppConfig) -> Arc<DynFoodCatalogService> {
    let repo: Arc<dyn CatalogRepository> = Arc::new(SeaOrmCatalogRepository { db });
    let images: Arc<dyn ImageStore> = Arc::new(CloudinaryImageStore::new(&cfg.image_store));
    let catalog_cfg = CatalogConfig { image_folder: cfg.image_store.folder.clone() };
    Arc::new(FoodCatalogService::new(repo, images, catalog_cfg))
}

/// Public entry: prepare storage, build the app and run the HTTP server
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    common::env::ensure_upload_dir(&cfg.uploads.dir).await?;

    let db_cfg = models::db::DatabaseConfig::from(&cfg.database);
    let db = models::db::connect_with_config(&db_cfg).await?;
    Migrator::up(&db, None)
        .await
        .map_err(|e| StartupError::Runtime(format!("migrations failed: {e}")))?;
    info!(event = "migrations_applied", "database schema up to date");

    let catalog = build_catalog(db, &cfg);
    let state = ServerState::new(catalog, &cfg);
    let app: Router = routes::build_router(state, build_cors());

    let listener = tokio::net::TcpListener::bind((cfg.server.host.as_str(), cfg.server.port)).await?;
    let addr = listener.local_addr()?;
    info!(%addr, uploads = %cfg.uploads.dir, "starting food catalog server");
    axum::serve(listener, app).await?;
    Ok(())
}
