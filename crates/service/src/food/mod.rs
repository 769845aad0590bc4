//! Food catalog: three-layer architecture (domain, repository, service).
//!
//! The service coordinates the caller check, the image store and the document store
//! in a fixed order; see `service::FoodCatalogService`.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod repo;
pub mod service;
pub mod temp_file;

pub use service::FoodCatalogService;
