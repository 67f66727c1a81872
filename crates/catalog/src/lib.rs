//! Product catalog store for Earth-observation files.
//!
//! This crate keeps one record per product (a data file of a given product
//! type) together with its geographic bounding box:
//! - Registration, upsert, correction and removal of products
//! - Lookup by id or by (file_path, product_type)
//! - Lazy streams by product type and by acquisition-time overlap
//! - Filtered, paginated search
//! - Bounding-box overlap and point queries backed by an R*-tree
//!
//! Product rows and bounding-box rows are always written in one transaction,
//! so the spatial index never refers to a missing product.

pub mod error;
pub mod models;
pub mod repos;
pub mod spatial;
pub mod store;

pub use error::{CatalogError, CatalogResult};
pub use repos::{BatchSummary, ProductRepo, ProductStream, Registration, SpatialRepo};
pub use store::{CatalogStore, SqliteStore, StoreOptions};

use eocat_core::CatalogConfig;
use std::sync::Arc;

/// Create a catalog store from configuration.
pub async fn from_config(config: &CatalogConfig) -> CatalogResult<Arc<dyn CatalogStore>> {
    config.validate().map_err(CatalogError::Config)?;
    let store = SqliteStore::new(&config.path, StoreOptions::from(config)).await?;
    Ok(Arc::new(store) as Arc<dyn CatalogStore>)
}
