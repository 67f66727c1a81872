//! Core domain types and shared logic for the eocat product catalog.
//!
//! This crate defines the canonical data model used by the catalog store:
//! - Geographic bounding boxes and their overlap test
//! - Canonical UTC timestamps and validated time ranges
//! - Product registration input, stored records and metadata patches
//! - Listing filters for catalog searches
//! - Catalog configuration

pub mod bbox;
pub mod config;
pub mod error;
pub mod product;
pub mod query;
pub mod timestamp;

pub use bbox::BoundingBox;
pub use config::{CatalogConfig, RemovePolicy};
pub use error::{Error, Result};
pub use product::{FieldUpdate, NewProduct, Product, ProductId, ProductPatch};
pub use query::ProductQuery;
pub use timestamp::{TimeRange, Timestamp};
