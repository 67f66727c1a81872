//! Spatial query repository.

use crate::error::CatalogResult;
use async_trait::async_trait;
use eocat_core::{BoundingBox, Product};

/// Repository for bounding-box queries.
#[async_trait]
pub trait SpatialRepo: Send + Sync {
    /// Get all products whose bounding box overlaps `query`, in ascending id
    /// order. Touching edges count as overlap.
    async fn query_bbox(&self, query: &BoundingBox) -> CatalogResult<Vec<Product>>;

    /// Get all products whose bounding box contains the point.
    async fn query_point(&self, lat: f64, lon: f64) -> CatalogResult<Vec<Product>>;

    /// Number of products present in the spatial index.
    async fn indexed_count(&self) -> usize;
}
