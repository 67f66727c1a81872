//! Product repository.

use crate::error::CatalogResult;
use async_trait::async_trait;
use eocat_core::{NewProduct, Product, ProductId, ProductPatch, ProductQuery, TimeRange};
use futures::Stream;
use std::pin::Pin;

/// A lazy stream of products.
///
/// Rows are fetched page by page in ascending id order. Dropping the stream
/// stops fetching; calling the producing method again starts over.
pub type ProductStream<'a> = Pin<Box<dyn Stream<Item = CatalogResult<Product>> + Send + 'a>>;

/// Outcome of an upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub product: Product,
    /// `true` if the key was not registered before.
    pub created: bool,
}

/// Outcome of a batch registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub registered: usize,
    /// Inputs skipped because their key already existed.
    pub duplicates: usize,
}

/// Repository for product records.
#[async_trait]
pub trait ProductRepo: Send + Sync {
    /// Register a new product together with its bounding box.
    ///
    /// Fails with `DuplicateKey` if (file_path, product_type) is already
    /// registered, and with `InvalidRange` for an inverted time window. Nothing
    /// is written on failure.
    async fn register(&self, product: &NewProduct) -> CatalogResult<Product>;

    /// Register or re-register a product.
    ///
    /// An existing record with the same key has every field and its bounding
    /// box replaced in a single transaction; otherwise the product is inserted.
    async fn upsert(&self, product: &NewProduct) -> CatalogResult<Registration>;

    /// Register many products in one transaction, skipping keys that already
    /// exist. Every input is validated before anything is written.
    async fn register_batch(&self, products: &[NewProduct]) -> CatalogResult<BatchSummary>;

    /// Correct the optional metadata of an existing product.
    ///
    /// Fails with `NotFound` if the key is not registered. The patched record
    /// is validated before it is written.
    async fn update(
        &self,
        file_path: &str,
        product_type: &str,
        patch: ProductPatch,
    ) -> CatalogResult<Product>;

    /// Remove a product and its bounding box atomically.
    ///
    /// Returns `Ok(true)` if a record was removed. A missing key returns
    /// `Ok(false)` under the lenient remove policy and `NotFound` under the
    /// strict one.
    async fn remove(&self, file_path: &str, product_type: &str) -> CatalogResult<bool>;

    /// Get a product by id.
    async fn get(&self, id: ProductId) -> CatalogResult<Option<Product>>;

    /// Get a product by its unique key.
    async fn get_by_key(&self, file_path: &str, product_type: &str)
    -> CatalogResult<Option<Product>>;

    /// Stream all products of a type.
    fn find_by_type<'a>(&'a self, product_type: &str) -> ProductStream<'a>;

    /// Stream all products whose acquisition window intersects `range`.
    ///
    /// A product with a start but no end is treated as the instant at its
    /// start. Products without a start never match.
    fn find_by_time_range(&self, range: TimeRange) -> ProductStream<'_>;

    /// Filtered, paginated listing, newest acquisition first.
    async fn search(&self, query: &ProductQuery) -> CatalogResult<Vec<Product>>;

    /// Total number of registered products.
    async fn count(&self) -> CatalogResult<u64>;
}
