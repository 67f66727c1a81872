//! Catalog store trait and SQLite implementation.

use crate::error::{CatalogError, CatalogResult};
use crate::models::{BboxRow, ProductRow};
use crate::repos::{BatchSummary, ProductRepo, ProductStream, Registration, SpatialRepo};
use crate::spatial::SpatialIndex;
use async_trait::async_trait;
use eocat_core::{
    BoundingBox, CatalogConfig, NewProduct, Product, ProductId, ProductPatch, ProductQuery,
    RemovePolicy, TimeRange, Timestamp,
};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePoolOptions,
    SqliteSynchronous,
};
use sqlx::{Pool, QueryBuilder, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::RwLock;

/// Path that selects a transient in-memory database.
pub const IN_MEMORY_PATH: &str = ":memory:";

/// Maximum number of ids bound into a single `IN (...)` lookup.
const JOIN_BATCH_SIZE: usize = 500;

/// Product columns joined with the bounding-box columns.
macro_rules! product_select {
    ($tail:literal) => {
        concat!(
            "SELECT p.id, p.file_path, p.product_name, p.datetime_start, p.datetime_end, \
             p.satellite, p.instrument, p.product_type, p.size_bytes, p.checksum, \
             b.lat_min, b.lat_max, b.lon_min, b.lon_max \
             FROM products AS p LEFT JOIN bbox_index AS b ON b.product_id = p.id ",
            $tail
        )
    };
}

/// Combined catalog store trait.
#[async_trait]
pub trait CatalogStore: ProductRepo + SpatialRepo + Send + Sync {
    /// Create or upgrade the schema.
    async fn migrate(&self) -> CatalogResult<()>;

    /// Check database connectivity and health.
    async fn health_check(&self) -> CatalogResult<()>;
}

/// Runtime options for a [`SqliteStore`].
#[derive(Clone, Debug)]
pub struct StoreOptions {
    pub busy_timeout: Duration,
    pub page_size: u32,
    pub remove_policy: RemovePolicy,
    pub default_search_limit: u32,
    pub max_search_limit: u32,
}

impl From<&CatalogConfig> for StoreOptions {
    fn from(config: &CatalogConfig) -> Self {
        Self {
            busy_timeout: config.busy_timeout(),
            page_size: config.page_size,
            remove_policy: config.remove_policy,
            default_search_limit: config.default_search_limit,
            max_search_limit: config.max_search_limit,
        }
    }
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self::from(&CatalogConfig::default())
    }
}

/// SQLite-based catalog store with an in-memory R*-tree over bounding boxes.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
    /// Write-locked for the whole of every write transaction, so readers never
    /// see a product and its spatial entry out of step.
    index: RwLock<SpatialIndex>,
    options: StoreOptions,
}

impl SqliteStore {
    /// Open (creating if missing) a catalog database and load its spatial index.
    pub async fn new(path: impl AsRef<Path>, options: StoreOptions) -> CatalogResult<Self> {
        let path = path.as_ref();
        if options.page_size == 0 {
            return Err(CatalogError::Config("page_size must be at least 1".to_string()));
        }

        let opts = if path.as_os_str() == IN_MEMORY_PATH {
            SqliteConnectOptions::from_str("sqlite::memory:")?
        } else {
            // Ensure parent directory exists
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
        };
        let opts = opts
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(options.busy_timeout);

        let pool = SqlitePoolOptions::new()
            // SQLite permits a single writer; one connection avoids "database is locked"
            // failures. It is never reaped so an in-memory database lives as long as the pool.
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await?;

        let store = Self {
            pool,
            index: RwLock::new(SpatialIndex::new()),
            options,
        };
        store.migrate().await?;
        let indexed = store.reload_index().await?;

        tracing::info!(
            path = %path.display(),
            products = store.count().await?,
            indexed,
            "Catalog store opened"
        );

        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Rebuild the spatial index from the `bbox_index` table.
    /// Returns the number of indexed products.
    pub async fn reload_index(&self) -> CatalogResult<usize> {
        let mut index = self.index.write().await;
        let rows = sqlx::query_as::<_, BboxRow>(
            "SELECT product_id, lat_min, lat_max, lon_min, lon_max FROM bbox_index",
        )
        .fetch_all(&self.pool)
        .await?;

        let entries = rows
            .iter()
            .map(|row| Ok((row.product_id, row.to_bbox()?)))
            .collect::<CatalogResult<Vec<_>>>()?;
        *index = SpatialIndex::bulk_load(entries);

        tracing::debug!(entries = index.len(), "Spatial index loaded");
        Ok(index.len())
    }

    async fn fetch_page(
        &self,
        filter: &PageFilter,
        after_id: ProductId,
    ) -> CatalogResult<Vec<ProductRow>> {
        let limit = i64::from(self.options.page_size);
        let rows = match filter {
            PageFilter::ProductType(product_type) => {
                sqlx::query_as::<_, ProductRow>(product_select!(
                    "WHERE p.product_type = ? AND p.id > ? ORDER BY p.id LIMIT ?"
                ))
                .bind(product_type)
                .bind(after_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            PageFilter::TimeRange { start, end } => {
                sqlx::query_as::<_, ProductRow>(product_select!(
                    "WHERE p.datetime_start IS NOT NULL \
                       AND p.datetime_start <= ? \
                       AND COALESCE(p.datetime_end, p.datetime_start) >= ? \
                       AND p.id > ? \
                     ORDER BY p.id LIMIT ?"
                ))
                .bind(end)
                .bind(start)
                .bind(after_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }

    /// Keyset-paginated stream: each page is a separate short query, so no
    /// connection is held between pages.
    fn paged_stream(&self, filter: PageFilter) -> ProductStream<'_> {
        let page_size = self.options.page_size as usize;
        let stream = async_stream::try_stream! {
            let mut after_id = ProductId::MIN;
            loop {
                let rows = self.fetch_page(&filter, after_id).await?;
                let last_page = rows.len() < page_size;
                for row in rows {
                    after_id = row.id;
                    yield Product::try_from(row)?;
                }
                if last_page {
                    break;
                }
            }
        };
        Box::pin(stream)
    }

    async fn fetch_by_ids(&self, ids: &[ProductId]) -> CatalogResult<Vec<Product>> {
        let mut products = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(JOIN_BATCH_SIZE) {
            let mut builder = QueryBuilder::<Sqlite>::new(product_select!("WHERE p.id IN ("));
            let mut separated = builder.separated(", ");
            for id in chunk {
                separated.push_bind(*id);
            }
            separated.push_unseparated(") ORDER BY p.id");

            let rows = builder
                .build_query_as::<ProductRow>()
                .fetch_all(&self.pool)
                .await?;
            for row in rows {
                products.push(Product::try_from(row)?);
            }
        }
        Ok(products)
    }
}

/// Rewrite legacy acquisition times into the canonical form. The earlier
/// tooling wrote `""` for an unknown time; blank or unparsable values become
/// NULL. Returns the number of rows changed.
async fn normalize_legacy_timestamps(conn: &mut SqliteConnection) -> CatalogResult<u64> {
    let rows: Vec<(ProductId, Option<String>, Option<String>)> = sqlx::query_as(
        "SELECT id, datetime_start, datetime_end FROM products \
         WHERE datetime_start IS NOT NULL OR datetime_end IS NOT NULL",
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut normalized = 0;
    for (id, start, end) in rows {
        let canonical_start = start.as_deref().and_then(canonical_timestamp);
        let canonical_end = end.as_deref().and_then(canonical_timestamp);
        if canonical_start == start && canonical_end == end {
            continue;
        }
        let unparsable = |raw: &Option<String>, canonical: &Option<String>| {
            canonical.is_none() && raw.as_deref().is_some_and(|v| !v.trim().is_empty())
        };
        if unparsable(&start, &canonical_start) || unparsable(&end, &canonical_end) {
            tracing::warn!(product_id = id, "Dropping unparsable legacy acquisition time");
        }
        sqlx::query("UPDATE products SET datetime_start = ?, datetime_end = ? WHERE id = ?")
            .bind(&canonical_start)
            .bind(&canonical_end)
            .bind(id)
            .execute(&mut *conn)
            .await?;
        normalized += 1;
    }
    Ok(normalized)
}

fn canonical_timestamp(raw: &str) -> Option<String> {
    Timestamp::parse(raw).ok().map(|t| t.to_string())
}

/// Filter applied by a paged stream.
enum PageFilter {
    ProductType(String),
    TimeRange { start: String, end: String },
}

#[async_trait]
impl CatalogStore for SqliteStore {
    async fn migrate(&self) -> CatalogResult<()> {
        // Catalogs written by the earlier ingestion tooling keep bbox_index as an
        // rtree virtual table (32-bit coordinates). Convert it to the plain table.
        let legacy_rtree: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE name = 'bbox_index' AND sql LIKE '%USING rtree%')",
        )
        .fetch_one(&self.pool)
        .await?;

        let mut tx = self.pool.begin().await?;

        if legacy_rtree {
            tracing::warn!("Converting legacy rtree bbox_index to a plain table");
            sqlx::query("ALTER TABLE bbox_index RENAME TO bbox_index_legacy")
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(SCHEMA_SQL).execute(&mut *tx).await?;

        if legacy_rtree {
            let copied = sqlx::query(
                r#"
                INSERT OR IGNORE INTO bbox_index (product_id, lat_min, lat_max, lon_min, lon_max)
                SELECT product_id, lat_min, lat_max, lon_min, lon_max
                FROM bbox_index_legacy
                WHERE product_id IN (SELECT id FROM products)
                  AND lat_min <= lat_max
                  AND lon_min <= lon_max
                "#,
            )
            .execute(&mut *tx)
            .await?
            .rows_affected();
            sqlx::query("DROP TABLE bbox_index_legacy")
                .execute(&mut *tx)
                .await?;
            let normalized = normalize_legacy_timestamps(&mut tx).await?;
            tracing::info!(copied, normalized, "Legacy bbox_index converted");
        }

        tx.commit().await?;
        Ok(())
    }

    async fn health_check(&self) -> CatalogResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

// Implement the repository traits for SqliteStore
mod sqlite_impl {
    use super::*;

    fn not_found(file_path: &str, product_type: &str) -> CatalogError {
        CatalogError::NotFound(format!(
            "product ({file_path}, {product_type}) is not registered"
        ))
    }

    /// Map a unique-constraint failure on `products` to `DuplicateKey`.
    fn map_unique_violation(err: sqlx::Error, file_path: &str, product_type: &str) -> CatalogError {
        // SQLite error: "UNIQUE constraint failed: products.file_path, products.product_type"
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.message().contains("UNIQUE constraint")
            && db_err.message().contains("products")
        {
            return CatalogError::DuplicateKey(format!(
                "product ({file_path}, {product_type}) is already registered"
            ));
        }
        err.into()
    }

    fn size_to_db(size_bytes: Option<u64>) -> CatalogResult<Option<i64>> {
        size_bytes
            .map(i64::try_from)
            .transpose()
            .map_err(|_| CatalogError::InvalidInput("size_bytes exceeds i64::MAX".to_string()))
    }

    /// Insert a product row. With `skip_existing`, an existing key yields
    /// `Ok(None)` instead of `DuplicateKey`.
    async fn insert_product(
        conn: &mut SqliteConnection,
        product: &NewProduct,
        skip_existing: bool,
    ) -> CatalogResult<Option<ProductId>> {
        let sql = if skip_existing {
            r#"
            INSERT INTO products (
                file_path, product_name, datetime_start, datetime_end,
                satellite, instrument, product_type, size_bytes, checksum
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(file_path, product_type) DO NOTHING
            "#
        } else {
            r#"
            INSERT INTO products (
                file_path, product_name, datetime_start, datetime_end,
                satellite, instrument, product_type, size_bytes, checksum
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#
        };

        let result = sqlx::query(sql)
            .bind(&product.file_path)
            .bind(&product.product_name)
            .bind(product.datetime_start.map(|t| t.to_string()))
            .bind(product.datetime_end.map(|t| t.to_string()))
            .bind(&product.satellite)
            .bind(&product.instrument)
            .bind(&product.product_type)
            .bind(size_to_db(product.size_bytes)?)
            .bind(&product.checksum)
            .execute(&mut *conn)
            .await
            .map_err(|e| map_unique_violation(e, &product.file_path, &product.product_type))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(result.last_insert_rowid()))
    }

    /// Overwrite the non-key columns of an existing product.
    async fn write_fields(conn: &mut SqliteConnection, product: &Product) -> CatalogResult<()> {
        sqlx::query(
            r#"
            UPDATE products
            SET product_name = ?, datetime_start = ?, datetime_end = ?,
                satellite = ?, instrument = ?, size_bytes = ?, checksum = ?
            WHERE id = ?
            "#,
        )
        .bind(&product.product_name)
        .bind(product.datetime_start.map(|t| t.to_string()))
        .bind(product.datetime_end.map(|t| t.to_string()))
        .bind(&product.satellite)
        .bind(&product.instrument)
        .bind(size_to_db(product.size_bytes)?)
        .bind(&product.checksum)
        .bind(product.id)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Make the bbox row of a product match `bbox` (insert, replace or delete).
    async fn sync_bbox(
        conn: &mut SqliteConnection,
        product_id: ProductId,
        bbox: Option<&BoundingBox>,
    ) -> CatalogResult<()> {
        match bbox {
            Some(bbox) => {
                sqlx::query(
                    r#"
                    INSERT INTO bbox_index (product_id, lat_min, lat_max, lon_min, lon_max)
                    VALUES (?, ?, ?, ?, ?)
                    ON CONFLICT(product_id) DO UPDATE SET
                        lat_min = excluded.lat_min,
                        lat_max = excluded.lat_max,
                        lon_min = excluded.lon_min,
                        lon_max = excluded.lon_max
                    "#,
                )
                .bind(product_id)
                .bind(bbox.lat_min())
                .bind(bbox.lat_max())
                .bind(bbox.lon_min())
                .bind(bbox.lon_max())
                .execute(&mut *conn)
                .await?;
            }
            None => {
                sqlx::query("DELETE FROM bbox_index WHERE product_id = ?")
                    .bind(product_id)
                    .execute(&mut *conn)
                    .await?;
            }
        }
        Ok(())
    }

    fn sync_index(index: &mut SpatialIndex, product: &Product) {
        match product.bbox {
            Some(bbox) => index.upsert(product.id, bbox),
            None => {
                index.remove(product.id);
            }
        }
    }

    async fn find_id(
        conn: &mut SqliteConnection,
        file_path: &str,
        product_type: &str,
    ) -> CatalogResult<Option<ProductId>> {
        let id = sqlx::query_scalar("SELECT id FROM products WHERE file_path = ? AND product_type = ?")
            .bind(file_path)
            .bind(product_type)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(id)
    }

    #[async_trait]
    impl ProductRepo for SqliteStore {
        async fn register(&self, product: &NewProduct) -> CatalogResult<Product> {
            product.validate()?;

            let mut index = self.index.write().await;
            let mut tx = self.pool.begin().await?;

            let id = insert_product(&mut tx, product, false)
                .await?
                .ok_or_else(|| CatalogError::Internal("product insert affected no rows".to_string()))?;
            let stored = product.clone().into_product(id);
            sync_bbox(&mut tx, id, stored.bbox.as_ref()).await?;

            tx.commit().await?;
            sync_index(&mut index, &stored);

            tracing::debug!(
                product_id = id,
                file_path = %stored.file_path,
                product_type = %stored.product_type,
                "Product registered"
            );
            Ok(stored)
        }

        async fn upsert(&self, product: &NewProduct) -> CatalogResult<Registration> {
            product.validate()?;

            let mut index = self.index.write().await;
            let mut tx = self.pool.begin().await?;

            let existing = find_id(&mut tx, &product.file_path, &product.product_type).await?;
            let (stored, created) = match existing {
                Some(id) => {
                    let stored = product.clone().into_product(id);
                    write_fields(&mut tx, &stored).await?;
                    (stored, false)
                }
                None => {
                    let id = insert_product(&mut tx, product, false).await?.ok_or_else(|| {
                        CatalogError::Internal("product insert affected no rows".to_string())
                    })?;
                    (product.clone().into_product(id), true)
                }
            };
            sync_bbox(&mut tx, stored.id, stored.bbox.as_ref()).await?;

            tx.commit().await?;
            sync_index(&mut index, &stored);

            tracing::debug!(
                product_id = stored.id,
                file_path = %stored.file_path,
                product_type = %stored.product_type,
                created,
                "Product upserted"
            );
            Ok(Registration {
                product: stored,
                created,
            })
        }

        async fn register_batch(&self, products: &[NewProduct]) -> CatalogResult<BatchSummary> {
            for product in products {
                product.validate()?;
            }
            if products.is_empty() {
                return Ok(BatchSummary::default());
            }

            let mut index = self.index.write().await;
            let mut tx = self.pool.begin().await?;

            let mut summary = BatchSummary::default();
            let mut indexed = Vec::new();
            for product in products {
                match insert_product(&mut tx, product, true).await? {
                    Some(id) => {
                        if let Some(bbox) = product.bbox {
                            sync_bbox(&mut tx, id, Some(&bbox)).await?;
                            indexed.push((id, bbox));
                        }
                        summary.registered += 1;
                    }
                    None => summary.duplicates += 1,
                }
            }

            tx.commit().await?;
            for (id, bbox) in indexed {
                index.upsert(id, bbox);
            }

            tracing::info!(
                registered = summary.registered,
                duplicates = summary.duplicates,
                "Product batch registered"
            );
            Ok(summary)
        }

        async fn update(
            &self,
            file_path: &str,
            product_type: &str,
            patch: ProductPatch,
        ) -> CatalogResult<Product> {
            let mut index = self.index.write().await;
            let mut tx = self.pool.begin().await?;

            let row = sqlx::query_as::<_, ProductRow>(product_select!(
                "WHERE p.file_path = ? AND p.product_type = ?"
            ))
            .bind(file_path)
            .bind(product_type)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_found(file_path, product_type))?;

            let mut product = Product::try_from(row)?;
            patch.apply_to(&mut product);
            product.validate()?;

            write_fields(&mut tx, &product).await?;
            sync_bbox(&mut tx, product.id, product.bbox.as_ref()).await?;

            tx.commit().await?;
            sync_index(&mut index, &product);

            tracing::debug!(product_id = product.id, "Product updated");
            Ok(product)
        }

        async fn remove(&self, file_path: &str, product_type: &str) -> CatalogResult<bool> {
            let mut index = self.index.write().await;
            let mut tx = self.pool.begin().await?;

            let Some(id) = find_id(&mut tx, file_path, product_type).await? else {
                tx.rollback().await?;
                return match self.options.remove_policy {
                    RemovePolicy::Lenient => {
                        tracing::warn!(
                            file_path = %file_path,
                            product_type = %product_type,
                            "Remove of unregistered product ignored"
                        );
                        Ok(false)
                    }
                    RemovePolicy::Strict => Err(not_found(file_path, product_type)),
                };
            };

            // Spatial row first: bbox_index.product_id references products.id
            sync_bbox(&mut tx, id, None).await?;
            sqlx::query("DELETE FROM products WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;
            index.remove(id);

            tracing::debug!(product_id = id, "Product removed");
            Ok(true)
        }

        async fn get(&self, id: ProductId) -> CatalogResult<Option<Product>> {
            let row = sqlx::query_as::<_, ProductRow>(product_select!("WHERE p.id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            row.map(Product::try_from).transpose()
        }

        async fn get_by_key(
            &self,
            file_path: &str,
            product_type: &str,
        ) -> CatalogResult<Option<Product>> {
            let row = sqlx::query_as::<_, ProductRow>(product_select!(
                "WHERE p.file_path = ? AND p.product_type = ?"
            ))
            .bind(file_path)
            .bind(product_type)
            .fetch_optional(&self.pool)
            .await?;
            row.map(Product::try_from).transpose()
        }

        fn find_by_type<'a>(&'a self, product_type: &str) -> ProductStream<'a> {
            self.paged_stream(PageFilter::ProductType(product_type.to_string()))
        }

        fn find_by_time_range(&self, range: TimeRange) -> ProductStream<'_> {
            self.paged_stream(PageFilter::TimeRange {
                start: range.start().to_string(),
                end: range.end().to_string(),
            })
        }

        async fn search(&self, query: &ProductQuery) -> CatalogResult<Vec<Product>> {
            let limit = query.resolve_limit(
                self.options.default_search_limit,
                self.options.max_search_limit,
            )?;
            let offset = i64::try_from(query.offset).map_err(|_| {
                CatalogError::InvalidInput(format!("offset {} is too large", query.offset))
            })?;

            let mut builder = QueryBuilder::<Sqlite>::new(product_select!("WHERE 1 = 1"));
            if let Some(start) = query.start {
                builder
                    .push(" AND p.datetime_start >= ")
                    .push_bind(start.to_string());
            }
            if let Some(end) = query.end {
                builder
                    .push(" AND p.datetime_end <= ")
                    .push_bind(end.to_string());
            }
            if let Some(satellite) = &query.satellite {
                builder
                    .push(" AND p.satellite = ")
                    .push_bind(satellite.clone());
            }
            if let Some(product_type) = &query.product_type {
                builder
                    .push(" AND p.product_type = ")
                    .push_bind(product_type.clone());
            }
            if let Some(bbox) = query.bbox {
                builder
                    .push(" AND p.id IN (SELECT product_id FROM bbox_index WHERE lat_min <= ")
                    .push_bind(bbox.lat_max())
                    .push(" AND lat_max >= ")
                    .push_bind(bbox.lat_min())
                    .push(" AND lon_min <= ")
                    .push_bind(bbox.lon_max())
                    .push(" AND lon_max >= ")
                    .push_bind(bbox.lon_min())
                    .push(")");
            }
            builder
                .push(" ORDER BY p.datetime_start DESC, p.id DESC LIMIT ")
                .push_bind(i64::from(limit))
                .push(" OFFSET ")
                .push_bind(offset);

            let rows = builder
                .build_query_as::<ProductRow>()
                .fetch_all(&self.pool)
                .await?;
            rows.into_iter().map(Product::try_from).collect()
        }

        async fn count(&self) -> CatalogResult<u64> {
            let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
                .fetch_one(&self.pool)
                .await?;
            u64::try_from(count)
                .map_err(|_| CatalogError::Internal(format!("negative product count {count}")))
        }
    }

    #[async_trait]
    impl SpatialRepo for SqliteStore {
        async fn query_bbox(&self, query: &BoundingBox) -> CatalogResult<Vec<Product>> {
            // Candidates are taken under the read lock; the join runs after it is
            // released, so a product removed in between is simply absent and one
            // moved in between is re-checked against its joined box.
            let ids = self.index.read().await.query(query);
            let mut products = self.fetch_by_ids(&ids).await?;
            products.retain(|p| p.bbox.is_some_and(|b| b.intersects(query)));
            Ok(products)
        }

        async fn query_point(&self, lat: f64, lon: f64) -> CatalogResult<Vec<Product>> {
            let point = BoundingBox::point(lat, lon)?;
            self.query_bbox(&point).await
        }

        async fn indexed_count(&self) -> usize {
            self.index.read().await.len()
        }
    }
}

/// SQL schema for SQLite.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    file_path TEXT NOT NULL,
    product_name TEXT,
    datetime_start TEXT,
    datetime_end TEXT,
    satellite TEXT,
    instrument TEXT,
    product_type TEXT NOT NULL,
    size_bytes INTEGER CHECK (size_bytes IS NULL OR size_bytes >= 0),
    checksum TEXT,
    UNIQUE(file_path, product_type)
);
CREATE INDEX IF NOT EXISTS idx_products_datetime_start ON products(datetime_start);
CREATE INDEX IF NOT EXISTS idx_products_product_type ON products(product_type);
CREATE INDEX IF NOT EXISTS idx_products_satellite ON products(satellite);

-- One row per product with known extent; written in the same transaction as its product
CREATE TABLE IF NOT EXISTS bbox_index (
    product_id INTEGER PRIMARY KEY REFERENCES products(id),
    lat_min REAL NOT NULL,
    lat_max REAL NOT NULL,
    lon_min REAL NOT NULL,
    lon_max REAL NOT NULL,
    CHECK (lat_min <= lat_max),
    CHECK (lon_min <= lon_max)
);
"#;
