//! Catalog store test utilities.

use eocat_catalog::{CatalogResult, CatalogStore, SqliteStore, StoreOptions};
use sqlx::{Pool, Sqlite};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// A test catalog wrapper that cleans up on drop.
#[allow(dead_code)]
pub struct TestCatalog {
    pub store: Arc<dyn CatalogStore>,
    pub(crate) sqlite_store: Arc<SqliteStore>,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestCatalog {
    /// Create a new file-backed test catalog in a temporary directory.
    pub async fn new() -> CatalogResult<Self> {
        Self::with_options(StoreOptions::default()).await
    }

    /// Create a file-backed test catalog with custom options.
    pub async fn with_options(options: StoreOptions) -> CatalogResult<Self> {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("catalog.db");
        let store = Arc::new(SqliteStore::new(&db_path, options).await?);

        Ok(Self {
            store: store.clone(),
            sqlite_store: store,
            _temp_dir: temp_dir,
        })
    }

    /// Create a new in-memory catalog (faster for tests).
    pub async fn in_memory() -> CatalogResult<Self> {
        Self::in_memory_with_options(StoreOptions::default()).await
    }

    /// Create an in-memory catalog with custom options.
    pub async fn in_memory_with_options(options: StoreOptions) -> CatalogResult<Self> {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let store = Arc::new(SqliteStore::new(":memory:", options).await?);

        Ok(Self {
            store: store.clone(),
            sqlite_store: store,
            _temp_dir: temp_dir,
        })
    }

    /// Get a reference to the catalog store.
    pub fn store(&self) -> Arc<dyn CatalogStore> {
        self.store.clone()
    }

    /// Get the concrete SQLite store.
    pub fn sqlite(&self) -> &SqliteStore {
        &self.sqlite_store
    }

    /// Get a reference to the SQLite connection pool for raw queries.
    pub fn pool(&self) -> &Pool<Sqlite> {
        self.sqlite_store.pool()
    }

    /// Directory holding the database file.
    pub fn dir(&self) -> &Path {
        self._temp_dir.path()
    }

    /// Path of the database file for file-backed catalogs.
    pub fn db_path(&self) -> PathBuf {
        self.dir().join("catalog.db")
    }

    /// Number of rows in the bbox_index table.
    pub async fn bbox_rows(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM bbox_index")
            .fetch_one(self.pool())
            .await
            .expect("Failed to count bbox rows")
    }
}
