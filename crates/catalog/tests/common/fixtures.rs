//! Test fixtures for generating products.

use eocat_core::{BoundingBox, NewProduct, Timestamp};
use futures::TryStreamExt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for generating unique file paths.
static FILE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Build a bounding box, panicking on invalid input.
#[allow(dead_code)]
pub fn bbox(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> BoundingBox {
    BoundingBox::new(lat_min, lat_max, lon_min, lon_max).expect("valid bbox")
}

/// Parse a timestamp, panicking on invalid input.
#[allow(dead_code)]
pub fn ts(value: &str) -> Timestamp {
    Timestamp::parse(value).expect("valid timestamp")
}

/// Generate a unique file path with the given prefix.
#[allow(dead_code)]
pub fn unique_file(prefix: &str) -> String {
    let counter = FILE_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}_{counter:06}.nc")
}

/// A fully populated Sentinel-2 product.
#[allow(dead_code)]
pub fn sentinel2(file_path: &str, start: &str, end: &str) -> NewProduct {
    NewProduct::new(file_path, "L1C")
        .with_product_name("Sentinel-2 MSI Level-1C")
        .with_time_window(ts(start), ts(end))
        .with_satellite("Sentinel-2A")
        .with_instrument("MSI")
        .with_size_bytes(786_432_000)
        .with_checksum("c0ffee00c0ffee00")
        .with_bbox(bbox(43.2, 44.2, 4.8, 6.2))
}

/// Collect a product stream, panicking on the first error.
#[allow(dead_code)]
pub async fn collect<T>(
    stream: impl futures::Stream<Item = eocat_catalog::CatalogResult<T>>,
) -> Vec<T> {
    stream.try_collect().await.expect("stream failed")
}
