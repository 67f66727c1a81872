//! Catalog product records.
//!
//! A product is one registered (file path, product type) pair. The same file
//! may be registered several times under distinct product types when it
//! carries several products.

use crate::bbox::BoundingBox;
use crate::timestamp::Timestamp;
use serde::{Deserialize, Serialize};

/// Identifier assigned by the catalog on registration.
pub type ProductId = i64;

/// Input for registering a product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub file_path: String,
    pub product_type: String,
    pub product_name: Option<String>,
    pub datetime_start: Option<Timestamp>,
    pub datetime_end: Option<Timestamp>,
    pub satellite: Option<String>,
    pub instrument: Option<String>,
    pub size_bytes: Option<u64>,
    pub checksum: Option<String>,
    /// Geographic extent; `None` when the coverage is unknown.
    pub bbox: Option<BoundingBox>,
}

impl NewProduct {
    /// Start a registration with only the required key fields set.
    pub fn new(file_path: impl Into<String>, product_type: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            product_type: product_type.into(),
            product_name: None,
            datetime_start: None,
            datetime_end: None,
            satellite: None,
            instrument: None,
            size_bytes: None,
            checksum: None,
            bbox: None,
        }
    }

    pub fn with_product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    /// Set the acquisition window.
    pub fn with_time_window(mut self, start: Timestamp, end: Timestamp) -> Self {
        self.datetime_start = Some(start);
        self.datetime_end = Some(end);
        self
    }

    pub fn with_satellite(mut self, satellite: impl Into<String>) -> Self {
        self.satellite = Some(satellite.into());
        self
    }

    pub fn with_instrument(mut self, instrument: impl Into<String>) -> Self {
        self.instrument = Some(instrument.into());
        self
    }

    pub fn with_size_bytes(mut self, size_bytes: u64) -> Self {
        self.size_bytes = Some(size_bytes);
        self
    }

    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }

    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Validate the record invariants that the value types cannot express.
    pub fn validate(&self) -> crate::Result<()> {
        validate_fields(
            &self.file_path,
            &self.product_type,
            self.datetime_start,
            self.datetime_end,
            self.size_bytes,
        )
    }

    /// Attach the catalog identifier.
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            file_path: self.file_path,
            product_type: self.product_type,
            product_name: self.product_name,
            datetime_start: self.datetime_start,
            datetime_end: self.datetime_end,
            satellite: self.satellite,
            instrument: self.instrument,
            size_bytes: self.size_bytes,
            checksum: self.checksum,
            bbox: self.bbox,
        }
    }
}

/// A registered product with its bounding box joined in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub file_path: String,
    pub product_type: String,
    pub product_name: Option<String>,
    pub datetime_start: Option<Timestamp>,
    pub datetime_end: Option<Timestamp>,
    pub satellite: Option<String>,
    pub instrument: Option<String>,
    pub size_bytes: Option<u64>,
    pub checksum: Option<String>,
    pub bbox: Option<BoundingBox>,
}

impl Product {
    pub fn validate(&self) -> crate::Result<()> {
        validate_fields(
            &self.file_path,
            &self.product_type,
            self.datetime_start,
            self.datetime_end,
            self.size_bytes,
        )
    }
}

fn validate_fields(
    file_path: &str,
    product_type: &str,
    datetime_start: Option<Timestamp>,
    datetime_end: Option<Timestamp>,
    size_bytes: Option<u64>,
) -> crate::Result<()> {
    if file_path.trim().is_empty() {
        return Err(crate::Error::InvalidProduct(
            "file_path cannot be empty".to_string(),
        ));
    }
    if product_type.trim().is_empty() {
        return Err(crate::Error::InvalidProduct(
            "product_type cannot be empty".to_string(),
        ));
    }
    if let (Some(start), Some(end)) = (datetime_start, datetime_end)
        && start > end
    {
        return Err(crate::Error::InvalidRange(format!(
            "datetime_start ({start}) is after datetime_end ({end})"
        )));
    }
    // SQLite stores INTEGER as i64
    if let Some(size) = size_bytes
        && i64::try_from(size).is_err()
    {
        return Err(crate::Error::InvalidProduct(format!(
            "size_bytes {size} exceeds the maximum of {}",
            i64::MAX
        )));
    }
    Ok(())
}

/// A change to one optional field.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum FieldUpdate<T> {
    /// Leave the stored value as it is.
    #[default]
    Keep,
    /// Replace the stored value.
    Set(T),
    /// Remove the stored value.
    Clear,
}

impl<T> FieldUpdate<T> {
    fn apply(self, slot: &mut Option<T>) {
        match self {
            FieldUpdate::Keep => {}
            FieldUpdate::Set(value) => *slot = Some(value),
            FieldUpdate::Clear => *slot = None,
        }
    }

    pub fn is_keep(&self) -> bool {
        matches!(self, FieldUpdate::Keep)
    }
}

/// Metadata correction for an existing product.
///
/// The key fields (file path, product type) are immutable; re-register under
/// the new key instead.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductPatch {
    pub product_name: FieldUpdate<String>,
    pub datetime_start: FieldUpdate<Timestamp>,
    pub datetime_end: FieldUpdate<Timestamp>,
    pub satellite: FieldUpdate<String>,
    pub instrument: FieldUpdate<String>,
    pub size_bytes: FieldUpdate<u64>,
    pub checksum: FieldUpdate<String>,
    pub bbox: FieldUpdate<BoundingBox>,
}

impl ProductPatch {
    /// Check if the patch leaves every field untouched.
    pub fn is_empty(&self) -> bool {
        self.product_name.is_keep()
            && self.datetime_start.is_keep()
            && self.datetime_end.is_keep()
            && self.satellite.is_keep()
            && self.instrument.is_keep()
            && self.size_bytes.is_keep()
            && self.checksum.is_keep()
            && self.bbox.is_keep()
    }

    /// Apply the patch to a product in place. The result is not validated.
    pub fn apply_to(self, product: &mut Product) {
        self.product_name.apply(&mut product.product_name);
        self.datetime_start.apply(&mut product.datetime_start);
        self.datetime_end.apply(&mut product.datetime_end);
        self.satellite.apply(&mut product.satellite);
        self.instrument.apply(&mut product.instrument);
        self.size_bytes.apply(&mut product.size_bytes);
        self.checksum.apply(&mut product.checksum);
        self.bbox.apply(&mut product.bbox);
    }
}
