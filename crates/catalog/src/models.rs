//! Database models mapping to the catalog schema.

use crate::error::{CatalogError, CatalogResult};
use eocat_core::{BoundingBox, Product, ProductId, Timestamp};
use sqlx::FromRow;

/// Product row joined with its (optional) bounding-box row.
#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub file_path: String,
    pub product_name: Option<String>,
    pub datetime_start: Option<String>,
    pub datetime_end: Option<String>,
    pub satellite: Option<String>,
    pub instrument: Option<String>,
    pub product_type: String,
    pub size_bytes: Option<i64>,
    pub checksum: Option<String>,
    pub lat_min: Option<f64>,
    pub lat_max: Option<f64>,
    pub lon_min: Option<f64>,
    pub lon_max: Option<f64>,
}

/// Bounding-box index row.
#[derive(Debug, Clone, FromRow)]
pub struct BboxRow {
    pub product_id: i64,
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl BboxRow {
    pub fn to_bbox(&self) -> CatalogResult<BoundingBox> {
        BoundingBox::new(self.lat_min, self.lat_max, self.lon_min, self.lon_max).map_err(|e| {
            CatalogError::Internal(format!(
                "stored bbox for product {} is corrupt: {e}",
                self.product_id
            ))
        })
    }
}

fn decode_timestamp(
    id: ProductId,
    column: &str,
    value: Option<String>,
) -> CatalogResult<Option<Timestamp>> {
    value
        .map(|raw| {
            Timestamp::parse(&raw).map_err(|e| {
                CatalogError::Internal(format!("product {id} has corrupt {column}: {e}"))
            })
        })
        .transpose()
}

impl TryFrom<ProductRow> for Product {
    type Error = CatalogError;

    fn try_from(row: ProductRow) -> CatalogResult<Self> {
        let id = row.id;
        let bbox = match (row.lat_min, row.lat_max, row.lon_min, row.lon_max) {
            (Some(lat_min), Some(lat_max), Some(lon_min), Some(lon_max)) => Some(
                BboxRow {
                    product_id: id,
                    lat_min,
                    lat_max,
                    lon_min,
                    lon_max,
                }
                .to_bbox()?,
            ),
            (None, None, None, None) => None,
            _ => {
                return Err(CatalogError::Internal(format!(
                    "product {id} has a partial bbox row"
                )));
            }
        };
        let size_bytes = row.size_bytes.map(u64::try_from).transpose().map_err(|_| {
            CatalogError::Internal(format!("product {id} has negative size_bytes"))
        })?;

        Ok(Product {
            id,
            datetime_start: decode_timestamp(id, "datetime_start", row.datetime_start)?,
            datetime_end: decode_timestamp(id, "datetime_end", row.datetime_end)?,
            file_path: row.file_path,
            product_type: row.product_type,
            product_name: row.product_name,
            satellite: row.satellite,
            instrument: row.instrument,
            size_bytes,
            checksum: row.checksum,
            bbox,
        })
    }
}
