//! Listing filters for catalog searches.

use crate::bbox::BoundingBox;
use crate::timestamp::Timestamp;

/// Filters and pagination for a catalog listing.
///
/// All filters are optional and combine with AND. `start` keeps products
/// that begin at or after it; `end` keeps products that finish at or before
/// it. `bbox` keeps products whose extent overlaps it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductQuery {
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
    pub satellite: Option<String>,
    pub product_type: Option<String>,
    pub bbox: Option<BoundingBox>,
    /// Page size. `None` uses the configured default.
    pub limit: Option<u32>,
    pub offset: u64,
}

impl ProductQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_from(mut self, start: Timestamp) -> Self {
        self.start = Some(start);
        self
    }

    pub fn ending_by(mut self, end: Timestamp) -> Self {
        self.end = Some(end);
        self
    }

    pub fn satellite(mut self, satellite: impl Into<String>) -> Self {
        self.satellite = Some(satellite.into());
        self
    }

    pub fn product_type(mut self, product_type: impl Into<String>) -> Self {
        self.product_type = Some(product_type.into());
        self
    }

    pub fn bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Validate the filters and resolve the page size against the configured
    /// default and maximum.
    pub fn resolve_limit(&self, default_limit: u32, max_limit: u32) -> crate::Result<u32> {
        if let (Some(start), Some(end)) = (self.start, self.end)
            && start > end
        {
            return Err(crate::Error::InvalidRange(format!(
                "start ({start}) is after end ({end})"
            )));
        }
        let limit = self.limit.unwrap_or(default_limit);
        if limit == 0 || limit > max_limit {
            return Err(crate::Error::InvalidQuery(format!(
                "limit must be between 1 and {max_limit}, got {limit}"
            )));
        }
        Ok(limit)
    }
}
