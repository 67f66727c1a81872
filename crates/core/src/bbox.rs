//! Geographic bounding boxes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A rectangular geographic extent in degrees.
///
/// Constructed only through [`BoundingBox::new`], so every value satisfies
/// `lat_min <= lat_max` and `lon_min <= lon_max` with finite coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBoundingBox")]
pub struct BoundingBox {
    lat_min: f64,
    lat_max: f64,
    lon_min: f64,
    lon_max: f64,
}

#[derive(Deserialize)]
struct RawBoundingBox {
    lat_min: f64,
    lat_max: f64,
    lon_min: f64,
    lon_max: f64,
}

impl TryFrom<RawBoundingBox> for BoundingBox {
    type Error = crate::Error;

    fn try_from(raw: RawBoundingBox) -> crate::Result<Self> {
        Self::new(raw.lat_min, raw.lat_max, raw.lon_min, raw.lon_max)
    }
}

impl BoundingBox {
    /// Create a bounding box, rejecting non-finite coordinates and inverted ranges.
    pub fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> crate::Result<Self> {
        for (name, value) in [
            ("lat_min", lat_min),
            ("lat_max", lat_max),
            ("lon_min", lon_min),
            ("lon_max", lon_max),
        ] {
            if !value.is_finite() {
                return Err(crate::Error::InvalidRange(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        if lat_min > lat_max {
            return Err(crate::Error::InvalidRange(format!(
                "lat_min ({lat_min}) > lat_max ({lat_max})"
            )));
        }
        if lon_min > lon_max {
            return Err(crate::Error::InvalidRange(format!(
                "lon_min ({lon_min}) > lon_max ({lon_max})"
            )));
        }
        Ok(Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        })
    }

    /// Degenerate box covering a single point.
    pub fn point(lat: f64, lon: f64) -> crate::Result<Self> {
        Self::new(lat, lat, lon, lon)
    }

    pub fn lat_min(&self) -> f64 {
        self.lat_min
    }

    pub fn lat_max(&self) -> f64 {
        self.lat_max
    }

    pub fn lon_min(&self) -> f64 {
        self.lon_min
    }

    pub fn lon_max(&self) -> f64 {
        self.lon_max
    }

    /// Inclusive rectangle-overlap test. Boxes sharing only an edge intersect.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.lat_min <= other.lat_max
            && self.lat_max >= other.lat_min
            && self.lon_min <= other.lon_max
            && self.lon_max >= other.lon_min
    }

    /// Check whether the point lies inside the box or on its boundary.
    pub fn contains_point(&self, lat: f64, lon: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&lat) && (self.lon_min..=self.lon_max).contains(&lon)
    }
}

/// Parses `lat_min,lon_min,lat_max,lon_max`.
impl FromStr for BoundingBox {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(crate::Error::InvalidBoundingBox(format!(
                "expected lat_min,lon_min,lat_max,lon_max, got '{s}'"
            )));
        }
        let mut values = [0.0f64; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| {
                crate::Error::InvalidBoundingBox(format!("'{part}' is not a number"))
            })?;
        }
        let [lat_min, lon_min, lat_max, lon_max] = values;
        Self::new(lat_min, lat_max, lon_min, lon_max)
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.lat_min, self.lon_min, self.lat_max, self.lon_max
        )
    }
}
