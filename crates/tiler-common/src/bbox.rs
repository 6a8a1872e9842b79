//! Geographic bounding box type and validation.

use serde::{Deserialize, Serialize};

use crate::error::{TilerError, TilerResult};

/// Latitude limit of the web mercator projection.
pub const MAX_MERCATOR_LAT: f64 = 85.0511;

/// A geographic bounding box in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    /// Create a new bounding box from edge coordinates.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Validate ordering and the mercator latitude domain.
    pub fn validate(&self) -> TilerResult<()> {
        if !self.west.is_finite()
            || !self.south.is_finite()
            || !self.east.is_finite()
            || !self.north.is_finite()
        {
            return Err(TilerError::InvalidBounds(
                "coordinates must be finite".to_string(),
            ));
        }
        if self.west >= self.east {
            return Err(TilerError::InvalidBounds(format!(
                "west ({}) must be < east ({})",
                self.west, self.east
            )));
        }
        if self.south >= self.north {
            return Err(TilerError::InvalidBounds(format!(
                "south ({}) must be < north ({})",
                self.south, self.north
            )));
        }
        if self.south < -MAX_MERCATOR_LAT || self.north > MAX_MERCATOR_LAT {
            return Err(TilerError::InvalidBounds(format!(
                "latitudes must be within ±{} (got {}..{})",
                MAX_MERCATOR_LAT, self.south, self.north
            )));
        }
        if self.west < -180.0 || self.east > 180.0 {
            return Err(TilerError::InvalidBounds(format!(
                "longitudes must be within ±180 (got {}..{})",
                self.west, self.east
            )));
        }
        Ok(())
    }

    /// Width in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Height in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Center point as (lat, lon).
    pub fn center(&self) -> (f64, f64) {
        (
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    /// Check if this bbox intersects another.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.west < other.east
            && self.east > other.west
            && self.south < other.north
            && self.north > other.south
    }

    /// Check if a point is contained within this bbox.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lon >= self.west && lon <= self.east && lat >= self.south && lat <= self.north
    }

    /// Render as the MBTiles metadata convention: "west,south,east,north".
    pub fn metadata_string(&self) -> String {
        format!("{},{},{},{}", self.west, self.south, self.east, self.north)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_bbox() {
        let bbox = BoundingBox::new(23.7, 37.9, 24.0, 38.1);
        assert!(bbox.validate().is_ok());
        assert!((bbox.width() - 0.3).abs() < 1e-9);
        assert!((bbox.height() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        assert!(BoundingBox::new(24.0, 37.9, 23.7, 38.1).validate().is_err());
        assert!(BoundingBox::new(23.7, 38.1, 24.0, 37.9).validate().is_err());
    }

    #[test]
    fn test_mercator_latitude_limit() {
        assert!(BoundingBox::new(-180.0, -85.0511, 180.0, 85.0511)
            .validate()
            .is_ok());
        assert!(BoundingBox::new(-180.0, -86.0, 180.0, 85.0)
            .validate()
            .is_err());
        assert!(BoundingBox::new(-180.0, -85.0, 180.0, 89.9)
            .validate()
            .is_err());
    }

    #[test]
    fn test_contains_and_intersects() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 5.0, 15.0, 15.0);
        let c = BoundingBox::new(20.0, 20.0, 30.0, 30.0);

        assert!(a.contains(5.0, 5.0));
        assert!(!a.contains(5.0, 11.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }
}
