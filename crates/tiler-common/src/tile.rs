//! Tile coordinates and zoom ranges for the XYZ tiling scheme.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{TilerError, TilerResult};

/// Tile edge length in pixels.
pub const TILE_SIZE: u32 = 256;

/// Maximum supported zoom level.
pub const MAX_ZOOM: u32 = 22;

/// A tile coordinate (z/x/y) in the XYZ scheme, row increasing southward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level
    pub z: u32,
    /// Column (x)
    pub x: u32,
    /// Row (y), XYZ convention (0 at the north edge)
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u32, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Number of tiles along one axis at this zoom.
    pub fn tiles_per_axis(&self) -> u32 {
        1 << self.z
    }

    /// Convert the XYZ row to the TMS row convention (and back: the
    /// mapping is its own inverse). MBTiles stores TMS rows.
    pub fn flip_y(&self) -> u32 {
        (1 << self.z) - 1 - self.y
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// An inclusive zoom level range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoomRange {
    pub min: u32,
    pub max: u32,
}

impl ZoomRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Validate ordering and the supported zoom domain.
    pub fn validate(&self) -> TilerResult<()> {
        if self.min > self.max {
            return Err(TilerError::InvalidZoom(format!(
                "zoom_min ({}) must be <= zoom_max ({})",
                self.min, self.max
            )));
        }
        if self.max > MAX_ZOOM {
            return Err(TilerError::InvalidZoom(format!(
                "zoom levels must be between 0 and {} (got max {})",
                MAX_ZOOM, self.max
            )));
        }
        Ok(())
    }

    /// Iterate over the zoom levels, lowest first.
    pub fn iter(&self) -> impl Iterator<Item = u32> {
        self.min..=self.max
    }
}
