//! Geodetic math for the tile pipeline.
//!
//! Three layers:
//! - web mercator tile enumeration and inverse tile bounds,
//! - WGS84 Transverse Mercator (UTM) forward projection with the MGRS
//!   irregular zone exceptions,
//! - MGRS cell derivation (zone, band, 100 km square, truncated
//!   easting/northing).

pub mod mercator;
pub mod mgrs;
pub mod utm;

pub use mercator::{lat_lon_to_tile_pixel, tile_bounds, tiles_for_bounds};
pub use mgrs::{lat_lon_to_mgrs, MgrsCell};
pub use utm::{lat_lon_to_utm, lat_lon_to_utm_in_zone, utm_zone, UtmCoord};
