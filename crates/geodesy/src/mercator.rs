//! Web mercator tile math (slippy / XYZ scheme).

use std::f64::consts::PI;

use tiler_common::bbox::MAX_MERCATOR_LAT;
use tiler_common::{BoundingBox, TileCoord};

/// Margin used to keep exact-boundary coordinates from spilling into a
/// neighboring tile when computing the max corner of a range. Relative
/// to the coordinate magnitude: tile indices grow with zoom, so an
/// absolute margin smaller than one ulp of the index would vanish in
/// rounding at high zooms.
const EDGE_EPSILON: f64 = 1e-9;

/// Pull a max-corner fractional coordinate off an exact tile boundary.
fn nudge_down(v: f64) -> f64 {
    v - v.abs().max(1.0) * EDGE_EPSILON
}

/// Push a min-corner fractional coordinate off an exact tile boundary.
fn nudge_up(v: f64) -> f64 {
    v + v.abs().max(1.0) * EDGE_EPSILON
}

/// Fractional tile coordinates of a point at the given zoom.
fn point_to_tile_frac(lat: f64, lon: f64, zoom: u32) -> (f64, f64) {
    let n = (1u64 << zoom) as f64;
    let lat = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
    let x = (lon + 180.0) / 360.0 * n;
    let lat_rad = lat.to_radians();
    let y = (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n;
    (x, y)
}

/// Enumerate every tile at `zoom` whose extent intersects `bbox`.
///
/// The set is minimal: a bbox edge lying exactly on a tile boundary does
/// not pull in the zero-overlap neighbor. A degenerate (zero-area) bbox
/// yields exactly one tile.
pub fn tiles_for_bounds(bbox: &BoundingBox, zoom: u32) -> Vec<TileCoord> {
    let max_index = (1u64 << zoom) - 1;

    let (x_min_f, y_min_f) = point_to_tile_frac(bbox.north, bbox.west, zoom);
    let (x_max_f, y_max_f) = point_to_tile_frac(bbox.south, bbox.east, zoom);

    let clamp = |v: f64| -> u32 { (v.floor().max(0.0) as u64).min(max_index) as u32 };

    let x_min = clamp(nudge_up(x_min_f));
    let y_min = clamp(nudge_up(y_min_f));
    let x_max = clamp(nudge_down(x_max_f)).max(x_min);
    let y_max = clamp(nudge_down(y_max_f)).max(y_min);

    let mut tiles =
        Vec::with_capacity(((x_max - x_min + 1) as usize) * ((y_max - y_min + 1) as usize));
    for y in y_min..=y_max {
        for x in x_min..=x_max {
            tiles.push(TileCoord::new(zoom, x, y));
        }
    }
    tiles
}

/// Geographic bounds of a tile (inverse mercator mapping of its corners).
pub fn tile_bounds(coord: &TileCoord) -> BoundingBox {
    let n = (1u64 << coord.z) as f64;

    let lon_at = |x: f64| x / n * 360.0 - 180.0;
    let lat_at = |y: f64| {
        let t = PI * (1.0 - 2.0 * y / n);
        t.sinh().atan().to_degrees()
    };

    BoundingBox::new(
        lon_at(coord.x as f64),
        lat_at((coord.y + 1) as f64),
        lon_at((coord.x + 1) as f64),
        lat_at(coord.y as f64),
    )
}

/// Pixel position of a lat/lon point within a tile's geographic span.
///
/// Linear interpolation over the tile bounds, with the y axis inverted
/// for image coordinates. Values outside [0, tile_size] mean the point
/// falls outside the tile.
pub fn lat_lon_to_tile_pixel(
    lat: f64,
    lon: f64,
    tile_bbox: &BoundingBox,
    tile_size: u32,
) -> (f64, f64) {
    let x_ratio = (lon - tile_bbox.west) / tile_bbox.width();
    let y_ratio = (tile_bbox.north - lat) / tile_bbox.height();
    (x_ratio * tile_size as f64, y_ratio * tile_size as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_at_zoom_zero() {
        let world = BoundingBox::new(-180.0, -85.0511, 180.0, 85.0511);
        let tiles = tiles_for_bounds(&world, 0);
        assert_eq!(tiles, vec![TileCoord::new(0, 0, 0)]);
    }

    #[test]
    fn test_known_tile_athens() {
        // Athens at z12 sits in tile 2317/1580
        let tiles = tiles_for_bounds(&BoundingBox::new(23.70, 37.98, 23.70, 37.98), 12);
        assert_eq!(tiles, vec![TileCoord::new(12, 2317, 1580)]);
    }

    #[test]
    fn test_degenerate_bbox_single_tile() {
        let bbox = BoundingBox::new(10.0, 50.0, 10.0, 50.0);
        for z in [0, 5, 12, 18] {
            assert_eq!(tiles_for_bounds(&bbox, z).len(), 1, "zoom {}", z);
        }
    }

    #[test]
    fn test_every_tile_intersects_bbox() {
        let bbox = BoundingBox::new(23.7, 37.9, 24.0, 38.1);
        let tiles = tiles_for_bounds(&bbox, 12);
        assert!(!tiles.is_empty());
        for tile in &tiles {
            assert!(
                tile_bounds(tile).intersects(&bbox),
                "tile {} does not intersect the bbox",
                tile
            );
        }
    }

    #[test]
    fn test_round_trip_tile_bounds() {
        for coord in [
            TileCoord::new(12, 2317, 1580),
            TileCoord::new(5, 17, 11),
            TileCoord::new(1, 0, 1),
        ] {
            let bounds = tile_bounds(&coord);
            let tiles = tiles_for_bounds(&bounds, coord.z);
            assert!(tiles.contains(&coord), "round trip lost {}", coord);
        }
    }

    #[test]
    fn test_minimal_set_at_exact_boundary() {
        // A bbox whose edges lie exactly on tile boundaries must not
        // include any zero-overlap neighbor. Large indices at high zoom
        // shrink one ulp of the fractional coordinate below any absolute
        // margin, so the high-zoom cases matter as much as the low.
        for coord in [
            TileCoord::new(4, 7, 5),
            TileCoord::new(12, 2317, 1580),
            TileCoord::new(20, 549300, 1023000),
        ] {
            let bounds = tile_bounds(&coord);
            let tiles = tiles_for_bounds(&bounds, coord.z);
            assert_eq!(tiles, vec![coord]);
        }
    }

    #[test]
    fn test_tile_pixel_mapping() {
        let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let (x, y) = lat_lon_to_tile_pixel(1.0, 0.0, &bbox, 256);
        assert!((x - 0.0).abs() < 1e-9);
        assert!((y - 0.0).abs() < 1e-9);

        let (x, y) = lat_lon_to_tile_pixel(0.0, 1.0, &bbox, 256);
        assert!((x - 256.0).abs() < 1e-9);
        assert!((y - 256.0).abs() < 1e-9);

        let (x, y) = lat_lon_to_tile_pixel(0.5, 0.5, &bbox, 256);
        assert!((x - 128.0).abs() < 1e-9);
        assert!((y - 128.0).abs() < 1e-9);
    }
}
