//! Grid line and label geometry for a single tile.

use std::collections::BTreeSet;

use geodesy::mercator::{lat_lon_to_tile_pixel, tile_bounds};
use geodesy::mgrs::lat_lon_to_mgrs;
use geodesy::utm::{lat_lon_to_utm_in_zone, utm_zone, UtmCoord};
use tiler_common::{BoundingBox, Precision, TileCoord, TilerError, TilerResult};

/// Lattice resolution for locating zone transitions within a tile.
const SAMPLE_RESOLUTION: u32 = 20;
/// Sample stride over the lattice (matches 5x5 points per tile).
const SAMPLE_STRIDE: u32 = 5;

/// A label anchor in tile pixel space.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub x: f32,
    pub y: f32,
    pub text: String,
}

/// Grid geometry for one tile: line positions in pixels plus label
/// placements. Computed once per tile and consumed by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct GridOverlaySpec {
    pub precision: Precision,
    /// Pixel x positions of north-south grid lines.
    pub verticals: Vec<f32>,
    /// Pixel y positions of east-west grid lines.
    pub horizontals: Vec<f32>,
    pub labels: Vec<Label>,
}

/// Northing with the southern false origin removed, so interpolation
/// stays continuous across the equator.
fn raw_northing(utm: &UtmCoord) -> f64 {
    if utm.south {
        utm.northing - 10_000_000.0
    } else {
        utm.northing
    }
}

/// Pixel positions where multiples of `cell` fall within [lo, hi],
/// linearly interpolated over the tile span.
fn crossings(lo: f64, hi: f64, cell: f64, tile_size: u32) -> Vec<f64> {
    let mut positions = Vec::new();
    if hi <= lo {
        return positions;
    }
    let mut boundary = (lo / cell).ceil() * cell;
    while boundary <= hi {
        positions.push((boundary - lo) / (hi - lo) * tile_size as f64);
        boundary += cell;
    }
    positions
}

/// Reject tiles whose corners span more than two UTM zones. Rendering a
/// three-zone graticule is not well defined, so these tiles keep their
/// base imagery without an overlay.
fn check_zone_span(zones: &BTreeSet<u32>) -> TilerResult<()> {
    if zones.len() > 2 {
        return Err(TilerError::Projection(format!(
            "tile corners span {} UTM zones",
            zones.len()
        )));
    }
    Ok(())
}

fn corner_points(bounds: &BoundingBox) -> [(f64, f64); 4] {
    [
        (bounds.south, bounds.west),
        (bounds.south, bounds.east),
        (bounds.north, bounds.west),
        (bounds.north, bounds.east),
    ]
}

/// Compute the grid overlay geometry for a tile.
///
/// Fails with a projection error for tiles outside the MGRS domain
/// (pole-adjacent rows) and for tiles straddling more than two zones;
/// callers treat that as "persist the base image, skip the overlay".
pub fn compute_overlay(coord: &TileCoord, tile_size: u32) -> TilerResult<GridOverlaySpec> {
    let bounds = tile_bounds(coord);
    let precision = Precision::for_zoom(coord.z);
    let cell = precision.cell_meters();

    // Corner cells also establish that the whole tile projects cleanly
    let corners = corner_points(&bounds);
    let mut corner_ids = Vec::with_capacity(4);
    let mut corner_zones = BTreeSet::new();
    for (lat, lon) in corners {
        let mgrs = lat_lon_to_mgrs(lat, lon, precision)?;
        corner_zones.insert(mgrs.zone);
        corner_ids.push(mgrs.grid_id());
    }
    check_zone_span(&corner_zones)?;

    // All line positions are interpolated within one shared zone so a
    // boundary-straddling tile still gets a continuous graticule
    let (mid_lat, mid_lon) = bounds.center();
    let zone = utm_zone(mid_lat, mid_lon);

    let west_edge = lat_lon_to_utm_in_zone(mid_lat, bounds.west, zone)?;
    let east_edge = lat_lon_to_utm_in_zone(mid_lat, bounds.east, zone)?;
    let verticals: Vec<f32> = crossings(west_edge.easting, east_edge.easting, cell, tile_size)
        .into_iter()
        .map(|px| px as f32)
        .collect();

    let south_edge = lat_lon_to_utm_in_zone(bounds.south, mid_lon, zone)?;
    let north_edge = lat_lon_to_utm_in_zone(bounds.north, mid_lon, zone)?;
    let (n_lo, n_hi) = (raw_northing(&south_edge), raw_northing(&north_edge));
    // Image rows grow southward, so crossings measured from the south
    // edge are flipped
    let horizontals: Vec<f32> = crossings(n_lo, n_hi, cell, tile_size)
        .into_iter()
        .map(|px| tile_size as f32 - px as f32)
        .collect();

    let labels = if corner_ids.iter().all(|id| id == &corner_ids[0]) {
        // Single-zone tile: one identifier centered in the tile
        vec![Label {
            x: tile_size as f32 / 2.0,
            y: tile_size as f32 / 2.0,
            text: corner_ids[0].clone(),
        }]
    } else {
        transition_labels(&bounds, precision, tile_size)
    };

    Ok(GridOverlaySpec {
        precision,
        verticals,
        horizontals,
        labels,
    })
}

/// One label per distinct 100 km square identifier found on a coarse
/// sample lattice, anchored where it first appears. Labels mark zone and
/// square transitions only; cells are never labeled individually.
fn transition_labels(
    bounds: &BoundingBox,
    precision: Precision,
    tile_size: u32,
) -> Vec<Label> {
    let mut seen = BTreeSet::new();
    let mut labels = Vec::new();

    let lat_step = bounds.height() / SAMPLE_RESOLUTION as f64;
    let lon_step = bounds.width() / SAMPLE_RESOLUTION as f64;

    let mut i = 0;
    while i <= SAMPLE_RESOLUTION {
        let mut j = 0;
        while j <= SAMPLE_RESOLUTION {
            let lat = bounds.south + i as f64 * lat_step;
            let lon = bounds.west + j as f64 * lon_step;

            // Individual sample failures near the domain edge are fine;
            // the corners already projected cleanly
            if let Ok(cell) = lat_lon_to_mgrs(lat, lon, precision) {
                let id = cell.grid_id();
                if seen.insert(id.clone()) {
                    let (x, y) = lat_lon_to_tile_pixel(lat, lon, bounds, tile_size);
                    labels.push(Label {
                        x: x as f32,
                        y: y as f32,
                        text: id,
                    });
                }
            }
            j += SAMPLE_STRIDE;
        }
        i += SAMPLE_STRIDE;
    }

    labels
}
