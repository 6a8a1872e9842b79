//! WGS84 Transverse Mercator (UTM) forward projection.
//!
//! Zone selection applies the MGRS irregular exceptions (southwest Norway
//! and Svalbard) as an explicit rule table before the general 6° formula.

use tiler_common::{TilerError, TilerResult};

/// WGS84 semi-major axis (meters).
const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// UTM central meridian scale factor.
const K0: f64 = 0.9996;
/// False easting applied to every zone.
const FALSE_EASTING: f64 = 500_000.0;
/// False northing applied in the southern hemisphere.
const FALSE_NORTHING: f64 = 10_000_000.0;

/// Southern limit of the UTM/MGRS latitude domain.
pub const MIN_UTM_LAT: f64 = -80.0;
/// Northern limit of the UTM/MGRS latitude domain.
pub const MAX_UTM_LAT: f64 = 84.0;

/// A projected UTM coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtmCoord {
    pub zone: u32,
    /// Meters east of the zone's false origin.
    pub easting: f64,
    /// Meters north of the equator (southern hemisphere offset applied).
    pub northing: f64,
    pub south: bool,
}

/// An irregular zone assignment overriding the 6° formula.
struct ZoneException {
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
    zone: u32,
}

/// The MGRS irregular zones: 32V widened over southwest Norway, and the
/// Svalbard zones 31X/33X/35X/37X replacing 32X/34X/36X.
const ZONE_EXCEPTIONS: &[ZoneException] = &[
    ZoneException {
        min_lat: 56.0,
        max_lat: 64.0,
        min_lon: 3.0,
        max_lon: 12.0,
        zone: 32,
    },
    ZoneException {
        min_lat: 72.0,
        max_lat: 84.0,
        min_lon: 0.0,
        max_lon: 9.0,
        zone: 31,
    },
    ZoneException {
        min_lat: 72.0,
        max_lat: 84.0,
        min_lon: 9.0,
        max_lon: 21.0,
        zone: 33,
    },
    ZoneException {
        min_lat: 72.0,
        max_lat: 84.0,
        min_lon: 21.0,
        max_lon: 33.0,
        zone: 35,
    },
    ZoneException {
        min_lat: 72.0,
        max_lat: 84.0,
        min_lon: 33.0,
        max_lon: 42.0,
        zone: 37,
    },
];

/// UTM zone number for a point, irregular exceptions included.
pub fn utm_zone(lat: f64, lon: f64) -> u32 {
    // The antimeridian belongs to zone 1
    let lon = if lon >= 180.0 { lon - 360.0 } else { lon };

    for rule in ZONE_EXCEPTIONS {
        if lat >= rule.min_lat
            && lat < rule.max_lat
            && lon >= rule.min_lon
            && lon < rule.max_lon
        {
            return rule.zone;
        }
    }

    let zone = ((lon + 180.0) / 6.0).floor() as i64 + 1;
    zone.clamp(1, 60) as u32
}

fn check_domain(lat: f64, lon: f64) -> TilerResult<()> {
    if !(MIN_UTM_LAT..=MAX_UTM_LAT).contains(&lat) {
        return Err(TilerError::Projection(format!(
            "latitude {} outside the UTM domain [{}, {}]",
            lat, MIN_UTM_LAT, MAX_UTM_LAT
        )));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(TilerError::Projection(format!(
            "longitude {} outside [-180, 180]",
            lon
        )));
    }
    Ok(())
}

/// Project a lat/lon point to UTM, selecting the zone automatically.
pub fn lat_lon_to_utm(lat: f64, lon: f64) -> TilerResult<UtmCoord> {
    check_domain(lat, lon)?;
    lat_lon_to_utm_in_zone(lat, lon, utm_zone(lat, lon))
}

/// Project a lat/lon point into a specific zone.
///
/// Used when a tile straddles a zone boundary and every corner must be
/// expressed in one shared zone; easting may then fall outside the
/// nominal [100 km, 900 km] range.
pub fn lat_lon_to_utm_in_zone(lat: f64, lon: f64, zone: u32) -> TilerResult<UtmCoord> {
    check_domain(lat, lon)?;

    let e2 = WGS84_F * (2.0 - WGS84_F);
    let ep2 = e2 / (1.0 - e2);

    let lat_rad = lat.to_radians();
    let central_meridian = (zone as f64 - 1.0) * 6.0 - 180.0 + 3.0;
    let mut dlon = lon - central_meridian;
    // Wrap so zone 1 / zone 60 points near the antimeridian project sanely
    if dlon > 180.0 {
        dlon -= 360.0;
    } else if dlon < -180.0 {
        dlon += 360.0;
    }
    let dlon_rad = dlon.to_radians();

    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let tan_lat = lat_rad.tan();

    let n = WGS84_A / (1.0 - e2 * sin_lat * sin_lat).sqrt();
    let t = tan_lat * tan_lat;
    let c = ep2 * cos_lat * cos_lat;
    let a = cos_lat * dlon_rad;

    // Meridian arc length from the equator
    let m = WGS84_A
        * ((1.0 - e2 / 4.0 - 3.0 * e2 * e2 / 64.0 - 5.0 * e2 * e2 * e2 / 256.0) * lat_rad
            - (3.0 * e2 / 8.0 + 3.0 * e2 * e2 / 32.0 + 45.0 * e2 * e2 * e2 / 1024.0)
                * (2.0 * lat_rad).sin()
            + (15.0 * e2 * e2 / 256.0 + 45.0 * e2 * e2 * e2 / 1024.0) * (4.0 * lat_rad).sin()
            - (35.0 * e2 * e2 * e2 / 3072.0) * (6.0 * lat_rad).sin());

    let easting = K0
        * n
        * (a + (1.0 - t + c) * a.powi(3) / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0)
        + FALSE_EASTING;

    let mut northing = K0
        * (m + n
            * tan_lat
            * (a * a / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a.powi(6) / 720.0));

    let south = lat < 0.0;
    if south {
        northing += FALSE_NORTHING;
    }

    Ok(UtmCoord {
        zone,
        easting,
        northing,
        south,
    })
}
