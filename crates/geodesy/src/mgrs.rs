//! MGRS cell derivation from geographic coordinates.

use std::fmt;

use tiler_common::{Precision, TilerError, TilerResult};

use crate::utm::{lat_lon_to_utm, UtmCoord};

/// Latitude band letters, 8° bands from 80°S (I and O omitted). The last
/// band X spans 12°, up to 84°N.
const BAND_LETTERS: &[u8] = b"CDEFGHJKLMNPQRSTUVWX";

/// 100 km column letter sets, cycling with the zone number.
const COLUMN_SETS: [&[u8]; 3] = [b"ABCDEFGH", b"JKLMNPQR", b"STUVWXYZ"];

/// 100 km row letters, a 2,000 km cycle (I and O omitted).
const ROW_LETTERS: &[u8] = b"ABCDEFGHJKLMNPQRSTUV";

const SQUARE_METERS: f64 = 100_000.0;

/// An MGRS cell at a given precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MgrsCell {
    pub zone: u32,
    pub band: char,
    /// 100 km square column/row letters.
    pub square: [char; 2],
    /// Easting within the 100 km square, truncated to `precision`.
    pub easting: u32,
    /// Northing within the 100 km square, truncated to `precision`.
    pub northing: u32,
    pub precision: Precision,
}

impl MgrsCell {
    /// The 5-character zone identifier: zero-padded zone number, band
    /// letter, and 100 km square letters (e.g. "34SGH").
    pub fn grid_id(&self) -> String {
        format!(
            "{:02}{}{}{}",
            self.zone, self.band, self.square[0], self.square[1]
        )
    }
}

impl fmt::Display for MgrsCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.precision.digits() as usize;
        write!(f, "{}", self.grid_id())?;
        if digits > 0 {
            write!(
                f,
                "{:0width$}{:0width$}",
                self.easting,
                self.northing,
                width = digits
            )?;
        }
        Ok(())
    }
}

/// Latitude band letter (C through X, no I or O).
fn band_letter(lat: f64) -> TilerResult<char> {
    if !(-80.0..=84.0).contains(&lat) {
        return Err(TilerError::Projection(format!(
            "latitude {} has no MGRS band",
            lat
        )));
    }
    let index = (((lat + 80.0) / 8.0).floor() as usize).min(BAND_LETTERS.len() - 1);
    Ok(BAND_LETTERS[index] as char)
}

/// 100 km square letters for a projected coordinate.
fn square_letters(utm: &UtmCoord) -> TilerResult<[char; 2]> {
    let col_index = (utm.easting / SQUARE_METERS).floor() as i64 - 1;
    if !(0..8).contains(&col_index) {
        return Err(TilerError::Projection(format!(
            "easting {} outside the zone square lattice",
            utm.easting
        )));
    }
    let columns = COLUMN_SETS[((utm.zone - 1) % 3) as usize];
    let column = columns[col_index as usize] as char;

    // Row letters advance every 100 km and repeat every 2,000 km; even
    // zones shift the alphabet by five letters
    let row_offset = if utm.zone % 2 == 0 { 5 } else { 0 };
    let row_index =
        (((utm.northing / SQUARE_METERS).floor() as i64 + row_offset).rem_euclid(20)) as usize;
    let row = ROW_LETTERS[row_index] as char;

    Ok([column, row])
}

/// Derive the MGRS cell containing a lat/lon point at the given precision.
pub fn lat_lon_to_mgrs(lat: f64, lon: f64, precision: Precision) -> TilerResult<MgrsCell> {
    let utm = lat_lon_to_utm(lat, lon)?;
    let band = band_letter(lat)?;
    let square = square_letters(&utm)?;

    // Truncate the within-square offsets to the precision's digit count
    let cell = precision.cell_meters();
    let easting = (utm.easting.rem_euclid(SQUARE_METERS) / cell).floor() as u32;
    let northing = (utm.northing.rem_euclid(SQUARE_METERS) / cell).floor() as u32;

    Ok(MgrsCell {
        zone: utm.zone,
        band,
        square,
        easting,
        northing,
        precision,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_letters() {
        assert_eq!(band_letter(-80.0).unwrap(), 'C');
        assert_eq!(band_letter(0.0).unwrap(), 'N');
        assert_eq!(band_letter(-0.1).unwrap(), 'M');
        assert_eq!(band_letter(38.0).unwrap(), 'S');
        assert_eq!(band_letter(61.0).unwrap(), 'V');
        assert_eq!(band_letter(75.0).unwrap(), 'X');
        assert_eq!(band_letter(84.0).unwrap(), 'X');
        assert!(band_letter(84.1).is_err());
        assert!(band_letter(-80.1).is_err());
    }

    #[test]
    fn test_athens_cell() {
        // Athens: zone 34, band S, square GH
        let cell = lat_lon_to_mgrs(38.0, 23.7, Precision::Km1).unwrap();
        assert_eq!(cell.zone, 34);
        assert_eq!(cell.band, 'S');
        assert_eq!(cell.grid_id(), "34SGH");
    }

    #[test]
    fn test_norway_exception_cell() {
        // 61°N 4°E resolves to 32V per the Norway exception, not 31V
        let cell = lat_lon_to_mgrs(61.0, 4.0, Precision::Km100).unwrap();
        assert_eq!(cell.zone, 32);
        assert_eq!(cell.band, 'V');
    }

    #[test]
    fn test_svalbard_cell() {
        let cell = lat_lon_to_mgrs(75.0, 8.0, Precision::Km100).unwrap();
        assert_eq!(cell.zone, 31);
        assert_eq!(cell.band, 'X');
    }

    #[test]
    fn test_determinism() {
        let a = lat_lon_to_mgrs(38.05, 23.85, Precision::M10).unwrap();
        let b = lat_lon_to_mgrs(38.05, 23.85, Precision::M10).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_precision_truncation_nests() {
        // Coarser precisions are prefixes of finer ones
        let fine = lat_lon_to_mgrs(38.05, 23.85, Precision::M10).unwrap();
        let coarse = lat_lon_to_mgrs(38.05, 23.85, Precision::Km1).unwrap();
        assert_eq!(fine.grid_id(), coarse.grid_id());
        assert_eq!(fine.easting / 100, coarse.easting);
        assert_eq!(fine.northing / 100, coarse.northing);
    }

    #[test]
    fn test_display_digit_width() {
        let cell = MgrsCell {
            zone: 34,
            band: 'S',
            square: ['G', 'H'],
            easting: 7,
            northing: 42,
            precision: Precision::Km1,
        };
        assert_eq!(cell.to_string(), "34SGH0742");

        let bare = MgrsCell {
            precision: Precision::Km100,
            easting: 0,
            northing: 0,
            ..cell
        };
        assert_eq!(bare.to_string(), "34SGH");
    }

    #[test]
    fn test_out_of_domain() {
        assert!(lat_lon_to_mgrs(85.0, 10.0, Precision::Km100).is_err());
        assert!(lat_lon_to_mgrs(-81.0, 10.0, Precision::Km100).is_err());
    }
}
