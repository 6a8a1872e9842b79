//! MGRS grid precision and its zoom-level selection policy.

use serde::{Deserialize, Serialize};

/// Grid cell size for the MGRS overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Precision {
    /// 100 km squares
    Km100,
    /// 10 km squares
    Km10,
    /// 1 km squares
    Km1,
    /// 100 m squares
    M100,
    /// 10 m squares
    M10,
}

impl Precision {
    /// Select the grid precision for a zoom level. The mapping is fixed:
    /// coarse grids at low zooms, 10 m squares from zoom 17 up.
    pub fn for_zoom(zoom: u32) -> Self {
        match zoom {
            0..=6 => Self::Km100,
            7..=10 => Self::Km10,
            11..=13 => Self::Km1,
            14..=16 => Self::M100,
            _ => Self::M10,
        }
    }

    /// Grid cell edge length in meters.
    pub fn cell_meters(&self) -> f64 {
        match self {
            Self::Km100 => 100_000.0,
            Self::Km10 => 10_000.0,
            Self::Km1 => 1_000.0,
            Self::M100 => 100.0,
            Self::M10 => 10.0,
        }
    }

    /// Number of easting/northing digit pairs in an MGRS reference at
    /// this precision (0 for bare 100 km squares).
    pub fn digits(&self) -> u32 {
        match self {
            Self::Km100 => 0,
            Self::Km10 => 1,
            Self::Km1 => 2,
            Self::M100 => 3,
            Self::M10 => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_policy_table() {
        assert_eq!(Precision::for_zoom(0), Precision::Km100);
        assert_eq!(Precision::for_zoom(6), Precision::Km100);
        assert_eq!(Precision::for_zoom(7), Precision::Km10);
        assert_eq!(Precision::for_zoom(10), Precision::Km10);
        assert_eq!(Precision::for_zoom(11), Precision::Km1);
        assert_eq!(Precision::for_zoom(13), Precision::Km1);
        assert_eq!(Precision::for_zoom(14), Precision::M100);
        assert_eq!(Precision::for_zoom(16), Precision::M100);
        assert_eq!(Precision::for_zoom(17), Precision::M10);
        assert_eq!(Precision::for_zoom(22), Precision::M10);
    }

    #[test]
    fn test_cell_meters_and_digits() {
        assert_eq!(Precision::Km100.cell_meters(), 100_000.0);
        assert_eq!(Precision::M10.cell_meters(), 10.0);
        assert_eq!(Precision::Km100.digits(), 0);
        assert_eq!(Precision::Km1.digits(), 2);
        assert_eq!(Precision::M10.digits(), 4);
    }
}
