//! Common types shared across the mgrs-tiler crates.

pub mod bbox;
pub mod error;
pub mod precision;
pub mod tile;

pub use bbox::BoundingBox;
pub use error::{TilerError, TilerResult};
pub use precision::Precision;
pub use tile::{TileCoord, ZoomRange, TILE_SIZE};
