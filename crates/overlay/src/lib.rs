//! MGRS graticule overlay for map tiles.
//!
//! Splits the work into pure geometry ([`compute_overlay`], producing a
//! [`GridOverlaySpec`] in tile pixel space) and rasterization
//! ([`render_overlay`], burning lines and labels into an RGBA tile).

pub mod draw;
pub mod grid;

pub use draw::render_overlay;
pub use grid::{compute_overlay, GridOverlaySpec, Label};
