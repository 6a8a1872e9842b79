//! Building blocks of the tile-builder binary, exposed for integration
//! tests.

pub mod config;
pub mod fetch;
pub mod pipeline;
