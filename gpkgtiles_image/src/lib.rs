//! Image payload checks for GeoPackage tiles.
//!
//! Tiles may be stored as PNG or JPEG. This crate detects the encoding of a
//! payload (WebP included) and checks whether it actually decodes.

mod encoding;
pub use encoding::*;

mod format;
pub use format::*;

pub mod helper;
