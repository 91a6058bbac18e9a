//! Core types of the GeoPackage tile pyramid: the pyramid model, the coordinate
//! transform engine and the value types produced by conformance verification.
//!
//! Nothing in this crate performs I/O. Entities are fetched from and written to
//! storage by `gpkgtiles_container`; this crate validates them and converts
//! between geographic coordinates and tile addresses.

pub mod macros;

mod error;
pub use error::*;

pub mod transform;

pub mod types;
pub use types::*;

pub mod verification;
pub use verification::*;
