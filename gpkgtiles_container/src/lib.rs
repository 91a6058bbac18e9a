//! GeoPackage tile pyramids stored in SQLite.
//!
//! This crate provides the storage side of the pyramid model defined in
//! `gpkgtiles_core`:
//! - [`StorageView`]: a pooled SQLite connection with transactional helpers,
//! - [`Catalog`]: the `gpkg_contents` and `gpkg_spatial_ref_sys` tables,
//! - [`Tiles`]: adding and reading tile sets, tile matrices and tiles,
//! - [`verification`]: the conformance rules of the GeoPackage tiles
//!   specification and the function that runs them,
//! - [`GeoPackage`]: a file handle that verifies on open.
//!
//! # Quick start
//! ```rust,no_run
//! use gpkgtiles_container::*;
//! use gpkgtiles_core::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let gpkg = GeoPackage::open_or_create("world.gpkg".as_ref(), &Config::default())?;
//!     let srs = gpkg.catalog().get_spatial_reference_system(4326)?.unwrap();
//!     let bbox = BoundingBox::new(-180.0, -90.0, 180.0, 90.0)?;
//!     let tile_set = gpkg.tiles().add_tile_set("world", "World", "", &bbox, &srs)?;
//!     gpkg.tiles().add_tile_matrix(&tile_set, 0, 2, 1, 256, 256, 180.0 / 256.0, 180.0 / 256.0)?;
//!     Ok(())
//! }
//! ```

mod catalog;
pub use catalog::*;

mod config;
pub use config::*;

mod geopackage;
pub use geopackage::*;

mod storage;
pub use storage::*;

mod tiles;
pub use tiles::*;

pub mod verification;
pub use verification::verify;

#[cfg(any(test, feature = "test"))]
pub mod testing;
