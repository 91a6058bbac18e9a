//! The file-level handle of a GeoPackage.
//!
//! A [`GeoPackage`] owns the SQLite pool of one file. Opening verifies the
//! file at the configured [`VerificationLevel`] and refuses to hand out a
//! handle for a non-conformant file.
//!
//! ```rust,no_run
//! use gpkgtiles_container::{Config, GeoPackage};
//!
//! let gpkg = GeoPackage::open("aerial.gpkg".as_ref(), &Config::default()).unwrap();
//! for issue in gpkg.issues() {
//!     println!("{issue}");
//! }
//! ```

use crate::{Catalog, Config, StorageView, Tiles, verify};
use anyhow::Result;
use gpkgtiles_core::{Issue, VerificationLevel};
use gpkgtiles_derive::context;
use std::path::Path;

#[derive(Debug)]
pub struct GeoPackage {
	storage: StorageView,
	config: Config,
	issues: Vec<Issue>,
}

impl GeoPackage {
	/// Opens an existing GeoPackage and verifies it.
	///
	/// Fails with a [`ConformanceError`](gpkgtiles_core::ConformanceError) if
	/// a rule reports an error. Warnings are kept, see [`GeoPackage::issues`].
	#[context("opening GeoPackage '{}'", path.display())]
	pub fn open(path: &Path, config: &Config) -> Result<GeoPackage> {
		log::debug!("open {path:?}");
		let storage = StorageView::open(path, config.pool_size)?;
		let issues = verify(&storage, config.verification_level)?;
		Ok(GeoPackage {
			storage,
			config: config.clone(),
			issues,
		})
	}

	/// Creates a new GeoPackage with the core tables and the default spatial
	/// reference systems. Fails if the file exists.
	#[context("creating GeoPackage '{}'", path.display())]
	pub fn create(path: &Path, config: &Config) -> Result<GeoPackage> {
		log::debug!("create {path:?}");
		let storage = StorageView::create(path, config.pool_size)?;
		Catalog::new(&storage).create_tables()?;
		Ok(GeoPackage {
			storage,
			config: config.clone(),
			issues: vec![],
		})
	}

	pub fn open_or_create(path: &Path, config: &Config) -> Result<GeoPackage> {
		if path.exists() {
			GeoPackage::open(path, config)
		} else {
			GeoPackage::create(path, config)
		}
	}

	/// Verifies the file again at `level`, replacing the kept issues on success.
	pub fn verify(&mut self, level: VerificationLevel) -> Result<&[Issue]> {
		self.issues = verify(&self.storage, level)?;
		Ok(&self.issues)
	}

	/// Warnings found by the last successful verification.
	pub fn issues(&self) -> &[Issue] {
		&self.issues
	}

	pub fn tiles(&self) -> Tiles<'_> {
		Tiles::new(&self.storage)
	}

	pub fn catalog(&self) -> Catalog<'_> {
		Catalog::new(&self.storage)
	}

	pub fn storage(&self) -> &StorageView {
		&self.storage
	}

	pub fn config(&self) -> &Config {
		&self.config
	}
}
