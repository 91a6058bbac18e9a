use anyhow::Result;
use gpkgtiles_core::VerificationLevel;
use gpkgtiles_derive::context;
use serde::Deserialize;
use std::{
	fs::File,
	io::{BufReader, Read},
	path::Path,
};

/// Settings of a [`GeoPackage`](crate::GeoPackage) handle, usually read from YAML:
///
/// ```yaml
/// verification_level: full
/// default_precision: 7
/// pool_size: 4
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// Verification run when a file is opened.
	pub verification_level: VerificationLevel,

	/// Decimal digits the tile matrix set bounds are rounded to when a
	/// coordinate is converted to a tile address.
	pub default_precision: u32,

	/// Maximum number of pooled SQLite connections.
	pub pool_size: u32,
}

impl Default for Config {
	fn default() -> Self {
		Config {
			verification_level: VerificationLevel::Fast,
			default_precision: 7,
			pool_size: 4,
		}
	}
}

impl Config {
	pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
		Ok(serde_yaml_ng::from_reader(reader)?)
	}

	pub fn from_string(text: &str) -> Result<Self> {
		Ok(serde_yaml_ng::from_str(text)?)
	}

	#[context("reading config '{}'", path.display())]
	pub fn from_path(path: &Path) -> Result<Self> {
		let file = File::open(path)?;
		Config::from_reader(BufReader::new(file))
	}

	pub fn with_verification_level(mut self, level: VerificationLevel) -> Self {
		self.verification_level = level;
		self
	}
}
