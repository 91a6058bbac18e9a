use crate::{bail_precondition, precondition};
use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;

/// Prefix reserved for the GeoPackage metadata tables.
pub const RESERVED_TABLE_PREFIX: &str = "gpkg_";

lazy_static! {
	static ref TABLE_NAME: Regex = Regex::new(r"^[_a-zA-Z][_a-zA-Z0-9]*$").unwrap();
}

/// Checks that `name` can be used as the name of a pyramid user data table.
///
/// A valid name starts with a letter or an underscore, continues with
/// letters, digits or underscores, and does not start with `gpkg_`.
///
/// ```
/// use gpkgtiles_core::validate_table_name;
///
/// assert!(validate_table_name("aerial_2024").is_ok());
/// assert!(validate_table_name("2024_aerial").is_err());
/// assert!(validate_table_name("gpkg_tiles").is_err());
/// ```
pub fn validate_table_name(name: &str) -> Result<()> {
	if name.is_empty() {
		bail_precondition!("table name may not be empty");
	}
	precondition!(
		TABLE_NAME.is_match(name),
		"table name '{name}' must begin with a letter or an underscore and may only contain letters, digits and underscores"
	);
	precondition!(
		!name.starts_with(RESERVED_TABLE_PREFIX),
		"table name '{name}' may not start with the reserved prefix '{RESERVED_TABLE_PREFIX}'"
	);
	Ok(())
}
