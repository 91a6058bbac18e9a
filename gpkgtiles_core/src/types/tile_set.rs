use crate::{BoundingBox, validate_table_name};
use anyhow::Result;

/// A tile pyramid as registered in `gpkg_contents`.
#[derive(Clone, Debug, PartialEq)]
pub struct TileSet {
	pub table_name: String,
	pub identifier: String,
	pub description: String,
	/// ISO-8601 timestamp, e.g. `2024-05-01T12:00:00.000Z`.
	pub last_change: String,
	/// Informative extent of the content; valid for every zoom level.
	pub bounding_box: BoundingBox,
	pub srs_id: i32,
}

impl TileSet {
	pub fn new(
		table_name: &str,
		identifier: &str,
		description: &str,
		last_change: &str,
		bounding_box: BoundingBox,
		srs_id: i32,
	) -> Result<TileSet> {
		validate_table_name(table_name)?;
		Ok(TileSet {
			table_name: table_name.to_string(),
			identifier: identifier.to_string(),
			description: description.to_string(),
			last_change: last_change.to_string(),
			bounding_box: bounding_box.checked()?,
			srs_id,
		})
	}

	/// Compares all attributes except `last_change`.
	pub fn same_definition(&self, other: &TileSet) -> bool {
		self.table_name == other.table_name
			&& self.identifier == other.identifier
			&& self.description == other.description
			&& self.bounding_box == other.bounding_box
			&& self.srs_id == other.srs_id
	}
}
