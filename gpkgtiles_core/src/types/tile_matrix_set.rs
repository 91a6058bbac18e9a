use crate::{BoundingBox, validate_table_name};
use anyhow::Result;

/// The `gpkg_tile_matrix_set` row of a tile set.
///
/// Its bounding box is exact: every tile matrix of the pyramid spans precisely
/// this area, unlike the informative box stored in `gpkg_contents`.
#[derive(Clone, Debug, PartialEq)]
pub struct TileMatrixSet {
	pub table_name: String,
	pub srs_id: i32,
	pub bounding_box: BoundingBox,
}

impl TileMatrixSet {
	pub fn new(table_name: &str, srs_id: i32, bounding_box: BoundingBox) -> Result<TileMatrixSet> {
		validate_table_name(table_name)?;
		Ok(TileMatrixSet {
			table_name: table_name.to_string(),
			srs_id,
			bounding_box: bounding_box.checked()?,
		})
	}
}
