//! Fixtures for tests: a scratch GeoPackage and a small conforming pyramid.

use crate::{Catalog, DEFAULT_SPATIAL_REFERENCE_SYSTEMS, StorageView, Tiles};
use anyhow::Result;
use gpkgtiles_core::{BoundingBox, SpatialReferenceSystem, TileSet};
use gpkgtiles_image::helper::create_png_tile;

/// Creates a GeoPackage with the core tables in a temporary directory.
///
/// The file is removed when the returned `NamedTempFile` is dropped.
#[cfg(test)]
pub fn temp_storage() -> Result<(assert_fs::NamedTempFile, StorageView)> {
	let file = assert_fs::NamedTempFile::new("test.gpkg")?;
	let storage = StorageView::create(file.path(), 2)?;
	Catalog::new(&storage).create_tables()?;
	Ok((file, storage))
}

/// The WGS 84 row that [`Catalog::create_tables`] inserts.
pub fn wgs84() -> SpatialReferenceSystem {
	let (name, srs_id, organization, organization_srs_id, definition, description) =
		DEFAULT_SPATIAL_REFERENCE_SYSTEMS[0];
	SpatialReferenceSystem {
		name: name.to_string(),
		srs_id,
		organization: organization.to_string(),
		organization_srs_id,
		definition: definition.to_string(),
		description: Some(description.to_string()),
	}
}

/// Adds the tile set `table_name` covering (0, 0, 30, 50) in WGS 84 with two
/// zoom levels of 256 pixel tiles, 1x1 and 2x2, and a PNG tile at every
/// position.
pub fn add_sample_pyramid(storage: &StorageView, table_name: &str) -> Result<TileSet> {
	let tiles = Tiles::new(storage);
	let bbox = BoundingBox::new(0.0, 0.0, 30.0, 50.0)?;
	let tile_set = tiles.add_tile_set(table_name, table_name, "sample pyramid", &bbox, &wgs84())?;
	let image = create_png_tile(4)?;
	for (zoom_level, size) in [(0, 1), (1, 2)] {
		let matrix = tiles.add_tile_matrix_fitted(&tile_set, zoom_level, size, size, 256, 256)?;
		for row in 0..size {
			for column in 0..size {
				tiles.add_tile(&tile_set, &matrix, column, row, &image)?;
			}
		}
	}
	Ok(tile_set)
}

/// Runs `sql` with foreign key enforcement switched off, so tests can break
/// the references between the GeoPackage tables.
pub fn execute_unchecked(storage: &StorageView, sql: &str) -> Result<()> {
	storage.execute_batch(&format!("PRAGMA foreign_keys = OFF;\n{sql}"))
}
