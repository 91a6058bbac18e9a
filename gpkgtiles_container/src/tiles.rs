//! Tile sets, tile matrices and tiles of a GeoPackage.
//!
//! A tile set is a row in `gpkg_contents` with `data_type = 'tiles'`, a row in
//! `gpkg_tile_matrix_set` and a pyramid user data table holding the tiles.
//! One row in `gpkg_tile_matrix` describes each zoom level.
//!
//! Mutations validate their input before touching storage and run inside a
//! single transaction each.

use crate::{Catalog, StorageView, quote_identifier};
use anyhow::{Result, bail};
use gpkgtiles_core::{
	BoundingBox, CoordinateReferenceSystem, CrsCoordinate, SpatialReferenceSystem, Tile, TileAddress, TileCoord,
	TileMatrix, TileMatrixSet, TileSet, bail_precondition, precondition, transform, validate_table_name,
};
use gpkgtiles_derive::context;
use r2d2_sqlite::rusqlite::{Row, params};
use std::collections::BTreeSet;
use time::{OffsetDateTime, macros::format_description};

pub const TILE_MATRIX_SET_TABLE: &str = "gpkg_tile_matrix_set";
pub const TILE_MATRIX_TABLE: &str = "gpkg_tile_matrix";

/// Allowed difference between the extent of a tile matrix and the width or
/// height of its tile matrix set.
pub const TILE_MATRIX_EXTENT_TOLERANCE: f64 = 1e-7;

const CREATE_TILE_MATRIX_SET: &str = "CREATE TABLE IF NOT EXISTS gpkg_tile_matrix_set (
	table_name TEXT NOT NULL PRIMARY KEY,
	srs_id INTEGER NOT NULL,
	min_x DOUBLE NOT NULL,
	min_y DOUBLE NOT NULL,
	max_x DOUBLE NOT NULL,
	max_y DOUBLE NOT NULL,
	CONSTRAINT fk_gtms_table_name FOREIGN KEY (table_name) REFERENCES gpkg_contents(table_name),
	CONSTRAINT fk_gtms_srs FOREIGN KEY (srs_id) REFERENCES gpkg_spatial_ref_sys (srs_id)
);";

const CREATE_TILE_MATRIX: &str = "CREATE TABLE IF NOT EXISTS gpkg_tile_matrix (
	table_name TEXT NOT NULL,
	zoom_level INTEGER NOT NULL,
	matrix_width INTEGER NOT NULL,
	matrix_height INTEGER NOT NULL,
	tile_width INTEGER NOT NULL,
	tile_height INTEGER NOT NULL,
	pixel_x_size DOUBLE NOT NULL,
	pixel_y_size DOUBLE NOT NULL,
	CONSTRAINT pk_ttm PRIMARY KEY (table_name, zoom_level),
	CONSTRAINT fk_tmm_table_name FOREIGN KEY (table_name) REFERENCES gpkg_contents(table_name)
);";

/// DDL of a pyramid user data table.
pub fn create_pyramid_table_sql(table_name: &str) -> String {
	format!(
		"CREATE TABLE {} (
	id INTEGER PRIMARY KEY AUTOINCREMENT,
	zoom_level INTEGER NOT NULL,
	tile_column INTEGER NOT NULL,
	tile_row INTEGER NOT NULL,
	tile_data BLOB NOT NULL,
	UNIQUE (zoom_level, tile_column, tile_row)
);",
		quote_identifier(table_name)
	)
}

const SELECT_TILE_MATRIX: &str = "SELECT table_name, zoom_level, matrix_width, matrix_height, tile_width, tile_height, pixel_x_size, pixel_y_size FROM gpkg_tile_matrix";

pub struct Tiles<'a> {
	storage: &'a StorageView,
}

impl<'a> Tiles<'a> {
	pub fn new(storage: &'a StorageView) -> Tiles<'a> {
		Tiles { storage }
	}

	fn catalog(&self) -> Catalog<'a> {
		Catalog::new(self.storage)
	}

	/// Creates a tile set: its contents row, its tile matrix set row and its
	/// pyramid table.
	///
	/// Returns the existing tile set if one with the same definition exists.
	#[context("adding tile set '{table_name}'")]
	pub fn add_tile_set(
		&self,
		table_name: &str,
		identifier: &str,
		description: &str,
		bounding_box: &BoundingBox,
		srs: &SpatialReferenceSystem,
	) -> Result<TileSet> {
		log::debug!("add tile set '{table_name}'");
		validate_table_name(table_name)?;
		precondition!(
			self.catalog().get_spatial_reference_system(srs.srs_id)?.is_some(),
			"spatial reference system {} is not defined in gpkg_spatial_ref_sys",
			srs.srs_id
		);

		let last_change = now_timestamp()?;
		let tile_set = TileSet::new(
			table_name,
			identifier,
			description,
			&last_change,
			*bounding_box,
			srs.srs_id,
		)?;

		if let Some(existing) = self.get_tile_set(table_name)? {
			if existing.same_definition(&tile_set) {
				return Ok(existing);
			}
			bail_precondition!(
				"An entry in the content table already exists with this table name, but has different values for its other fields"
			);
		}
		precondition!(
			!self.storage.table_or_view_exists(table_name)?,
			"A table already exists with this tile set's table name"
		);

		let bbox = &tile_set.bounding_box;
		self.storage.transaction(|tx| {
			tx.execute_batch(CREATE_TILE_MATRIX_SET)?;
			tx.execute_batch(CREATE_TILE_MATRIX)?;
			tx.execute_batch(&create_pyramid_table_sql(table_name))?;
			tx.execute(
				"INSERT INTO gpkg_contents (table_name, data_type, identifier, description, last_change, min_x, min_y, max_x, max_y, srs_id) VALUES (?1, 'tiles', ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
				params![
					table_name,
					(!identifier.is_empty()).then_some(identifier),
					description,
					last_change,
					bbox.min_x,
					bbox.min_y,
					bbox.max_x,
					bbox.max_y,
					srs.srs_id
				],
			)?;
			tx.execute(
				"INSERT INTO gpkg_tile_matrix_set (table_name, srs_id, min_x, min_y, max_x, max_y) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
				params![table_name, srs.srs_id, bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y],
			)?;
			Ok(())
		})?;

		Ok(tile_set)
	}

	/// Adds the tile matrix for one zoom level.
	///
	/// The extent of the matrix, `matrix_width * tile_width * pixel_x_size`
	/// and its vertical counterpart, must match the tile matrix set box.
	#[allow(clippy::too_many_arguments)]
	#[context("adding tile matrix {zoom_level} to '{}'", tile_set.table_name)]
	pub fn add_tile_matrix(
		&self,
		tile_set: &TileSet,
		zoom_level: i32,
		matrix_width: i32,
		matrix_height: i32,
		tile_width: i32,
		tile_height: i32,
		pixel_x_size: f64,
		pixel_y_size: f64,
	) -> Result<TileMatrix> {
		log::debug!("add tile matrix {zoom_level} to '{}'", tile_set.table_name);
		let matrix = TileMatrix::new(
			&tile_set.table_name,
			zoom_level,
			matrix_width,
			matrix_height,
			tile_width,
			tile_height,
			pixel_x_size,
			pixel_y_size,
		)?;

		if let Some(existing) = self.get_tile_matrix(tile_set, zoom_level)? {
			if existing == matrix {
				return Ok(existing);
			}
			bail_precondition!(
				"A tile matrix already exists for zoom level {zoom_level} of '{}', but has different values for its other fields",
				tile_set.table_name
			);
		}

		let Some(matrix_set) = self.get_tile_matrix_set(tile_set)? else {
			bail_precondition!("Cannot add a tile matrix to a tile set with no tile matrix set")
		};
		let bbox = &matrix_set.bounding_box;
		precondition!(
			(matrix.height_in_srs() - bbox.height()).abs() < TILE_MATRIX_EXTENT_TOLERANCE,
			"The geographic height of the tile matrix [matrix height * tile height (pixels) * pixel y size (srs units per pixel)] = {} differs from the height {} of the tile matrix set",
			matrix.height_in_srs(),
			bbox.height()
		);
		precondition!(
			(matrix.width_in_srs() - bbox.width()).abs() < TILE_MATRIX_EXTENT_TOLERANCE,
			"The geographic width of the tile matrix [matrix width * tile width (pixels) * pixel x size (srs units per pixel)] = {} differs from the width {} of the tile matrix set",
			matrix.width_in_srs(),
			bbox.width()
		);

		self.storage.transaction(|tx| {
			tx.execute(
				"INSERT INTO gpkg_tile_matrix (table_name, zoom_level, matrix_width, matrix_height, tile_width, tile_height, pixel_x_size, pixel_y_size) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
				params![
					matrix.table_name,
					matrix.zoom_level,
					matrix.matrix_width,
					matrix.matrix_height,
					matrix.tile_width,
					matrix.tile_height,
					matrix.pixel_x_size,
					matrix.pixel_y_size
				],
			)?;
			Ok(())
		})?;

		Ok(matrix)
	}

	/// Adds a tile matrix whose pixel sizes are derived from the tile matrix
	/// set box, so that the matrix spans it exactly.
	#[context("adding fitted tile matrix {zoom_level} to '{}'", tile_set.table_name)]
	pub fn add_tile_matrix_fitted(
		&self,
		tile_set: &TileSet,
		zoom_level: i32,
		matrix_width: i32,
		matrix_height: i32,
		tile_width: i32,
		tile_height: i32,
	) -> Result<TileMatrix> {
		precondition!(
			matrix_width > 0 && matrix_height > 0,
			"matrix width and height must be greater than 0, got {matrix_width}x{matrix_height}"
		);
		precondition!(
			tile_width > 0 && tile_height > 0,
			"tile width and height must be greater than 0, got {tile_width}x{tile_height}"
		);
		let Some(matrix_set) = self.get_tile_matrix_set(tile_set)? else {
			bail_precondition!("Cannot add a tile matrix to a tile set with no tile matrix set")
		};
		let bbox = &matrix_set.bounding_box;
		self.add_tile_matrix(
			tile_set,
			zoom_level,
			matrix_width,
			matrix_height,
			tile_width,
			tile_height,
			bbox.width() / f64::from(matrix_width) / f64::from(tile_width),
			bbox.height() / f64::from(matrix_height) / f64::from(tile_height),
		)
	}

	/// Stores a tile at `(column, row)` of `tile_matrix`.
	#[context("adding tile [{column}, {row}] at zoom {} to '{}'", tile_matrix.zoom_level, tile_set.table_name)]
	pub fn add_tile(
		&self,
		tile_set: &TileSet,
		tile_matrix: &TileMatrix,
		column: i32,
		row: i32,
		image_data: &[u8],
	) -> Result<Tile> {
		precondition!(
			tile_matrix.table_name == tile_set.table_name,
			"tile matrix of '{}' does not belong to tile set '{}'",
			tile_matrix.table_name,
			tile_set.table_name
		);
		precondition!(!image_data.is_empty(), "Image data may not be null or empty");
		precondition!(
			(0..tile_matrix.matrix_height).contains(&row),
			"Tile row {row} is outside of the valid row range [0, {}] (0 to tile matrix metadata's matrix height - 1)",
			tile_matrix.matrix_height - 1
		);
		precondition!(
			(0..tile_matrix.matrix_width).contains(&column),
			"Tile column {column} is outside of the valid column range [0, {}] (0 to tile matrix metadata's matrix width - 1)",
			tile_matrix.matrix_width - 1
		);

		let sql = format!(
			"INSERT INTO {} (zoom_level, tile_column, tile_row, tile_data) VALUES (?1, ?2, ?3, ?4)",
			quote_identifier(&tile_set.table_name)
		);
		log::trace!("SQL: {sql}");
		let id = self.storage.transaction(|tx| {
			tx.execute(&sql, params![tile_matrix.zoom_level, column, row, image_data])?;
			Ok(tx.last_insert_rowid())
		})?;

		Tile::new(id, tile_matrix.zoom_level, column, row, image_data.to_vec())
	}

	/// Stores a tile at the address that contains `coordinate`.
	#[context("adding tile at {coordinate} to '{}'", tile_set.table_name)]
	pub fn add_tile_at(
		&self,
		tile_set: &TileSet,
		tile_matrix: &TileMatrix,
		coordinate: &CrsCoordinate,
		precision: u32,
		image_data: &[u8],
	) -> Result<Tile> {
		let address = self.crs_to_tile_address(tile_set, coordinate, precision, tile_matrix.zoom_level)?;
		self.add_tile(tile_set, tile_matrix, address.column, address.row, image_data)
	}

	#[context("getting tile {zoom_level}/{column}/{row} of '{}'", tile_set.table_name)]
	pub fn get_tile(&self, tile_set: &TileSet, zoom_level: i32, column: i32, row: i32) -> Result<Option<Tile>> {
		let mut tiles = self.storage.query_rows(
			&format!(
				"SELECT id, zoom_level, tile_column, tile_row, tile_data FROM {} WHERE zoom_level = ?1 AND tile_column = ?2 AND tile_row = ?3",
				quote_identifier(&tile_set.table_name)
			),
			[zoom_level, column, row],
			tile_from_row,
		)?;
		Ok(tiles.pop())
	}

	/// Returns the tile containing `coordinate` at `zoom_level`.
	pub fn get_tile_at(
		&self,
		tile_set: &TileSet,
		coordinate: &CrsCoordinate,
		precision: u32,
		zoom_level: i32,
	) -> Result<Option<Tile>> {
		let address = self.crs_to_tile_address(tile_set, coordinate, precision, zoom_level)?;
		self.get_tile(tile_set, zoom_level, address.column, address.row)
	}

	/// Lists the coordinates of all stored tiles, optionally of one zoom level
	/// only, ordered by zoom, column and row.
	#[context("listing tiles of '{}'", tile_set.table_name)]
	pub fn get_tiles(&self, tile_set: &TileSet, zoom_level: Option<i32>) -> Result<Vec<TileCoord>> {
		let table = quote_identifier(&tile_set.table_name);
		let map = |row: &Row<'_>| Ok(TileCoord::new(row.get(0)?, row.get(1)?, row.get(2)?));
		match zoom_level {
			Some(zoom_level) => self.storage.query_rows(
				&format!(
					"SELECT zoom_level, tile_column, tile_row FROM {table} WHERE zoom_level = ?1 ORDER BY zoom_level, tile_column, tile_row"
				),
				[zoom_level],
				map,
			),
			None => self.storage.query_rows(
				&format!("SELECT zoom_level, tile_column, tile_row FROM {table} ORDER BY zoom_level, tile_column, tile_row"),
				[],
				map,
			),
		}
	}

	/// Zoom levels that have at least one tile.
	#[context("getting zoom levels of '{}'", tile_set.table_name)]
	pub fn get_tile_zoom_levels(&self, tile_set: &TileSet) -> Result<BTreeSet<i32>> {
		let zooms = self.storage.query_column::<i32>(
			&format!(
				"SELECT DISTINCT zoom_level FROM {}",
				quote_identifier(&tile_set.table_name)
			),
			[],
		)?;
		Ok(zooms.into_iter().collect())
	}

	/// Looks up a tile set by its table name.
	///
	/// A contents row without bounds or `srs_id` falls back to the values of
	/// its tile matrix set.
	#[context("getting tile set '{table_name}'")]
	pub fn get_tile_set(&self, table_name: &str) -> Result<Option<TileSet>> {
		let Some(content) = self.catalog().get_content(table_name)? else {
			return Ok(None);
		};
		if content.data_type != "tiles" {
			return Ok(None);
		}

		let fallback = match (content.bounding_box, content.srs_id) {
			(Some(_), Some(_)) => None,
			_ => self.get_tile_matrix_set_by_name(table_name)?,
		};
		let Some(bounding_box) = content
			.bounding_box
			.or_else(|| fallback.as_ref().map(|s| s.bounding_box))
		else {
			bail!("tile set '{table_name}' has neither a bounding box nor a tile matrix set");
		};
		let Some(srs_id) = content.srs_id.or_else(|| fallback.as_ref().map(|s| s.srs_id)) else {
			bail!("tile set '{table_name}' has neither an srs_id nor a tile matrix set");
		};

		Ok(Some(TileSet {
			table_name: content.table_name,
			identifier: content.identifier.unwrap_or_default(),
			description: content.description.unwrap_or_default(),
			last_change: content.last_change,
			bounding_box,
			srs_id,
		}))
	}

	/// Lists all tile sets, optionally only those in reference system `srs`.
	#[context("listing tile sets")]
	pub fn get_tile_sets(&self, srs: Option<&SpatialReferenceSystem>) -> Result<Vec<TileSet>> {
		if !self.storage.table_or_view_exists(crate::CONTENTS_TABLE)? {
			return Ok(vec![]);
		}
		let names = match srs {
			Some(srs) => self.storage.query_column::<String>(
				"SELECT table_name FROM gpkg_contents WHERE data_type = 'tiles' AND srs_id = ?1 ORDER BY table_name",
				[srs.srs_id],
			)?,
			None => self.storage.query_column::<String>(
				"SELECT table_name FROM gpkg_contents WHERE data_type = 'tiles' ORDER BY table_name",
				[],
			)?,
		};
		let mut tile_sets = Vec::with_capacity(names.len());
		for name in names {
			if let Some(tile_set) = self.get_tile_set(&name)? {
				tile_sets.push(tile_set);
			}
		}
		Ok(tile_sets)
	}

	pub fn get_tile_matrix_set(&self, tile_set: &TileSet) -> Result<Option<TileMatrixSet>> {
		self.get_tile_matrix_set_by_name(&tile_set.table_name)
	}

	#[context("getting tile matrix set of '{table_name}'")]
	fn get_tile_matrix_set_by_name(&self, table_name: &str) -> Result<Option<TileMatrixSet>> {
		if !self.storage.table_or_view_exists(TILE_MATRIX_SET_TABLE)? {
			return Ok(None);
		}
		let mut sets = self.storage.query_rows(
			"SELECT table_name, srs_id, min_x, min_y, max_x, max_y FROM gpkg_tile_matrix_set WHERE table_name = ?1",
			[table_name],
			|row| {
				Ok(TileMatrixSet {
					table_name: row.get(0)?,
					srs_id: row.get(1)?,
					bounding_box: BoundingBox {
						min_x: row.get(2)?,
						min_y: row.get(3)?,
						max_x: row.get(4)?,
						max_y: row.get(5)?,
					},
				})
			},
		)?;
		Ok(sets.pop())
	}

	#[context("getting tile matrix {zoom_level} of '{}'", tile_set.table_name)]
	pub fn get_tile_matrix(&self, tile_set: &TileSet, zoom_level: i32) -> Result<Option<TileMatrix>> {
		if !self.storage.table_or_view_exists(TILE_MATRIX_TABLE)? {
			return Ok(None);
		}
		let mut matrices = self.storage.query_rows(
			&format!("{SELECT_TILE_MATRIX} WHERE table_name = ?1 AND zoom_level = ?2"),
			params![tile_set.table_name, zoom_level],
			tile_matrix_from_row,
		)?;
		Ok(matrices.pop())
	}

	/// All tile matrices of `tile_set`, ordered by zoom level.
	#[context("getting tile matrices of '{}'", tile_set.table_name)]
	pub fn get_tile_matrices(&self, tile_set: &TileSet) -> Result<Vec<TileMatrix>> {
		if !self.storage.table_or_view_exists(TILE_MATRIX_TABLE)? {
			return Ok(vec![]);
		}
		self.storage.query_rows(
			&format!("{SELECT_TILE_MATRIX} WHERE table_name = ?1 ORDER BY zoom_level"),
			[&tile_set.table_name],
			tile_matrix_from_row,
		)
	}

	/// Converts a coordinate in the reference system of `tile_set` to the
	/// address of the tile containing it at `zoom_level`.
	#[context("locating {coordinate} in '{}' at zoom {zoom_level}", tile_set.table_name)]
	pub fn crs_to_tile_address(
		&self,
		tile_set: &TileSet,
		coordinate: &CrsCoordinate,
		precision: u32,
		zoom_level: i32,
	) -> Result<TileAddress> {
		let (crs, matrix_set, matrix) = self.pyramid(tile_set, zoom_level)?;
		transform::to_tile_address(tile_set, &crs, &matrix_set, &matrix, coordinate, precision)
	}

	/// Returns the upper left corner of the tile at `(column, row)`.
	#[context("converting tile {zoom_level}/{column}/{row} of '{}' to a coordinate", tile_set.table_name)]
	pub fn tile_to_crs_coordinate(
		&self,
		tile_set: &TileSet,
		column: i32,
		row: i32,
		zoom_level: i32,
	) -> Result<CrsCoordinate> {
		let (crs, matrix_set, matrix) = self.pyramid(tile_set, zoom_level)?;
		transform::to_coordinate(tile_set, &crs, &matrix_set, &matrix, column, row)
	}

	fn pyramid(
		&self,
		tile_set: &TileSet,
		zoom_level: i32,
	) -> Result<(CoordinateReferenceSystem, TileMatrixSet, TileMatrix)> {
		let Some(srs) = self.catalog().get_spatial_reference_system(tile_set.srs_id)? else {
			bail_precondition!(
				"spatial reference system {} of tile set '{}' is not defined",
				tile_set.srs_id,
				tile_set.table_name
			)
		};
		let Some(matrix) = self.get_tile_matrix(tile_set, zoom_level)? else {
			bail_precondition!("Invalid zoom level for this tile set")
		};
		let Some(matrix_set) = self.get_tile_matrix_set(tile_set)? else {
			bail_precondition!("tile set '{}' has no tile matrix set", tile_set.table_name)
		};
		Ok((srs.crs()?, matrix_set, matrix))
	}
}

fn now_timestamp() -> Result<String> {
	let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");
	Ok(OffsetDateTime::now_utc().format(format)?)
}

fn tile_from_row(row: &Row<'_>) -> r2d2_sqlite::rusqlite::Result<Tile> {
	Ok(Tile {
		id: row.get(0)?,
		zoom_level: row.get(1)?,
		column: row.get(2)?,
		row: row.get(3)?,
		image_data: row.get(4)?,
	})
}

fn tile_matrix_from_row(row: &Row<'_>) -> r2d2_sqlite::rusqlite::Result<TileMatrix> {
	Ok(TileMatrix {
		table_name: row.get(0)?,
		zoom_level: row.get(1)?,
		matrix_width: row.get(2)?,
		matrix_height: row.get(3)?,
		tile_width: row.get(4)?,
		tile_height: row.get(5)?,
		pixel_x_size: row.get(6)?,
		pixel_y_size: row.get(7)?,
	})
}
