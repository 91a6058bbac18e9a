//! Conversion between coordinates in a tile set's reference system and tile
//! addresses inside one of its tile matrices.
//!
//! All functions are pure: the caller fetches the tile set, its tile matrix
//! set, the tile matrix and the reference system beforehand.
//!
//! # Example
//!
//! ```
//! use gpkgtiles_core::{transform, *};
//!
//! let bbox = BoundingBox::new(0.0, 0.0, 30.0, 50.0).unwrap();
//! let wgs84 = CoordinateReferenceSystem::new("EPSG", 4326).unwrap();
//! let tile_set = TileSet::new("tiles", "tiles", "", "", bbox, 4326).unwrap();
//! let matrix_set = TileMatrixSet::new("tiles", 4326, bbox).unwrap();
//! let matrix = TileMatrix::new("tiles", 15, 2, 2, 256, 256, 15.0 / 256.0, 25.0 / 256.0).unwrap();
//!
//! let coordinate = CrsCoordinate::new(20.0, 0.01, wgs84.clone());
//! let address = transform::to_tile_address(&tile_set, &wgs84, &matrix_set, &matrix, &coordinate, 7).unwrap();
//! assert_eq!(address, TileAddress::new(1, 1));
//! ```

use crate::{
	BoundingBox, CoordinateReferenceSystem, CrsCoordinate, GEOPACKAGE_TILE_ORIGIN, TileAddress, TileMatrix,
	TileMatrixSet, TileOrigin, TileSet, precondition,
};
use anyhow::Result;
use gpkgtiles_derive::context;

/// Rounds `bbox` outward to `precision` decimal digits.
pub fn round_bounds(bbox: &BoundingBox, precision: u32) -> BoundingBox {
	bbox.round_outward(precision)
}

/// Finds the tile of `matrix` that contains `coordinate`.
///
/// The tile matrix set box is rounded outward to `precision` digits before the
/// containment check, so coordinates on its border are accepted. A coordinate
/// on an internal tile border belongs to the tile farther away from the
/// origin; coordinates on the far outer border belong to the last column or
/// row.
#[context("converting {coordinate} to a tile address in '{}'", tile_set.table_name)]
pub fn to_tile_address(
	tile_set: &TileSet,
	crs: &CoordinateReferenceSystem,
	matrix_set: &TileMatrixSet,
	matrix: &TileMatrix,
	coordinate: &CrsCoordinate,
	precision: u32,
) -> Result<TileAddress> {
	check_pyramid(tile_set, matrix_set, matrix)?;
	precondition!(
		&coordinate.crs == crs,
		"coordinate reference system {} does not match {crs} of tile set '{}'",
		coordinate.crs,
		tile_set.table_name
	);
	coordinate_to_address(
		&matrix_set.bounding_box,
		matrix,
		coordinate.x,
		coordinate.y,
		precision,
		GEOPACKAGE_TILE_ORIGIN,
	)
}

/// Returns the corner of tile `(column, row)` that faces the origin, i.e. its
/// upper left corner in a GeoPackage.
///
/// Only negative indices are rejected; addresses beyond the matrix produce
/// coordinates outside of the tile matrix set box.
#[context("converting tile [{column}, {row}] of '{}' to a coordinate", tile_set.table_name)]
pub fn to_coordinate(
	tile_set: &TileSet,
	crs: &CoordinateReferenceSystem,
	matrix_set: &TileMatrixSet,
	matrix: &TileMatrix,
	column: i32,
	row: i32,
) -> Result<CrsCoordinate> {
	check_pyramid(tile_set, matrix_set, matrix)?;
	let (x, y) = address_to_coordinate(&matrix_set.bounding_box, matrix, column, row, GEOPACKAGE_TILE_ORIGIN)?;
	Ok(CrsCoordinate::new(x, y, crs.clone()))
}

fn check_pyramid(tile_set: &TileSet, matrix_set: &TileMatrixSet, matrix: &TileMatrix) -> Result<()> {
	precondition!(
		matrix_set.table_name == tile_set.table_name,
		"tile matrix set of '{}' does not belong to tile set '{}'",
		matrix_set.table_name,
		tile_set.table_name
	);
	precondition!(
		matrix.table_name == tile_set.table_name,
		"tile matrix of '{}' does not belong to tile set '{}'",
		matrix.table_name,
		tile_set.table_name
	);
	precondition!(
		matrix_set.srs_id == tile_set.srs_id,
		"tile matrix set srs_id {} differs from srs_id {} of tile set '{}'",
		matrix_set.srs_id,
		tile_set.srs_id,
		tile_set.table_name
	);
	Ok(())
}

/// Origin-independent forward conversion.
pub fn coordinate_to_address(
	bbox: &BoundingBox,
	matrix: &TileMatrix,
	x: f64,
	y: f64,
	precision: u32,
	origin: TileOrigin,
) -> Result<TileAddress> {
	let bounds = round_bounds(bbox, precision);
	precondition!(
		bounds.contains(x, y),
		"coordinate ({x}, {y}) is outside of the tile matrix set bounds {bounds}"
	);

	let (corner_x, corner_y) = origin.corner_of(&bounds);
	let column = ((x - corner_x).abs() / matrix.tile_width_in_srs()).floor();
	let row = ((y - corner_y).abs() / matrix.tile_height_in_srs()).floor();

	Ok(TileAddress::new(
		clamp_index(column, matrix.matrix_width),
		clamp_index(row, matrix.matrix_height),
	))
}

/// Origin-independent inverse conversion.
pub fn address_to_coordinate(
	bbox: &BoundingBox,
	matrix: &TileMatrix,
	column: i32,
	row: i32,
	origin: TileOrigin,
) -> Result<(f64, f64)> {
	precondition!(column >= 0, "tile column must be 0 or greater, got {column}");
	precondition!(row >= 0, "tile row must be 0 or greater, got {row}");

	let (corner_x, corner_y) = origin.corner_of(bbox);
	Ok((
		corner_x + origin.column_direction() * f64::from(column) * matrix.tile_width_in_srs(),
		corner_y + origin.row_direction() * f64::from(row) * matrix.tile_height_in_srs(),
	))
}

// the far outer border and the rounding margin yield `size`
fn clamp_index(value: f64, size: i32) -> i32 {
	(value as i32).clamp(0, size - 1)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ErrorKind;
	use approx::assert_relative_eq;
	use rstest::rstest;

	struct Pyramid {
		crs: CoordinateReferenceSystem,
		tile_set: TileSet,
		matrix_set: TileMatrixSet,
		matrix: TileMatrix,
	}

	impl Pyramid {
		fn new() -> Pyramid {
			let bbox = BoundingBox::new(0.0, 0.0, 30.0, 50.0).unwrap();
			Pyramid {
				crs: CoordinateReferenceSystem::new("EPSG", 4326).unwrap(),
				tile_set: TileSet::new("tiles", "tiles", "", "", bbox, 4326).unwrap(),
				matrix_set: TileMatrixSet::new("tiles", 4326, bbox).unwrap(),
				matrix: TileMatrix::new("tiles", 15, 2, 2, 256, 256, 15.0 / 256.0, 25.0 / 256.0).unwrap(),
			}
		}

		fn address(&self, x: f64, y: f64) -> Result<TileAddress> {
			let coordinate = CrsCoordinate::new(x, y, self.crs.clone());
			to_tile_address(&self.tile_set, &self.crs, &self.matrix_set, &self.matrix, &coordinate, 7)
		}

		fn coordinate(&self, column: i32, row: i32) -> Result<CrsCoordinate> {
			to_coordinate(&self.tile_set, &self.crs, &self.matrix_set, &self.matrix, column, row)
		}
	}

	#[rstest]
	#[case(29.9, 30.0, 1, 0)]
	#[case(0.0, 40.0, 0, 0)]
	#[case(20.0, 0.01, 1, 1)]
	#[case(20.0, 50.0, 1, 0)]
	// internal borders belong to the tile away from the origin
	#[case(15.0, 25.0, 1, 1)]
	fn coordinate_to_tile(#[case] x: f64, #[case] y: f64, #[case] column: i32, #[case] row: i32) -> Result<()> {
		assert_eq!(Pyramid::new().address(x, y)?, TileAddress::new(column, row));
		Ok(())
	}

	#[rstest]
	#[case(0.0, 50.0, 0, 0)]
	#[case(30.0, 50.0, 1, 0)]
	#[case(0.0, 0.0, 0, 1)]
	#[case(30.0, 0.0, 1, 1)]
	fn corners_map_to_corner_tiles(#[case] x: f64, #[case] y: f64, #[case] column: i32, #[case] row: i32) -> Result<()> {
		assert_eq!(Pyramid::new().address(x, y)?, TileAddress::new(column, row));
		Ok(())
	}

	#[test]
	fn rounding_margin_is_inside() -> Result<()> {
		let mut pyramid = Pyramid::new();
		pyramid.matrix_set.bounding_box = BoundingBox::new(0.00000001, 0.0, 29.99999999, 50.0)?;
		assert_eq!(pyramid.address(30.0, 0.0)?, TileAddress::new(1, 1));
		assert_eq!(pyramid.address(0.0, 50.0)?, TileAddress::new(0, 0));

		let pyramid = Pyramid::new();
		let err = pyramid.address(30.001, 0.0).unwrap_err();
		assert_eq!(ErrorKind::of(&err), ErrorKind::Precondition);
		assert_eq!(
			err.root_cause().to_string(),
			"coordinate (30.001, 0) is outside of the tile matrix set bounds [0, 0, 30, 50]"
		);
		Ok(())
	}

	#[test]
	fn round_trip_within_tile() -> Result<()> {
		let pyramid = Pyramid::new();
		for column in 0..2 {
			for row in 0..2 {
				let corner = pyramid.coordinate(column, row)?;
				let (x, y) = (corner.x + 7.5, corner.y - 12.5);
				let address = pyramid.address(x, y)?;
				assert_eq!(address, TileAddress::new(column, row));
				assert_eq!(pyramid.coordinate(address.column, address.row)?, corner);
			}
		}
		Ok(())
	}

	#[test]
	fn inverse_has_no_upper_bound() -> Result<()> {
		let pyramid = Pyramid::new();
		let coordinate = pyramid.coordinate(5, 3)?;
		assert_relative_eq!(coordinate.x, 75.0);
		assert_relative_eq!(coordinate.y, -25.0);
		assert_eq!(coordinate.crs, pyramid.crs);

		let err = pyramid.coordinate(-1, 0).unwrap_err();
		assert_eq!(err.root_cause().to_string(), "tile column must be 0 or greater, got -1");
		assert_eq!(
			format!("{err:#}"),
			"converting tile [-1, 0] of 'tiles' to a coordinate: tile column must be 0 or greater, got -1"
		);
		Ok(())
	}

	#[test]
	fn crs_mismatch() {
		let pyramid = Pyramid::new();
		let mercator = CoordinateReferenceSystem::new("EPSG", 3857).unwrap();
		let coordinate = CrsCoordinate::new(10.0, 10.0, mercator);
		let err = to_tile_address(
			&pyramid.tile_set,
			&pyramid.crs,
			&pyramid.matrix_set,
			&pyramid.matrix,
			&coordinate,
			7,
		)
		.unwrap_err();
		assert_eq!(ErrorKind::of(&err), ErrorKind::Precondition);
		assert_eq!(
			err.root_cause().to_string(),
			"coordinate reference system EPSG:3857 does not match EPSG:4326 of tile set 'tiles'"
		);
	}

	#[test]
	fn authority_case_is_ignored() -> Result<()> {
		let pyramid = Pyramid::new();
		let coordinate = CrsCoordinate::new(0.0, 40.0, CoordinateReferenceSystem::new("epsg", 4326)?);
		let address = to_tile_address(
			&pyramid.tile_set,
			&pyramid.crs,
			&pyramid.matrix_set,
			&pyramid.matrix,
			&coordinate,
			7,
		)?;
		assert_eq!(address, TileAddress::new(0, 0));
		Ok(())
	}

	#[test]
	fn foreign_tile_matrix() {
		let mut pyramid = Pyramid::new();
		pyramid.matrix.table_name = "other".to_string();
		let err = pyramid.address(1.0, 1.0).unwrap_err();
		assert_eq!(
			err.root_cause().to_string(),
			"tile matrix of 'other' does not belong to tile set 'tiles'"
		);
	}

	#[rstest]
	#[case(TileOrigin::UpperLeft, 1, 0)]
	#[case(TileOrigin::LowerLeft, 1, 1)]
	#[case(TileOrigin::UpperRight, 0, 0)]
	#[case(TileOrigin::LowerRight, 0, 1)]
	fn other_origins(#[case] origin: TileOrigin, #[case] column: i32, #[case] row: i32) -> Result<()> {
		let pyramid = Pyramid::new();
		let bbox = pyramid.matrix_set.bounding_box;
		let address = coordinate_to_address(&bbox, &pyramid.matrix, 29.9, 30.0, 7, origin)?;
		assert_eq!(address, TileAddress::new(column, row));

		let (x, y) = address_to_coordinate(&bbox, &pyramid.matrix, column, row, origin)?;
		let (x, y) = (x + origin.column_direction(), y + origin.row_direction());
		let back = coordinate_to_address(&bbox, &pyramid.matrix, x, y, 7, origin)?;
		assert_eq!(back, address);
		Ok(())
	}
}
