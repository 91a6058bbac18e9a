use crate::{precondition, validate_table_name};
use anyhow::Result;

/// One zoom level of a tile pyramid, a row of `gpkg_tile_matrix`.
#[derive(Clone, Debug, PartialEq)]
pub struct TileMatrix {
	pub table_name: String,
	pub zoom_level: i32,
	/// Number of tile columns.
	pub matrix_width: i32,
	/// Number of tile rows.
	pub matrix_height: i32,
	/// Tile width in pixels.
	pub tile_width: i32,
	/// Tile height in pixels.
	pub tile_height: i32,
	/// Width of one pixel in SRS units.
	pub pixel_x_size: f64,
	/// Height of one pixel in SRS units.
	pub pixel_y_size: f64,
}

impl TileMatrix {
	#[allow(clippy::too_many_arguments)]
	pub fn new(
		table_name: &str,
		zoom_level: i32,
		matrix_width: i32,
		matrix_height: i32,
		tile_width: i32,
		tile_height: i32,
		pixel_x_size: f64,
		pixel_y_size: f64,
	) -> Result<TileMatrix> {
		validate_table_name(table_name)?;
		precondition!(zoom_level >= 0, "zoom level must be 0 or greater, got {zoom_level}");
		precondition!(
			matrix_width > 0 && matrix_height > 0,
			"matrix width and height must be greater than 0, got {matrix_width}x{matrix_height}"
		);
		precondition!(
			tile_width > 0 && tile_height > 0,
			"tile width and height must be greater than 0, got {tile_width}x{tile_height}"
		);
		precondition!(
			pixel_x_size.is_finite() && pixel_x_size > 0.0,
			"pixel x size must be a finite value greater than 0, got {pixel_x_size}"
		);
		precondition!(
			pixel_y_size.is_finite() && pixel_y_size > 0.0,
			"pixel y size must be a finite value greater than 0, got {pixel_y_size}"
		);
		Ok(TileMatrix {
			table_name: table_name.to_string(),
			zoom_level,
			matrix_width,
			matrix_height,
			tile_width,
			tile_height,
			pixel_x_size,
			pixel_y_size,
		})
	}

	/// Width of one tile in SRS units.
	pub fn tile_width_in_srs(&self) -> f64 {
		self.pixel_x_size * f64::from(self.tile_width)
	}

	/// Height of one tile in SRS units.
	pub fn tile_height_in_srs(&self) -> f64 {
		self.pixel_y_size * f64::from(self.tile_height)
	}

	/// Width covered by the whole matrix in SRS units.
	pub fn width_in_srs(&self) -> f64 {
		f64::from(self.matrix_width) * self.tile_width_in_srs()
	}

	pub fn height_in_srs(&self) -> f64 {
		f64::from(self.matrix_height) * self.tile_height_in_srs()
	}

	pub fn contains_address(&self, column: i32, row: i32) -> bool {
		(0..self.matrix_width).contains(&column) && (0..self.matrix_height).contains(&row)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_relative_eq;
	use rstest::rstest;

	#[test]
	fn sizes_in_srs() -> Result<()> {
		let matrix = TileMatrix::new("tiles", 15, 2, 2, 256, 256, 15.0 / 256.0, 25.0 / 256.0)?;
		assert_relative_eq!(matrix.tile_width_in_srs(), 15.0);
		assert_relative_eq!(matrix.tile_height_in_srs(), 25.0);
		assert_relative_eq!(matrix.width_in_srs(), 30.0);
		assert_relative_eq!(matrix.height_in_srs(), 50.0);
		assert!(matrix.contains_address(1, 1));
		assert!(!matrix.contains_address(2, 0));
		assert!(!matrix.contains_address(0, -1));
		Ok(())
	}

	#[rstest]
	#[case(-1, 1, 1, 1.0, "zoom level must be 0 or greater, got -1")]
	#[case(0, 0, 1, 1.0, "matrix width and height must be greater than 0, got 0x1")]
	#[case(0, 1, 0, 1.0, "tile width and height must be greater than 0, got 0x1")]
	#[case(0, 1, 1, 0.0, "pixel x size must be a finite value greater than 0, got 0")]
	#[case(0, 1, 1, f64::INFINITY, "pixel x size must be a finite value greater than 0, got inf")]
	fn invalid(#[case] zoom: i32, #[case] matrix_size: i32, #[case] tile_size: i32, #[case] pixel_x: f64, #[case] message: &str) {
		let err = TileMatrix::new("tiles", zoom, matrix_size, 1, tile_size, 1, pixel_x, 1.0).unwrap_err();
		assert_eq!(err.to_string(), message);
	}
}
