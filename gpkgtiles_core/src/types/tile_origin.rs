use crate::BoundingBox;
use std::fmt::Display;

/// The corner of a bounding box where tile `(0, 0)` sits.
///
/// GeoPackage fixes the origin at the upper left; the other corners exist so
/// the transform functions stay general.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TileOrigin {
	#[default]
	UpperLeft,
	LowerLeft,
	UpperRight,
	LowerRight,
}

/// The origin every GeoPackage tile pyramid uses.
pub const GEOPACKAGE_TILE_ORIGIN: TileOrigin = TileOrigin::UpperLeft;

impl TileOrigin {
	pub fn as_str(&self) -> &str {
		match self {
			TileOrigin::UpperLeft => "upper left",
			TileOrigin::LowerLeft => "lower left",
			TileOrigin::UpperRight => "upper right",
			TileOrigin::LowerRight => "lower right",
		}
	}

	/// The box corner that tile `(0, 0)` touches.
	pub fn corner_of(&self, bbox: &BoundingBox) -> (f64, f64) {
		match self {
			TileOrigin::UpperLeft => bbox.top_left(),
			TileOrigin::LowerLeft => bbox.bottom_left(),
			TileOrigin::UpperRight => bbox.top_right(),
			TileOrigin::LowerRight => bbox.bottom_right(),
		}
	}

	/// Sign of the x change when the column index grows.
	pub fn column_direction(&self) -> f64 {
		match self {
			TileOrigin::UpperLeft | TileOrigin::LowerLeft => 1.0,
			TileOrigin::UpperRight | TileOrigin::LowerRight => -1.0,
		}
	}

	/// Sign of the y change when the row index grows.
	pub fn row_direction(&self) -> f64 {
		match self {
			TileOrigin::UpperLeft | TileOrigin::UpperRight => -1.0,
			TileOrigin::LowerLeft | TileOrigin::LowerRight => 1.0,
		}
	}
}

impl Display for TileOrigin {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
