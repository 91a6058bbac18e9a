use crate::precondition;
use anyhow::Result;
use std::fmt::{Debug, Display};

/// A stored tile: one row of a pyramid user data table.
#[derive(Clone, PartialEq, Eq)]
pub struct Tile {
	pub id: i64,
	pub zoom_level: i32,
	pub column: i32,
	pub row: i32,
	pub image_data: Vec<u8>,
}

impl Tile {
	pub fn new(id: i64, zoom_level: i32, column: i32, row: i32, image_data: Vec<u8>) -> Result<Tile> {
		precondition!(!image_data.is_empty(), "tile image data may not be empty");
		Ok(Tile {
			id,
			zoom_level,
			column,
			row,
			image_data,
		})
	}

	pub fn coord(&self) -> TileCoord {
		TileCoord::new(self.zoom_level, self.column, self.row)
	}
}

impl Debug for Tile {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Tile")
			.field("id", &self.id)
			.field("coord", &self.coord())
			.field("image_data", &format_args!("{} bytes", self.image_data.len()))
			.finish()
	}
}

/// Column and row of a tile inside one tile matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileAddress {
	pub column: i32,
	pub row: i32,
}

impl TileAddress {
	pub fn new(column: i32, row: i32) -> TileAddress {
		TileAddress { column, row }
	}
}

impl Display for TileAddress {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "[{}, {}]", self.column, self.row)
	}
}

/// Zoom level, column and row of a tile. Sorts by zoom, then column, then row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
	pub zoom_level: i32,
	pub column: i32,
	pub row: i32,
}

impl TileCoord {
	pub fn new(zoom_level: i32, column: i32, row: i32) -> TileCoord {
		TileCoord { zoom_level, column, row }
	}

	pub fn address(&self) -> TileAddress {
		TileAddress::new(self.column, self.row)
	}
}

impl Display for TileCoord {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}/{}/{}", self.zoom_level, self.column, self.row)
	}
}
