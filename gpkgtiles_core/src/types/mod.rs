//! The pyramid model: bounding boxes, reference systems, tile sets, tile matrices and tiles.

mod bounding_box;
pub use bounding_box::*;

mod crs;
pub use crs::*;

mod spatial_reference_system;
pub use spatial_reference_system::*;

mod table_name;
pub use table_name::*;

mod tile;
pub use tile::*;

mod tile_matrix;
pub use tile_matrix::*;

mod tile_matrix_set;
pub use tile_matrix_set::*;

mod tile_origin;
pub use tile_origin::*;

mod tile_set;
pub use tile_set::*;
