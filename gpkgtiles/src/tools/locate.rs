use anyhow::{Result, bail};
use clap::Args;
use gpkgtiles_container::{Config, GeoPackage};
use gpkgtiles_core::{CrsCoordinate, VerificationLevel};
use std::path::PathBuf;

#[derive(Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true, allow_negative_numbers = true)]
pub struct Subcommand {
	/// GeoPackage file
	#[arg(required = true)]
	filename: PathBuf,

	/// name of the tile pyramid table
	#[arg(required = true)]
	table: String,

	/// zoom level
	#[arg(required = true)]
	zoom: i32,

	/// x coordinate in the reference system of the tile set
	#[arg(required = true)]
	x: f64,

	/// y coordinate in the reference system of the tile set
	#[arg(required = true)]
	y: f64,

	/// decimal digits the tile matrix set bounds are rounded to
	#[arg(long, short)]
	precision: Option<u32>,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	let config = Config::default().with_verification_level(VerificationLevel::None);
	let gpkg = GeoPackage::open(&arguments.filename, &config)?;
	println!("{}", locate(&gpkg, arguments)?);
	Ok(())
}

fn locate(gpkg: &GeoPackage, arguments: &Subcommand) -> Result<String> {
	let tiles = gpkg.tiles();
	let Some(tile_set) = tiles.get_tile_set(&arguments.table)? else {
		bail!("tile set '{}' not found in {:?}", arguments.table, arguments.filename)
	};
	let Some(srs) = gpkg.catalog().get_spatial_reference_system(tile_set.srs_id)? else {
		bail!("spatial reference system {} of '{}' is not defined", tile_set.srs_id, tile_set.table_name)
	};

	let precision = arguments.precision.unwrap_or(gpkg.config().default_precision);
	let coordinate = CrsCoordinate::new(arguments.x, arguments.y, srs.crs()?);
	let address = tiles.crs_to_tile_address(&tile_set, &coordinate, precision, arguments.zoom)?;
	let corner = tiles.tile_to_crs_coordinate(&tile_set, address.column, address.row, arguments.zoom)?;
	let stored = tiles
		.get_tile(&tile_set, arguments.zoom, address.column, address.row)?
		.is_some();

	Ok(format!(
		"tile {}/{}/{}, upper left corner {corner}, {}",
		arguments.zoom,
		address.column,
		address.row,
		if stored { "stored" } else { "not stored" }
	))
}
