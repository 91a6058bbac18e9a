use anyhow::Result;
use clap::Args;
use gpkgtiles_container::{Config, GeoPackage};
use gpkgtiles_core::VerificationLevel;
use itertools::Itertools;
use std::{fmt::Write, path::PathBuf};

#[derive(Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// GeoPackage file you want to probe
	#[arg(required = true)]
	filename: PathBuf,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	eprintln!("probe {:?}", arguments.filename);

	let config = Config::default().with_verification_level(VerificationLevel::None);
	let gpkg = GeoPackage::open(&arguments.filename, &config)?;
	print!("{}", describe(&gpkg)?);
	Ok(())
}

/// Lists every tile set with its reference system, bounds and tile matrices.
fn describe(gpkg: &GeoPackage) -> Result<String> {
	let tiles = gpkg.tiles();
	let catalog = gpkg.catalog();
	let mut text = String::new();

	let tile_sets = tiles.get_tile_sets(None)?;
	if tile_sets.is_empty() {
		writeln!(text, "no tile sets")?;
	}

	for tile_set in tile_sets {
		writeln!(text, "tile set '{}'", tile_set.table_name)?;
		if !tile_set.identifier.is_empty() {
			writeln!(text, "  identifier: {}", tile_set.identifier)?;
		}
		match catalog.get_spatial_reference_system(tile_set.srs_id)? {
			Some(srs) => writeln!(text, "  srs: {} ({}:{})", srs.name, srs.organization, srs.organization_srs_id)?,
			None => writeln!(text, "  srs: {} (undefined)", tile_set.srs_id)?,
		}
		writeln!(text, "  bounding box: {}", tile_set.bounding_box)?;

		let zoom_levels = tiles.get_tile_zoom_levels(&tile_set)?;
		writeln!(text, "  zoom levels with tiles: [{}]", zoom_levels.iter().join(", "))?;

		for matrix in tiles.get_tile_matrices(&tile_set)? {
			let count = tiles.get_tiles(&tile_set, Some(matrix.zoom_level))?.len();
			writeln!(
				text,
				"  zoom {}: {}x{} tiles of {}x{} px, {} stored",
				matrix.zoom_level, matrix.matrix_width, matrix.matrix_height, matrix.tile_width, matrix.tile_height, count
			)?;
		}
	}
	Ok(text)
}
