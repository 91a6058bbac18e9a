use super::table_definition::{PYRAMID_TABLE_DEFINITION, verify_table};
use crate::{CONTENTS_TABLE, StorageView, TILE_MATRIX_SET_TABLE, TILE_MATRIX_TABLE};
use anyhow::Result;
use gpkgtiles_core::VerificationLevel;
use gpkgtiles_derive::context;

/// Facts about a GeoPackage that most rules depend on, collected once per
/// verification run.
#[derive(Debug)]
pub struct VerificationContext<'a> {
	pub storage: &'a StorageView,
	pub level: VerificationLevel,
	/// Tables and views outside the `gpkg_` namespace that match the pyramid
	/// table definition.
	pub pyramid_tables: Vec<String>,
	/// `gpkg_contents` rows with `data_type = 'tiles'`.
	pub contents_tile_tables: Vec<String>,
	pub has_tile_matrix_set_table: bool,
	pub has_tile_matrix_table: bool,
	/// Distinct `gpkg_tile_matrix.table_name` values naming an existing table.
	pub tile_matrix_pyramid_tables: Vec<String>,
}

impl<'a> VerificationContext<'a> {
	#[context("collecting the verification context of '{}'", storage.name())]
	pub fn new(storage: &'a StorageView, level: VerificationLevel) -> Result<VerificationContext<'a>> {
		let candidates = storage.query_column::<String>(
			"SELECT tbl_name FROM sqlite_master WHERE tbl_name NOT LIKE 'gpkg_%' AND tbl_name NOT LIKE 'sqlite_%' AND (type = 'table' OR type = 'view') ORDER BY tbl_name",
			[],
		)?;
		let pyramid_tables = candidates
			.into_iter()
			.filter(|name| match verify_table(storage, name, &PYRAMID_TABLE_DEFINITION) {
				Ok(messages) => messages.is_empty(),
				Err(err) => {
					log::debug!("'{name}' is not a tile pyramid table: {err:#}");
					false
				}
			})
			.collect::<Vec<_>>();

		let contents_tile_tables = if storage.table_or_view_exists(CONTENTS_TABLE)? {
			storage.query_column::<String>(
				"SELECT table_name FROM gpkg_contents WHERE data_type = 'tiles' ORDER BY table_name",
				[],
			)?
		} else {
			vec![]
		};

		let has_tile_matrix_set_table = storage.table_or_view_exists(TILE_MATRIX_SET_TABLE)?;
		let has_tile_matrix_table = storage.table_or_view_exists(TILE_MATRIX_TABLE)?;

		let mut tile_matrix_pyramid_tables = vec![];
		if has_tile_matrix_table {
			for name in storage.query_column::<String>(
				"SELECT DISTINCT table_name FROM gpkg_tile_matrix ORDER BY table_name",
				[],
			)? {
				if storage.table_or_view_exists(&name)? {
					tile_matrix_pyramid_tables.push(name);
				}
			}
		}

		log::debug!(
			"pyramid tables: {pyramid_tables:?}, tiles in contents: {contents_tile_tables:?}, tile matrix tables: {tile_matrix_pyramid_tables:?}"
		);

		Ok(VerificationContext {
			storage,
			level,
			pyramid_tables,
			contents_tile_tables,
			has_tile_matrix_set_table,
			has_tile_matrix_table,
			tile_matrix_pyramid_tables,
		})
	}

	pub fn has_pyramids(&self) -> bool {
		!self.pyramid_tables.is_empty()
	}

	pub fn is_contents_tile_table(&self, table_name: &str) -> bool {
		self.contents_tile_tables.iter().any(|t| t == table_name)
	}
}
