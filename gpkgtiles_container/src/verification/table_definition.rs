//! Expected schemas of the tile tables and the comparison against the schema
//! SQLite reports through its `pragma_*` table-valued functions.

use crate::StorageView;
use anyhow::Result;
use gpkgtiles_derive::context;
use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDefinition {
	pub name: &'static str,
	pub sql_type: &'static str,
	pub not_null: bool,
	pub primary_key: bool,
}

impl ColumnDefinition {
	const fn new(name: &'static str, sql_type: &'static str, not_null: bool, primary_key: bool) -> Self {
		ColumnDefinition {
			name,
			sql_type,
			not_null,
			primary_key,
		}
	}
}

/// `from` of the checked table references `table.to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ForeignKeyDefinition {
	pub table: &'static str,
	pub from: &'static str,
	pub to: &'static str,
}

#[derive(Debug)]
pub struct TableDefinition {
	pub columns: &'static [ColumnDefinition],
	pub foreign_keys: &'static [ForeignKeyDefinition],
	pub unique_groups: &'static [&'static [&'static str]],
}

pub static TILE_MATRIX_SET_DEFINITION: TableDefinition = TableDefinition {
	columns: &[
		ColumnDefinition::new("table_name", "TEXT", true, true),
		ColumnDefinition::new("srs_id", "INTEGER", true, false),
		ColumnDefinition::new("min_x", "DOUBLE", true, false),
		ColumnDefinition::new("min_y", "DOUBLE", true, false),
		ColumnDefinition::new("max_x", "DOUBLE", true, false),
		ColumnDefinition::new("max_y", "DOUBLE", true, false),
	],
	foreign_keys: &[
		ForeignKeyDefinition {
			table: "gpkg_spatial_ref_sys",
			from: "srs_id",
			to: "srs_id",
		},
		ForeignKeyDefinition {
			table: "gpkg_contents",
			from: "table_name",
			to: "table_name",
		},
	],
	unique_groups: &[],
};

pub static TILE_MATRIX_DEFINITION: TableDefinition = TableDefinition {
	columns: &[
		ColumnDefinition::new("table_name", "TEXT", true, true),
		ColumnDefinition::new("zoom_level", "INTEGER", true, true),
		ColumnDefinition::new("matrix_width", "INTEGER", true, false),
		ColumnDefinition::new("matrix_height", "INTEGER", true, false),
		ColumnDefinition::new("tile_width", "INTEGER", true, false),
		ColumnDefinition::new("tile_height", "INTEGER", true, false),
		ColumnDefinition::new("pixel_x_size", "DOUBLE", true, false),
		ColumnDefinition::new("pixel_y_size", "DOUBLE", true, false),
	],
	foreign_keys: &[ForeignKeyDefinition {
		table: "gpkg_contents",
		from: "table_name",
		to: "table_name",
	}],
	unique_groups: &[],
};

/// A tile pyramid user data table.
pub static PYRAMID_TABLE_DEFINITION: TableDefinition = TableDefinition {
	columns: &[
		ColumnDefinition::new("id", "INTEGER", false, true),
		ColumnDefinition::new("zoom_level", "INTEGER", true, false),
		ColumnDefinition::new("tile_column", "INTEGER", true, false),
		ColumnDefinition::new("tile_row", "INTEGER", true, false),
		ColumnDefinition::new("tile_data", "BLOB", true, false),
	],
	foreign_keys: &[],
	unique_groups: &[&["zoom_level", "tile_column", "tile_row"]],
};

lazy_static! {
	static ref ALLOWED_SQL_TYPES: BTreeSet<&'static str> = [
		"BOOLEAN",
		"TINYINT",
		"SMALLINT",
		"MEDIUMINT",
		"INT",
		"INTEGER",
		"FLOAT",
		"DOUBLE",
		"REAL",
		"TEXT",
		"BLOB",
		"DATE",
		"DATETIME",
		"GEOMETRY",
		"POINT",
		"LINESTRING",
		"POLYGON",
		"MULTIPOINT",
		"MULTILINESTRING",
		"MULTIPOLYGON",
		"GEOMETRYCOLLECTION",
	]
	.into_iter()
	.collect();
	static ref SIZED_SQL_TYPE: Regex = Regex::new(r"^(TEXT|BLOB)\(\d+\)$").unwrap();
}

/// Returns `true` if `sql_type` is one of the column types a GeoPackage may use.
pub fn is_allowed_sql_type(sql_type: &str) -> bool {
	let upper = sql_type.trim().to_uppercase();
	ALLOWED_SQL_TYPES.contains(upper.as_str()) || SIZED_SQL_TYPE.is_match(&upper)
}

struct ActualColumn {
	name: String,
	sql_type: String,
	not_null: bool,
	primary_key: bool,
}

fn describe(sql_type: &str, not_null: bool, primary_key: bool) -> String {
	let mut text = sql_type.to_string();
	if not_null {
		text.push_str(" NOT NULL");
	}
	if primary_key {
		text.push_str(" PRIMARY KEY");
	}
	text
}

/// Compares table or view `table_name` with `definition`.
///
/// Returns one message per mismatch, nothing if the table conforms. Columns
/// not named in the definition are allowed, as long as their types are
/// GeoPackage types.
#[context("verifying the definition of table '{table_name}'")]
pub fn verify_table(storage: &StorageView, table_name: &str, definition: &TableDefinition) -> Result<Vec<String>> {
	let sql = storage.query_value::<String>(
		"SELECT sql FROM sqlite_master WHERE (type = 'table' OR type = 'view') AND tbl_name = ?1",
		[table_name],
	)?;
	if sql.is_none() {
		return Ok(vec![format!(
			"The `sql` field must include the {table_name} table SQL Definition."
		)]);
	}

	let mut messages = Vec::new();

	let columns = storage.query_rows(
		"SELECT name, type, \"notnull\", pk FROM pragma_table_info(?1)",
		[table_name],
		|row| {
			Ok(ActualColumn {
				name: row.get(0)?,
				sql_type: row.get(1)?,
				not_null: row.get::<_, i64>(2)? != 0,
				primary_key: row.get::<_, i64>(3)? > 0,
			})
		},
	)?;

	for expected in definition.columns {
		match columns.iter().find(|c| c.name.eq_ignore_ascii_case(expected.name)) {
			None => messages.push(format!("required column: {table_name}.{} is missing", expected.name)),
			Some(actual) => {
				if !actual.sql_type.eq_ignore_ascii_case(expected.sql_type)
					|| actual.not_null != expected.not_null
					|| actual.primary_key != expected.primary_key
				{
					messages.push(format!(
						"column {table_name}.{} is defined as {} but should be {}",
						expected.name,
						describe(&actual.sql_type, actual.not_null, actual.primary_key),
						describe(expected.sql_type, expected.not_null, expected.primary_key),
					));
				}
			}
		}
	}

	for column in &columns {
		if !is_allowed_sql_type(&column.sql_type) {
			messages.push(format!(
				"column {table_name}.{} has the data type '{}', which is not a GeoPackage data type",
				column.name, column.sql_type
			));
		}
	}

	let actual_keys: BTreeSet<(String, String, String)> = storage
		.query_rows(
			"SELECT \"table\", \"from\", \"to\" FROM pragma_foreign_key_list(?1)",
			[table_name],
			|row| {
				Ok((
					row.get::<_, String>(0)?,
					row.get::<_, String>(1)?,
					row.get::<_, Option<String>>(2)?.unwrap_or_default(),
				))
			},
		)?
		.into_iter()
		.collect();
	let expected_keys: BTreeSet<(String, String, String)> = definition
		.foreign_keys
		.iter()
		.map(|k| (k.table.to_string(), k.from.to_string(), k.to.to_string()))
		.collect();

	for (table, from, to) in expected_keys.difference(&actual_keys) {
		messages.push(format!(
			"table {table_name} is missing the foreign key {table_name}.{from} -> {table}.{to}"
		));
	}
	for (table, from, to) in actual_keys.difference(&expected_keys) {
		messages.push(format!(
			"table {table_name} has the unexpected foreign key {table_name}.{from} -> {table}.{to}"
		));
	}

	if !definition.unique_groups.is_empty() {
		let index_names = storage.query_column::<String>(
			"SELECT name FROM pragma_index_list(?1) WHERE \"unique\" = 1",
			[table_name],
		)?;
		let mut unique_groups = Vec::with_capacity(index_names.len());
		for index_name in index_names {
			let columns = storage.query_column::<String>("SELECT name FROM pragma_index_info(?1)", [&index_name])?;
			unique_groups.push(columns.into_iter().collect::<BTreeSet<String>>());
		}

		for group in definition.unique_groups {
			let expected = group.iter().map(|c| c.to_string()).collect::<BTreeSet<String>>();
			if !unique_groups.contains(&expected) {
				messages.push(format!(
					"The table {table_name} is missing the column group unique constraint: ({})",
					group.iter().join(", ")
				));
			}
		}
	}

	Ok(messages)
}
