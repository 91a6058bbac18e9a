//! The conformance rules for tile pyramids, ordered by the requirement they
//! check.
//!
//! Every check returns one message per violation. A rule whose check fails
//! with a storage error is reported as a single [`Severity::Error`] issue by
//! [`Rule::run`].

use super::{
	VerificationContext,
	table_definition::{PYRAMID_TABLE_DEFINITION, TILE_MATRIX_DEFINITION, TILE_MATRIX_SET_DEFINITION, verify_table},
};
use crate::{SPATIAL_REF_SYS_TABLE, quote_identifier};
use anyhow::Result;
use gpkgtiles_core::{BoundingBox, Issue, Severity};
use gpkgtiles_image::is_permitted_tile_encoding;
use itertools::Itertools;
use std::collections::BTreeSet;

/// Absolute tolerance of floating point comparisons.
pub const EPSILON: f64 = 0.0001;

pub type Check = fn(&VerificationContext<'_>) -> Result<Vec<String>>;

pub struct Rule {
	pub id: &'static str,
	pub reference: &'static str,
	pub text: &'static str,
	pub severity: Severity,
	/// Only runs at [`VerificationLevel::Full`](gpkgtiles_core::VerificationLevel::Full).
	pub requires_full: bool,
	pub check: Check,
}

impl Rule {
	/// Runs the check and converts its findings into issues.
	pub fn run(&self, context: &VerificationContext) -> Vec<Issue> {
		if self.requires_full && !context.level.decodes_tiles() {
			return vec![Issue::new(
				self.id,
				self.reference,
				Severity::Skipped,
				format!("Skipped at verification level {}", context.level),
			)];
		}
		match (self.check)(context) {
			Ok(messages) => messages
				.into_iter()
				.map(|message| Issue::new(self.id, self.reference, self.severity, message))
				.collect(),
			Err(err) => vec![Issue::new(
				self.id,
				self.reference,
				Severity::Error,
				format!("Unexpected error while checking {}: {err:#}", self.reference),
			)],
		}
	}
}

impl std::fmt::Debug for Rule {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Rule")
			.field("id", &self.id)
			.field("reference", &self.reference)
			.field("severity", &self.severity)
			.field("requires_full", &self.requires_full)
			.finish()
	}
}

pub static RULES: &[Rule] = &[
	Rule {
		id: "pyramids_in_contents",
		reference: "Requirement 34",
		text: "The gpkg_contents table SHALL contain a row with a data_type column value of 'tiles' for each tile pyramid user data table or view.",
		severity: Severity::Warning,
		requires_full: false,
		check: pyramids_in_contents,
	},
	Rule {
		id: "zoom_pixel_halving",
		reference: "Requirement 35",
		text: "Zoom level pixel sizes of a tile pyramid user data table SHALL vary by a factor of 2 between adjacent zoom levels in the tile matrix metadata table.",
		severity: Severity::Warning,
		requires_full: false,
		check: zoom_pixel_halving,
	},
	Rule {
		id: "tile_image_encoding",
		reference: "Requirement 36",
		text: "A tile pyramid user data table SHALL store its tile data in MIME type image/png or image/jpeg.",
		severity: Severity::Warning,
		requires_full: true,
		check: tile_image_encoding,
	},
	Rule {
		id: "tile_matrix_set_table",
		reference: "Requirement 38",
		text: "A GeoPackage that contains a tile pyramid user data table SHALL contain a gpkg_tile_matrix_set table or view per its table definition.",
		severity: Severity::Error,
		requires_full: false,
		check: tile_matrix_set_table,
	},
	Rule {
		id: "tile_matrix_set_in_contents",
		reference: "Requirement 39",
		text: "Values of the gpkg_tile_matrix_set table_name column SHALL reference values in the gpkg_contents table_name column for rows with a data type of 'tiles'.",
		severity: Severity::Warning,
		requires_full: false,
		check: tile_matrix_set_in_contents,
	},
	Rule {
		id: "pyramids_in_tile_matrix_set",
		reference: "Requirement 40",
		text: "The gpkg_tile_matrix_set table or view SHALL contain one row record for each tile pyramid user data table.",
		severity: Severity::Error,
		requires_full: false,
		check: pyramids_in_tile_matrix_set,
	},
	Rule {
		id: "tile_matrix_set_srs",
		reference: "Requirement 41",
		text: "Values of the gpkg_tile_matrix_set srs_id column SHALL reference values in the gpkg_spatial_ref_sys srs_id column.",
		severity: Severity::Error,
		requires_full: false,
		check: tile_matrix_set_srs,
	},
	Rule {
		id: "tile_matrix_table",
		reference: "Requirement 42",
		text: "A GeoPackage that contains a tile pyramid user data table SHALL contain a gpkg_tile_matrix table or view per its table definition.",
		severity: Severity::Error,
		requires_full: false,
		check: tile_matrix_table,
	},
	Rule {
		id: "tile_matrix_in_contents",
		reference: "Requirement 43",
		text: "Values of the gpkg_tile_matrix table_name column SHALL reference values in the gpkg_contents table_name column for rows with a data_type of 'tiles'.",
		severity: Severity::Warning,
		requires_full: false,
		check: tile_matrix_in_contents,
	},
	Rule {
		id: "pyramid_zooms_in_tile_matrix",
		reference: "Requirement 44",
		text: "The gpkg_tile_matrix table or view SHALL contain one row record for each zoom level that contains one or more tiles in each tile pyramid user data table or view.",
		severity: Severity::Error,
		requires_full: false,
		check: pyramid_zooms_in_tile_matrix,
	},
	Rule {
		id: "pixel_size_consistency",
		reference: "Requirement 45",
		text: "The minimum bounding box defined in the gpkg_tile_matrix_set table or view for a tile pyramid user data table SHALL be exact.",
		severity: Severity::Warning,
		requires_full: false,
		check: pixel_size_consistency,
	},
	Rule {
		id: "zoom_level_non_negative",
		reference: "Requirement 46",
		text: "The zoom_level column value in a gpkg_tile_matrix table row SHALL not be negative.",
		severity: Severity::Error,
		requires_full: false,
		check: zoom_level_non_negative,
	},
	Rule {
		id: "matrix_width_positive",
		reference: "Requirement 47",
		text: "The matrix_width column value in a gpkg_tile_matrix table row SHALL be greater than 0.",
		severity: Severity::Error,
		requires_full: false,
		check: matrix_width_positive,
	},
	Rule {
		id: "matrix_height_positive",
		reference: "Requirement 48",
		text: "The matrix_height column value in a gpkg_tile_matrix table row SHALL be greater than 0.",
		severity: Severity::Error,
		requires_full: false,
		check: matrix_height_positive,
	},
	Rule {
		id: "tile_width_positive",
		reference: "Requirement 49",
		text: "The tile_width column value in a gpkg_tile_matrix table row SHALL be greater than 0.",
		severity: Severity::Error,
		requires_full: false,
		check: tile_width_positive,
	},
	Rule {
		id: "tile_height_positive",
		reference: "Requirement 50",
		text: "The tile_height column value in a gpkg_tile_matrix table row SHALL be greater than 0.",
		severity: Severity::Error,
		requires_full: false,
		check: tile_height_positive,
	},
	Rule {
		id: "pixel_x_size_positive",
		reference: "Requirement 51",
		text: "The pixel_x_size column value in a gpkg_tile_matrix table row SHALL be greater than 0.",
		severity: Severity::Error,
		requires_full: false,
		check: pixel_x_size_positive,
	},
	Rule {
		id: "pixel_y_size_positive",
		reference: "Requirement 52",
		text: "The pixel_y_size column value in a gpkg_tile_matrix table row SHALL be greater than 0.",
		severity: Severity::Error,
		requires_full: false,
		check: pixel_y_size_positive,
	},
	Rule {
		id: "pixel_sizes_decrease",
		reference: "Requirement 53",
		text: "The pixel_x_size and pixel_y_size column values for zoom_level column values in a gpkg_tile_matrix table sorted in ascending order SHALL be sorted in descending order.",
		severity: Severity::Warning,
		requires_full: false,
		check: pixel_sizes_decrease,
	},
	Rule {
		id: "contents_pyramid_tables",
		reference: "Requirement 54",
		text: "Each tile matrix set SHALL be stored in a different tile pyramid user data table or updateable view per its table definition.",
		severity: Severity::Error,
		requires_full: false,
		check: contents_pyramid_tables,
	},
	Rule {
		id: "pyramid_zoom_range",
		reference: "Requirement 55",
		text: "The zoom_level of a tile pyramid user data table SHALL be in the range min(tm.zoom_level) <= tp.zoom_level <= max(tm.zoom_level).",
		severity: Severity::Error,
		requires_full: false,
		check: pyramid_zoom_range,
	},
	Rule {
		id: "tile_column_range",
		reference: "Requirement 56",
		text: "The tile_column of a tile pyramid user data table SHALL be in the range 0 <= tp.tile_column <= tm.matrix_width - 1 where the tm and tp zoom_level column values are equal.",
		severity: Severity::Warning,
		requires_full: false,
		check: tile_column_range,
	},
	Rule {
		id: "tile_row_range",
		reference: "Requirement 57",
		text: "The tile_row of a tile pyramid user data table SHALL be in the range 0 <= tp.tile_row <= tm.matrix_height - 1 where the tm and tp zoom_level column values are equal.",
		severity: Severity::Warning,
		requires_full: false,
		check: tile_row_range,
	},
	Rule {
		id: "bounding_box_exact",
		reference: "Reference 2.2.6.1.1",
		text: "The gpkg_tile_matrix_set table or updateable view defines the minimum bounding box and spatial reference system for all content in a tile pyramid user data table.",
		severity: Severity::Warning,
		requires_full: false,
		check: bounding_box_exact,
	},
];

/// Looks a rule up by its id.
pub fn find_rule(id: &str) -> Option<&'static Rule> {
	RULES.iter().find(|rule| rule.id == id)
}

fn is_equal(a: f64, b: f64) -> bool {
	(a - b).abs() < EPSILON
}

/// `(zoom_level, pixel_x_size, pixel_y_size)` of every tile matrix of
/// `table_name`, ordered by zoom level.
fn pixel_sizes(context: &VerificationContext, table_name: &str) -> Result<Vec<(i32, f64, f64)>> {
	context.storage.query_rows(
		"SELECT zoom_level, pixel_x_size, pixel_y_size FROM gpkg_tile_matrix WHERE table_name = ?1 ORDER BY zoom_level",
		[table_name],
		|row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
	)
}

fn format_pairs(pairs: &[(i32, i32)]) -> String {
	pairs.iter().map(|(a, b)| format!("({a}, {b})")).join(", ")
}

fn pyramids_in_contents(context: &VerificationContext) -> Result<Vec<String>> {
	Ok(context
		.pyramid_tables
		.iter()
		.filter(|table| !context.is_contents_tile_table(table))
		.map(|table| {
			format!(
				"The table '{table}' matches the definition of a tile pyramid user data table, but is not referenced in gpkg_contents"
			)
		})
		.collect())
}

fn zoom_pixel_halving(context: &VerificationContext) -> Result<Vec<String>> {
	if !context.has_tile_matrix_table {
		return Ok(vec![]);
	}
	let mut messages = vec![];
	for table in &context.pyramid_tables {
		let bad_pairs = pixel_sizes(context, table)?
			.into_iter()
			.tuple_windows()
			.filter(|((zoom, x, y), (next_zoom, next_x, next_y))| {
				*zoom == next_zoom - 1 && (!is_equal(x / 2.0, *next_x) || !is_equal(y / 2.0, *next_y))
			})
			.map(|((zoom, ..), (next_zoom, ..))| (zoom, next_zoom))
			.collect::<Vec<_>>();
		if !bad_pairs.is_empty() {
			messages.push(format!(
				"The tile table '{table}' has adjacent zoom levels with pixel sizes that do not vary by a factor of 2: {}",
				format_pairs(&bad_pairs)
			));
		}
	}
	Ok(messages)
}

fn tile_image_encoding(context: &VerificationContext) -> Result<Vec<String>> {
	let mut messages = vec![];
	for table in &context.pyramid_tables {
		let bad_ids = context
			.storage
			.query_rows(
				&format!("SELECT id, tile_data FROM {} ORDER BY id", quote_identifier(table)),
				[],
				|row| {
					let id: i64 = row.get(0)?;
					let data: Option<Vec<u8>> = row.get(1)?;
					let permitted = data.is_some_and(|data| is_permitted_tile_encoding(&data));
					Ok((!permitted).then_some(id))
				},
			)?
			.into_iter()
			.flatten()
			.collect::<Vec<_>>();
		if !bad_ids.is_empty() {
			messages.push(format!(
				"The tile table '{table}' contains tiles that are not PNG or JPEG images, ids: {}",
				bad_ids.iter().join(", ")
			));
		}
	}
	Ok(messages)
}

fn table_definition_messages(
	context: &VerificationContext,
	table_name: &str,
	exists: bool,
	missing_message: &str,
	definition: &super::table_definition::TableDefinition,
) -> Result<Vec<String>> {
	if !context.has_pyramids() {
		return Ok(vec![]);
	}
	if !exists {
		return Ok(vec![missing_message.to_string()]);
	}
	Ok(verify_table(context.storage, table_name, definition)?
		.into_iter()
		.map(|message| format!("Bad {table_name} table definition: {message}"))
		.collect())
}

fn tile_matrix_set_table(context: &VerificationContext) -> Result<Vec<String>> {
	table_definition_messages(
		context,
		"gpkg_tile_matrix_set",
		context.has_tile_matrix_set_table,
		"Missing gpkg_tile_matrix_set table.",
		&TILE_MATRIX_SET_DEFINITION,
	)
}

fn tile_matrix_set_names(context: &VerificationContext) -> Result<Vec<String>> {
	context
		.storage
		.query_column::<String>("SELECT table_name FROM gpkg_tile_matrix_set ORDER BY table_name", [])
}

fn tile_matrix_set_in_contents(context: &VerificationContext) -> Result<Vec<String>> {
	if !context.has_tile_matrix_set_table {
		return Ok(vec![]);
	}
	Ok(tile_matrix_set_names(context)?
		.into_iter()
		.filter(|table| !context.is_contents_tile_table(table))
		.map(|table| {
			format!("The table_name '{table}' in gpkg_tile_matrix_set is not referenced by a tiles row in gpkg_contents")
		})
		.collect())
}

fn pyramids_in_tile_matrix_set(context: &VerificationContext) -> Result<Vec<String>> {
	if !context.has_tile_matrix_set_table {
		return Ok(vec![]);
	}
	let names = tile_matrix_set_names(context)?.into_iter().collect::<BTreeSet<_>>();
	Ok(context
		.pyramid_tables
		.iter()
		.filter(|table| !names.contains(*table))
		.map(|table| format!("The pyramid user data table '{table}' is not referenced in gpkg_tile_matrix_set"))
		.collect())
}

fn tile_matrix_set_srs(context: &VerificationContext) -> Result<Vec<String>> {
	if !context.has_tile_matrix_set_table {
		return Ok(vec![]);
	}
	let sql = if context.storage.table_or_view_exists(SPATIAL_REF_SYS_TABLE)? {
		"SELECT DISTINCT srs_id FROM gpkg_tile_matrix_set WHERE srs_id NOT IN (SELECT srs_id FROM gpkg_spatial_ref_sys) ORDER BY srs_id"
	} else {
		"SELECT DISTINCT srs_id FROM gpkg_tile_matrix_set ORDER BY srs_id"
	};
	Ok(context
		.storage
		.query_column::<i64>(sql, [])?
		.into_iter()
		.map(|srs_id| {
			format!("The gpkg_tile_matrix_set table references srs_id {srs_id}, which is not defined in gpkg_spatial_ref_sys")
		})
		.collect())
}

fn tile_matrix_table(context: &VerificationContext) -> Result<Vec<String>> {
	table_definition_messages(
		context,
		"gpkg_tile_matrix",
		context.has_tile_matrix_table,
		"Missing gpkg_tile_matrix definition.",
		&TILE_MATRIX_DEFINITION,
	)
}

fn tile_matrix_in_contents(context: &VerificationContext) -> Result<Vec<String>> {
	if !context.has_tile_matrix_table {
		return Ok(vec![]);
	}
	Ok(context
		.storage
		.query_column::<String>("SELECT DISTINCT table_name FROM gpkg_tile_matrix ORDER BY table_name", [])?
		.into_iter()
		.filter(|table| !context.is_contents_tile_table(table))
		.map(|table| format!("The table_name '{table}' in gpkg_tile_matrix does not reference a tiles row in gpkg_contents"))
		.collect())
}

fn pyramid_zooms_in_tile_matrix(context: &VerificationContext) -> Result<Vec<String>> {
	if !context.has_tile_matrix_table {
		return Ok(vec![]);
	}
	let mut messages = vec![];
	for table in &context.pyramid_tables {
		let matrix_zooms = context
			.storage
			.query_column::<i32>(
				"SELECT DISTINCT zoom_level FROM gpkg_tile_matrix WHERE table_name = ?1",
				[table],
			)?
			.into_iter()
			.collect::<BTreeSet<_>>();
		let tile_zooms = context.storage.query_column::<i32>(
			&format!(
				"SELECT DISTINCT zoom_level FROM {} ORDER BY zoom_level",
				quote_identifier(table)
			),
			[],
		)?;
		for zoom in tile_zooms.into_iter().filter(|zoom| !matrix_zooms.contains(zoom)) {
			messages.push(format!(
				"The gpkg_tile_matrix does not contain a row record for zoom level {zoom} in the Pyramid User Data Table {table}."
			));
		}
	}
	Ok(messages)
}

fn pixel_size_consistency(context: &VerificationContext) -> Result<Vec<String>> {
	if !context.has_tile_matrix_table || !context.has_tile_matrix_set_table {
		return Ok(vec![]);
	}
	let mut messages = vec![];
	for table in &context.pyramid_tables {
		let bbox = context
			.storage
			.query_rows(
				"SELECT min_x, min_y, max_x, max_y FROM gpkg_tile_matrix_set WHERE table_name = ?1",
				[table],
				|row| {
					Ok(BoundingBox {
						min_x: row.get(0)?,
						min_y: row.get(1)?,
						max_x: row.get(2)?,
						max_y: row.get(3)?,
					})
				},
			)?
			.pop();
		let Some(bbox) = bbox else {
			continue;
		};

		let bad_zooms = context
			.storage
			.query_rows(
				"SELECT zoom_level, pixel_x_size, pixel_y_size, matrix_width, matrix_height, tile_width, tile_height FROM gpkg_tile_matrix WHERE table_name = ?1 ORDER BY zoom_level",
				[table],
				|row| {
					let zoom: i32 = row.get(0)?;
					let pixel_x: f64 = row.get(1)?;
					let pixel_y: f64 = row.get(2)?;
					let [matrix_width, matrix_height, tile_width, tile_height]: [f64; 4] =
						[row.get(3)?, row.get(4)?, row.get(5)?, row.get(6)?];
					let consistent = is_equal(pixel_x, bbox.width() / matrix_width / tile_width)
						&& is_equal(pixel_y, bbox.height() / matrix_height / tile_height);
					Ok((!consistent).then_some(zoom))
				},
			)?
			.into_iter()
			.flatten()
			.collect::<Vec<_>>();

		if !bad_zooms.is_empty() {
			messages.push(format!(
				"The tile table '{table}' has zoom levels whose pixel sizes fail to satisfy pixel_x_size = (bounding box width / matrix_width) / tile_width and pixel_y_size = (bounding box height / matrix_height) / tile_height: {}",
				bad_zooms.iter().join(", ")
			));
		}
	}
	Ok(messages)
}

/// Checks the smallest value of `column` in `gpkg_tile_matrix`.
fn minimum_check(context: &VerificationContext, column: &str, zero_allowed: bool) -> Result<Vec<String>> {
	if !context.has_tile_matrix_table {
		return Ok(vec![]);
	}
	let Some(minimum) = context
		.storage
		.query_value::<f64>(&format!("SELECT MIN({column}) FROM gpkg_tile_matrix"), [])?
	else {
		return Ok(vec![]);
	};
	let (valid, bound) = if zero_allowed {
		(minimum >= 0.0, "greater than or equal to 0")
	} else {
		(minimum > 0.0, "greater than 0")
	};
	Ok(if valid {
		vec![]
	} else {
		vec![format!(
			"The {column} in gpkg_tile_matrix must be {bound}. Invalid {column}: {minimum}"
		)]
	})
}

fn zoom_level_non_negative(context: &VerificationContext) -> Result<Vec<String>> {
	minimum_check(context, "zoom_level", true)
}

fn matrix_width_positive(context: &VerificationContext) -> Result<Vec<String>> {
	minimum_check(context, "matrix_width", false)
}

fn matrix_height_positive(context: &VerificationContext) -> Result<Vec<String>> {
	minimum_check(context, "matrix_height", false)
}

fn tile_width_positive(context: &VerificationContext) -> Result<Vec<String>> {
	minimum_check(context, "tile_width", false)
}

fn tile_height_positive(context: &VerificationContext) -> Result<Vec<String>> {
	minimum_check(context, "tile_height", false)
}

fn pixel_x_size_positive(context: &VerificationContext) -> Result<Vec<String>> {
	minimum_check(context, "pixel_x_size", false)
}

fn pixel_y_size_positive(context: &VerificationContext) -> Result<Vec<String>> {
	minimum_check(context, "pixel_y_size", false)
}

fn pixel_sizes_decrease(context: &VerificationContext) -> Result<Vec<String>> {
	if !context.has_tile_matrix_table {
		return Ok(vec![]);
	}
	let mut messages = vec![];
	for table in &context.pyramid_tables {
		let bad_pairs = pixel_sizes(context, table)?
			.into_iter()
			.tuple_windows()
			.filter(|((_, x, y), (_, next_x, next_y))| !(next_x < x && next_y < y))
			.map(|((zoom, ..), (next_zoom, ..))| (zoom, next_zoom))
			.collect::<Vec<_>>();
		if !bad_pairs.is_empty() {
			messages.push(format!(
				"The tile table '{table}' has adjacent zoom levels with pixel sizes that do not decrease: {}",
				format_pairs(&bad_pairs)
			));
		}
	}
	Ok(messages)
}

fn contents_pyramid_tables(context: &VerificationContext) -> Result<Vec<String>> {
	let mut messages = vec![];
	for table in &context.contents_tile_tables {
		if context.storage.table_or_view_exists(table)? {
			messages.extend(verify_table(context.storage, table, &PYRAMID_TABLE_DEFINITION)?);
		} else {
			messages.push(format!(
				"The tiles table '{table}' does not exist even though it is defined in the gpkg_contents table. Either create the table '{table}' or delete its record in gpkg_contents."
			));
		}
	}
	if context.has_tile_matrix_set_table {
		let names = tile_matrix_set_names(context)?.into_iter().collect::<BTreeSet<_>>();
		for table in context.contents_tile_tables.iter().filter(|table| !names.contains(*table)) {
			messages.push(format!(
				"The tiles table '{table}' in gpkg_contents has no record in gpkg_tile_matrix_set"
			));
		}
	}
	Ok(messages)
}

fn pyramid_zoom_range(context: &VerificationContext) -> Result<Vec<String>> {
	if !context.has_tile_matrix_table {
		return Ok(vec![]);
	}
	let mut messages = vec![];
	for table in &context.tile_matrix_pyramid_tables {
		let range = context.storage.query_rows(
			"SELECT MIN(zoom_level), MAX(zoom_level) FROM gpkg_tile_matrix WHERE table_name = ?1",
			[table],
			|row| Ok((row.get::<_, Option<i32>>(0)?, row.get::<_, Option<i32>>(1)?)),
		)?;
		let Some((Some(min_zoom), Some(max_zoom))) = range.into_iter().next() else {
			continue;
		};
		let invalid_id = context.storage.query_value::<i64>(
			&format!(
				"SELECT id FROM {} WHERE zoom_level < ?1 OR zoom_level > ?2 ORDER BY id LIMIT 1",
				quote_identifier(table)
			),
			[min_zoom, max_zoom],
		)?;
		if let Some(id) = invalid_id {
			messages.push(format!(
				"The Pyramid User Data Table '{table}' contains zoom levels outside of the range [{min_zoom}, {max_zoom}] determined by the gpkg_tile_matrix table, e.g. the tile with the id {id}"
			));
		}
	}
	Ok(messages)
}

/// Zoom levels of `table` that have tiles with `column` outside of
/// `[0, dimension - 1]`.
fn index_range(context: &VerificationContext, column: &str, dimension: &str) -> Result<Vec<String>> {
	if !context.has_tile_matrix_table {
		return Ok(vec![]);
	}
	let mut messages = vec![];
	for table in &context.tile_matrix_pyramid_tables {
		let quoted = quote_identifier(table);
		let zooms = context.storage.query_column::<i32>(
			&format!(
				"SELECT tm.zoom_level FROM gpkg_tile_matrix AS tm WHERE tm.table_name = ?1 AND (tm.zoom_level IN (SELECT zoom_level FROM {quoted} WHERE {column} < 0) OR EXISTS (SELECT NULL FROM {quoted} AS tp WHERE tp.zoom_level = tm.zoom_level AND tp.{column} > tm.{dimension} - 1)) ORDER BY tm.zoom_level"
			),
			[table],
		)?;
		if !zooms.is_empty() {
			messages.push(format!(
				"The tiles table '{table}' contains {column} values outside of the range [0, {dimension} - 1] at zoom level(s): {}",
				zooms.iter().join(", ")
			));
		}
	}
	Ok(messages)
}

fn tile_column_range(context: &VerificationContext) -> Result<Vec<String>> {
	index_range(context, "tile_column", "matrix_width")
}

fn tile_row_range(context: &VerificationContext) -> Result<Vec<String>> {
	index_range(context, "tile_row", "matrix_height")
}

fn bounding_box_exact(context: &VerificationContext) -> Result<Vec<String>> {
	if !context.has_tile_matrix_table {
		return Ok(vec![]);
	}
	let mut messages = vec![];
	for table in &context.pyramid_tables {
		let quoted = quote_identifier(table);
		let has_tile = |condition: &str| -> Result<bool> {
			let sql = format!("SELECT EXISTS(SELECT 1 FROM {quoted} WHERE {condition})");
			Ok(context.storage.query_value::<i64>(&sql, [])? == Some(1))
		};
		let has_tile_at_bound = |condition: &str| -> Result<bool> {
			let sql = format!(
				"SELECT EXISTS(SELECT 1 FROM gpkg_tile_matrix AS tm JOIN {quoted} AS tp ON tp.zoom_level = tm.zoom_level WHERE tm.table_name = ?1 AND {condition})"
			);
			Ok(context.storage.query_value::<i64>(&sql, [table])? == Some(1))
		};

		if !has_tile("1")? {
			continue;
		}

		let mut missing = vec![];
		if !has_tile("tile_column = 0")? {
			missing.push("minimum column (0)");
		}
		if !has_tile("tile_row = 0")? {
			missing.push("minimum row (0)");
		}
		if !has_tile_at_bound("tp.tile_column = tm.matrix_width - 1")? {
			missing.push("maximum column (matrix_width - 1)");
		}
		if !has_tile_at_bound("tp.tile_row = tm.matrix_height - 1")? {
			missing.push("maximum row (matrix_height - 1)");
		}

		if !missing.is_empty() {
			messages.push(format!(
				"There must be at least one tile in the minimum and maximum row and column in tile pyramid user data table '{table}'. The table has no tile for {}, at any zoom level.",
				missing.join(", ")
			));
		}
	}
	Ok(messages)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		StorageView,
		testing::{add_sample_pyramid, execute_unchecked, temp_storage},
	};
	use anyhow::bail;
	use assert_fs::NamedTempFile;
	use gpkgtiles_core::VerificationLevel;
	use gpkgtiles_image::{ImageEncoding, encode, helper::create_image_rgba};
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	/// A GeoPackage holding the conforming sample pyramid `a`, modified by `sql`.
	fn modified_sample(sql: &str) -> Result<(NamedTempFile, StorageView)> {
		let (file, storage) = temp_storage()?;
		add_sample_pyramid(&storage, "a")?;
		execute_unchecked(&storage, sql)?;
		Ok((file, storage))
	}

	fn run(storage: &StorageView, id: &str) -> Result<Vec<String>> {
		let Some(rule) = find_rule(id) else {
			bail!("unknown rule {id}");
		};
		let context = VerificationContext::new(storage, VerificationLevel::Full)?;
		(rule.check)(&context)
	}

	#[test]
	fn catalog_is_ordered_and_unique() {
		assert_eq!(RULES.len(), 24);
		assert_eq!(RULES.iter().map(|r| r.id).collect::<BTreeSet<_>>().len(), RULES.len());
		assert_eq!(RULES.first().map(|r| r.reference), Some("Requirement 34"));
		assert_eq!(RULES.last().map(|r| r.id), Some("bounding_box_exact"));
		assert_eq!(
			RULES.iter().filter(|r| r.requires_full).map(|r| r.id).collect::<Vec<_>>(),
			["tile_image_encoding"]
		);
	}

	#[test]
	fn sample_passes_every_rule() -> Result<()> {
		let (_file, storage) = modified_sample("")?;
		for rule in RULES {
			assert_eq!(run(&storage, rule.id)?, Vec::<String>::new(), "{}", rule.reference);
		}
		Ok(())
	}

	#[rstest]
	#[case::pyramids_in_contents(
		"DELETE FROM gpkg_contents WHERE table_name = 'a';",
		"pyramids_in_contents",
		"The table 'a' matches the definition of a tile pyramid user data table, but is not referenced in gpkg_contents"
	)]
	#[case::zoom_pixel_halving(
		"UPDATE gpkg_tile_matrix SET pixel_x_size = pixel_x_size * 0.9 WHERE zoom_level = 1;",
		"zoom_pixel_halving",
		"The tile table 'a' has adjacent zoom levels with pixel sizes that do not vary by a factor of 2: (0, 1)"
	)]
	#[case::tile_image_encoding(
		"UPDATE a SET tile_data = x'00010203' WHERE zoom_level = 0;",
		"tile_image_encoding",
		"The tile table 'a' contains tiles that are not PNG or JPEG images, ids: 1"
	)]
	#[case::tile_matrix_set_table(
		"DROP TABLE gpkg_tile_matrix_set;",
		"tile_matrix_set_table",
		"Missing gpkg_tile_matrix_set table."
	)]
	#[case::tile_matrix_set_in_contents(
		"INSERT INTO gpkg_tile_matrix_set VALUES ('ghost', 4326, 0, 0, 1, 1);",
		"tile_matrix_set_in_contents",
		"The table_name 'ghost' in gpkg_tile_matrix_set is not referenced by a tiles row in gpkg_contents"
	)]
	#[case::pyramids_in_tile_matrix_set(
		"DELETE FROM gpkg_tile_matrix_set;",
		"pyramids_in_tile_matrix_set",
		"The pyramid user data table 'a' is not referenced in gpkg_tile_matrix_set"
	)]
	#[case::tile_matrix_set_srs(
		"UPDATE gpkg_tile_matrix_set SET srs_id = 9999;",
		"tile_matrix_set_srs",
		"The gpkg_tile_matrix_set table references srs_id 9999, which is not defined in gpkg_spatial_ref_sys"
	)]
	#[case::tile_matrix_table(
		"DROP TABLE gpkg_tile_matrix;",
		"tile_matrix_table",
		"Missing gpkg_tile_matrix definition."
	)]
	#[case::tile_matrix_in_contents(
		"INSERT INTO gpkg_tile_matrix VALUES ('ghost', 0, 1, 1, 256, 256, 1.0, 1.0);",
		"tile_matrix_in_contents",
		"The table_name 'ghost' in gpkg_tile_matrix does not reference a tiles row in gpkg_contents"
	)]
	#[case::pyramid_zooms_in_tile_matrix(
		"DELETE FROM gpkg_tile_matrix WHERE zoom_level = 1;",
		"pyramid_zooms_in_tile_matrix",
		"The gpkg_tile_matrix does not contain a row record for zoom level 1 in the Pyramid User Data Table a."
	)]
	#[case::pixel_size_consistency(
		"UPDATE gpkg_tile_matrix SET pixel_y_size = 0.5 WHERE zoom_level = 0;",
		"pixel_size_consistency",
		"The tile table 'a' has zoom levels whose pixel sizes fail to satisfy pixel_x_size = (bounding box width / matrix_width) / tile_width and pixel_y_size = (bounding box height / matrix_height) / tile_height: 0"
	)]
	#[case::zoom_level_non_negative(
		"UPDATE gpkg_tile_matrix SET zoom_level = -1 WHERE zoom_level = 0;",
		"zoom_level_non_negative",
		"The zoom_level in gpkg_tile_matrix must be greater than or equal to 0. Invalid zoom_level: -1"
	)]
	#[case::matrix_width_positive(
		"UPDATE gpkg_tile_matrix SET matrix_width = 0 WHERE zoom_level = 1;",
		"matrix_width_positive",
		"The matrix_width in gpkg_tile_matrix must be greater than 0. Invalid matrix_width: 0"
	)]
	#[case::matrix_height_positive(
		"UPDATE gpkg_tile_matrix SET matrix_height = -2 WHERE zoom_level = 1;",
		"matrix_height_positive",
		"The matrix_height in gpkg_tile_matrix must be greater than 0. Invalid matrix_height: -2"
	)]
	#[case::tile_width_positive(
		"UPDATE gpkg_tile_matrix SET tile_width = 0;",
		"tile_width_positive",
		"The tile_width in gpkg_tile_matrix must be greater than 0. Invalid tile_width: 0"
	)]
	#[case::tile_height_positive(
		"UPDATE gpkg_tile_matrix SET tile_height = 0 WHERE zoom_level = 0;",
		"tile_height_positive",
		"The tile_height in gpkg_tile_matrix must be greater than 0. Invalid tile_height: 0"
	)]
	#[case::pixel_x_size_positive(
		"UPDATE gpkg_tile_matrix SET pixel_x_size = -0.5 WHERE zoom_level = 1;",
		"pixel_x_size_positive",
		"The pixel_x_size in gpkg_tile_matrix must be greater than 0. Invalid pixel_x_size: -0.5"
	)]
	#[case::pixel_y_size_positive(
		"UPDATE gpkg_tile_matrix SET pixel_y_size = 0 WHERE zoom_level = 1;",
		"pixel_y_size_positive",
		"The pixel_y_size in gpkg_tile_matrix must be greater than 0. Invalid pixel_y_size: 0"
	)]
	#[case::pixel_sizes_decrease(
		"UPDATE gpkg_tile_matrix SET pixel_x_size = 1, pixel_y_size = 1 WHERE zoom_level = 1;",
		"pixel_sizes_decrease",
		"The tile table 'a' has adjacent zoom levels with pixel sizes that do not decrease: (0, 1)"
	)]
	#[case::pixel_sizes_equal(
		"UPDATE gpkg_tile_matrix SET
			pixel_x_size = (SELECT pixel_x_size FROM gpkg_tile_matrix WHERE zoom_level = 0),
			pixel_y_size = (SELECT pixel_y_size FROM gpkg_tile_matrix WHERE zoom_level = 0)
			WHERE zoom_level = 1;",
		"pixel_sizes_decrease",
		"The tile table 'a' has adjacent zoom levels with pixel sizes that do not decrease: (0, 1)"
	)]
	#[case::pixel_x_size_grows(
		"UPDATE gpkg_tile_matrix SET pixel_x_size = 1 WHERE zoom_level = 1;",
		"pixel_sizes_decrease",
		"The tile table 'a' has adjacent zoom levels with pixel sizes that do not decrease: (0, 1)"
	)]
	#[case::contents_pyramid_tables(
		"DROP TABLE a;
		CREATE TABLE a (
			id INTEGER PRIMARY KEY AUTOINCREMENT,
			zoom_level INTEGER NOT NULL,
			tile_column TEXT NOT NULL,
			tile_row INTEGER NOT NULL,
			tile_data BLOB NOT NULL,
			UNIQUE (zoom_level, tile_column, tile_row)
		);",
		"contents_pyramid_tables",
		"column a.tile_column is defined as TEXT NOT NULL but should be INTEGER NOT NULL"
	)]
	#[case::contents_pyramid_without_tile_matrix_set(
		"DELETE FROM gpkg_tile_matrix_set;",
		"contents_pyramid_tables",
		"The tiles table 'a' in gpkg_contents has no record in gpkg_tile_matrix_set"
	)]
	#[case::pyramid_zoom_range(
		"INSERT INTO a (zoom_level, tile_column, tile_row, tile_data) VALUES (5, 0, 0, x'00');",
		"pyramid_zoom_range",
		"The Pyramid User Data Table 'a' contains zoom levels outside of the range [0, 1] determined by the gpkg_tile_matrix table, e.g. the tile with the id 6"
	)]
	#[case::tile_column_range(
		"INSERT INTO a (zoom_level, tile_column, tile_row, tile_data) VALUES (1, 2, 0, x'00'), (0, -1, 0, x'00');",
		"tile_column_range",
		"The tiles table 'a' contains tile_column values outside of the range [0, matrix_width - 1] at zoom level(s): 0, 1"
	)]
	#[case::tile_row_range(
		"INSERT INTO a (zoom_level, tile_column, tile_row, tile_data) VALUES (1, 0, 2, x'00');",
		"tile_row_range",
		"The tiles table 'a' contains tile_row values outside of the range [0, matrix_height - 1] at zoom level(s): 1"
	)]
	#[case::bounding_box_exact(
		"DELETE FROM a WHERE zoom_level = 0 OR tile_column = 1;",
		"bounding_box_exact",
		"There must be at least one tile in the minimum and maximum row and column in tile pyramid user data table 'a'. The table has no tile for maximum column (matrix_width - 1), at any zoom level."
	)]
	fn detects_violation(#[case] sql: &str, #[case] id: &str, #[case] message: &str) -> Result<()> {
		let (_file, storage) = modified_sample(sql)?;
		assert_eq!(run(&storage, id)?, [message]);
		Ok(())
	}

	#[test]
	fn bad_tile_matrix_set_definition() -> Result<()> {
		let (_file, storage) = modified_sample(
			"DROP TABLE gpkg_tile_matrix_set;
			CREATE TABLE gpkg_tile_matrix_set (
				table_name TEXT NOT NULL PRIMARY KEY,
				srs_id INTEGER NOT NULL,
				min_x DOUBLE NOT NULL,
				min_y DOUBLE NOT NULL,
				max_x DOUBLE NOT NULL,
				max_y DOUBLE
			);",
		)?;
		assert_eq!(
			run(&storage, "tile_matrix_set_table")?,
			[
				"Bad gpkg_tile_matrix_set table definition: column gpkg_tile_matrix_set.max_y is defined as DOUBLE but should be DOUBLE NOT NULL",
				"Bad gpkg_tile_matrix_set table definition: table gpkg_tile_matrix_set is missing the foreign key gpkg_tile_matrix_set.table_name -> gpkg_contents.table_name",
				"Bad gpkg_tile_matrix_set table definition: table gpkg_tile_matrix_set is missing the foreign key gpkg_tile_matrix_set.srs_id -> gpkg_spatial_ref_sys.srs_id",
			]
		);
		Ok(())
	}

	#[test]
	fn contents_table_missing() -> Result<()> {
		let (_file, storage) = modified_sample(
			"INSERT INTO gpkg_contents (table_name, data_type, identifier) VALUES ('ghost', 'tiles', 'ghost');
			INSERT INTO gpkg_tile_matrix_set VALUES ('ghost', 4326, 0, 0, 1, 1);",
		)?;
		assert_eq!(
			run(&storage, "contents_pyramid_tables")?,
			["The tiles table 'ghost' does not exist even though it is defined in the gpkg_contents table. Either create the table 'ghost' or delete its record in gpkg_contents."]
		);
		Ok(())
	}

	#[test]
	fn srs_table_missing() -> Result<()> {
		let (_file, storage) = modified_sample("DROP TABLE gpkg_spatial_ref_sys;")?;
		assert_eq!(
			run(&storage, "tile_matrix_set_srs")?,
			["The gpkg_tile_matrix_set table references srs_id 4326, which is not defined in gpkg_spatial_ref_sys"]
		);
		Ok(())
	}

	#[test]
	fn webp_tile_is_rejected() -> Result<()> {
		let (_file, storage) = modified_sample("")?;
		let webp = encode(&create_image_rgba(256, 256), ImageEncoding::Webp)?;
		storage.execute("UPDATE a SET tile_data = ?1 WHERE zoom_level = 1 AND tile_column = 1", [webp])?;
		assert_eq!(
			run(&storage, "tile_image_encoding")?,
			["The tile table 'a' contains tiles that are not PNG or JPEG images, ids: 3, 5"]
		);
		Ok(())
	}

	#[test]
	fn halving_ignores_non_adjacent_zooms() -> Result<()> {
		let (_file, storage) = modified_sample(
			"INSERT INTO gpkg_tile_matrix VALUES ('a', 3, 8, 8, 256, 256, 30.0 / 2048, 50.0 / 2048);",
		)?;
		assert!(run(&storage, "zoom_pixel_halving")?.is_empty());
		assert!(run(&storage, "pixel_sizes_decrease")?.is_empty());
		Ok(())
	}

	#[test]
	fn empty_pyramid_has_no_bounds_to_check() -> Result<()> {
		let (_file, storage) = modified_sample("DELETE FROM a;")?;
		assert!(run(&storage, "bounding_box_exact")?.is_empty());
		Ok(())
	}

	#[test]
	fn one_message_per_table() -> Result<()> {
		let (_file, storage) = temp_storage()?;
		add_sample_pyramid(&storage, "a")?;
		add_sample_pyramid(&storage, "b")?;
		execute_unchecked(&storage, "DELETE FROM gpkg_contents;")?;
		assert_eq!(run(&storage, "pyramids_in_contents")?.len(), 2);
		assert_eq!(run(&storage, "tile_matrix_in_contents")?.len(), 2);
		Ok(())
	}

	#[test]
	fn skipped_below_full() -> Result<()> {
		let (_file, storage) = modified_sample("")?;
		let context = VerificationContext::new(&storage, VerificationLevel::Fast)?;
		let issues = find_rule("tile_image_encoding").map(|rule| rule.run(&context)).unwrap_or_default();
		assert_eq!(issues.len(), 1);
		assert_eq!(issues[0].severity, Severity::Skipped);
		assert_eq!(issues[0].message, "Skipped at verification level fast");
		Ok(())
	}

	#[test]
	fn failing_check_becomes_error_issue() -> Result<()> {
		fn broken(context: &VerificationContext) -> Result<Vec<String>> {
			context.storage.query_column::<i64>("SELECT nothing FROM nowhere", [])?;
			Ok(vec![])
		}
		let rule = Rule {
			id: "broken",
			reference: "Requirement 0",
			text: "",
			severity: Severity::Warning,
			requires_full: false,
			check: broken,
		};
		let (_file, storage) = temp_storage()?;
		let context = VerificationContext::new(&storage, VerificationLevel::Fast)?;
		let issues = rule.run(&context);
		assert_eq!(issues.len(), 1);
		assert_eq!(issues[0].severity, Severity::Error);
		assert!(issues[0].message.starts_with("Unexpected error while checking Requirement 0: "));
		assert!(issues[0].message.contains("no such table: nowhere"));
		Ok(())
	}
}
