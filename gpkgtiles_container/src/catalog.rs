//! The core catalog of a GeoPackage: `gpkg_spatial_ref_sys` and `gpkg_contents`.

use crate::StorageView;
use anyhow::Result;
use gpkgtiles_core::{BoundingBox, SpatialReferenceSystem, bail_precondition, precondition};
use gpkgtiles_derive::context;
use r2d2_sqlite::rusqlite::{Row, params};

/// `PRAGMA application_id` of a GeoPackage: "GPKG" in ASCII.
pub const GEOPACKAGE_APPLICATION_ID: i32 = 0x4750_4B47;
/// `PRAGMA user_version` for GeoPackage 1.2.
pub const GEOPACKAGE_USER_VERSION: i32 = 10200;

pub const SPATIAL_REF_SYS_TABLE: &str = "gpkg_spatial_ref_sys";
pub const CONTENTS_TABLE: &str = "gpkg_contents";

const CREATE_SPATIAL_REF_SYS: &str = "CREATE TABLE IF NOT EXISTS gpkg_spatial_ref_sys (
	srs_name TEXT NOT NULL,
	srs_id INTEGER NOT NULL PRIMARY KEY,
	organization TEXT NOT NULL,
	organization_coordsys_id INTEGER NOT NULL,
	definition TEXT NOT NULL,
	description TEXT
);";

const CREATE_CONTENTS: &str = "CREATE TABLE IF NOT EXISTS gpkg_contents (
	table_name TEXT NOT NULL PRIMARY KEY,
	data_type TEXT NOT NULL,
	identifier TEXT UNIQUE,
	description TEXT DEFAULT '',
	last_change DATETIME NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
	min_x DOUBLE,
	min_y DOUBLE,
	max_x DOUBLE,
	max_y DOUBLE,
	srs_id INTEGER,
	CONSTRAINT fk_gc_r_srs_id FOREIGN KEY (srs_id) REFERENCES gpkg_spatial_ref_sys(srs_id)
);";

pub const WGS84_DEFINITION: &str = "GEOGCS[\"WGS 84\",DATUM[\"WGS_1984\",SPHEROID[\"WGS 84\",6378137,298.257223563,AUTHORITY[\"EPSG\",\"7030\"]],AUTHORITY[\"EPSG\",\"6326\"]],PRIMEM[\"Greenwich\",0,AUTHORITY[\"EPSG\",\"8901\"]],UNIT[\"degree\",0.01745329251994328,AUTHORITY[\"EPSG\",\"9122\"]],AUTHORITY[\"EPSG\",\"4326\"]]";

/// The reference systems every GeoPackage must define:
/// `(name, srs_id, organization, organization_srs_id, definition, description)`.
pub const DEFAULT_SPATIAL_REFERENCE_SYSTEMS: [(&str, i32, &str, i32, &str, &str); 3] = [
	(
		"World Geodetic System (WGS) 1984",
		4326,
		"EPSG",
		4326,
		WGS84_DEFINITION,
		"World Geodetic System 1984",
	),
	(
		"Undefined Cartesian Coordinate Reference System",
		-1,
		"NONE",
		-1,
		"undefined",
		"Undefined Cartesian coordinate reference system",
	),
	(
		"Undefined Geographic Coordinate Reference System",
		0,
		"NONE",
		0,
		"undefined",
		"Undefined geographic coordinate reference system",
	),
];

const SELECT_SRS: &str = "SELECT srs_name, srs_id, organization, organization_coordsys_id, definition, description FROM gpkg_spatial_ref_sys";

/// A row of `gpkg_contents`.
#[derive(Clone, Debug, PartialEq)]
pub struct Content {
	pub table_name: String,
	/// `tiles`, `features` or an extension type.
	pub data_type: String,
	pub identifier: Option<String>,
	pub description: Option<String>,
	pub last_change: String,
	pub bounding_box: Option<BoundingBox>,
	pub srs_id: Option<i32>,
}

pub struct Catalog<'a> {
	storage: &'a StorageView,
}

impl<'a> Catalog<'a> {
	pub fn new(storage: &'a StorageView) -> Catalog<'a> {
		Catalog { storage }
	}

	/// Creates the SRS and contents tables and inserts the default reference
	/// systems. Existing tables and rows are left untouched.
	#[context("creating the core tables of '{}'", self.storage.name())]
	pub fn create_tables(&self) -> Result<()> {
		log::debug!("create core tables");
		self.storage.transaction(|tx| {
			tx.execute_batch(&format!(
				"PRAGMA application_id = {GEOPACKAGE_APPLICATION_ID}; PRAGMA user_version = {GEOPACKAGE_USER_VERSION};"
			))?;
			tx.execute_batch(CREATE_SPATIAL_REF_SYS)?;
			tx.execute_batch(CREATE_CONTENTS)?;
			for (name, srs_id, organization, organization_srs_id, definition, description) in
				DEFAULT_SPATIAL_REFERENCE_SYSTEMS
			{
				tx.execute(
					"INSERT OR IGNORE INTO gpkg_spatial_ref_sys (srs_name, srs_id, organization, organization_coordsys_id, definition, description) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
					params![name, srs_id, organization, organization_srs_id, definition, description],
				)?;
			}
			Ok(())
		})
	}

	/// Adds a reference system and returns it with its assigned `srs_id`.
	///
	/// If the organization and code are already registered with an equal
	/// definition, the existing row is returned. A registered code with a
	/// different definition is a precondition error.
	#[context("adding spatial reference system {organization}:{organization_srs_id}")]
	pub fn add_spatial_reference_system(
		&self,
		name: &str,
		organization: &str,
		organization_srs_id: i32,
		definition: &str,
		description: Option<&str>,
	) -> Result<SpatialReferenceSystem> {
		precondition!(!name.is_empty(), "spatial reference system name may not be empty");
		precondition!(!organization.is_empty(), "organization may not be empty");
		precondition!(!definition.is_empty(), "definition may not be empty");

		if let Some(existing) = self.get_spatial_reference_system_by_code(organization, organization_srs_id)? {
			if existing.same_definition(name, organization, organization_srs_id, definition) {
				return Ok(existing);
			}
			bail_precondition!(
				"A spatial reference system already exists with this organization and organization-assigned numeric identifier, but has different values for its other fields"
			);
		}

		let srs_id = self
			.storage
			.query_value::<i32>("SELECT COALESCE(MAX(srs_id), 0) + 1 FROM gpkg_spatial_ref_sys", [])?
			.unwrap_or(1);
		let srs = SpatialReferenceSystem::new(name, srs_id, organization, organization_srs_id, definition, description)?;

		self.storage.transaction(|tx| {
			tx.execute(
				"INSERT INTO gpkg_spatial_ref_sys (srs_name, srs_id, organization, organization_coordsys_id, definition, description) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
				params![srs.name, srs.srs_id, srs.organization, srs.organization_srs_id, srs.definition, srs.description],
			)?;
			Ok(())
		})?;
		log::debug!("added spatial reference system {} as srs_id {srs_id}", srs.crs()?);
		Ok(srs)
	}

	#[context("getting spatial reference system {srs_id}")]
	pub fn get_spatial_reference_system(&self, srs_id: i32) -> Result<Option<SpatialReferenceSystem>> {
		let mut rows = self
			.storage
			.query_rows(&format!("{SELECT_SRS} WHERE srs_id = ?1"), [srs_id], srs_from_row)?;
		Ok(rows.pop())
	}

	/// Looks a reference system up by organization (case-insensitive) and code.
	#[context("getting spatial reference system {organization}:{organization_srs_id}")]
	pub fn get_spatial_reference_system_by_code(
		&self,
		organization: &str,
		organization_srs_id: i32,
	) -> Result<Option<SpatialReferenceSystem>> {
		let mut rows = self.storage.query_rows(
			&format!("{SELECT_SRS} WHERE organization = ?1 COLLATE NOCASE AND organization_coordsys_id = ?2"),
			params![organization, organization_srs_id],
			srs_from_row,
		)?;
		Ok(rows.pop())
	}

	#[context("getting content '{table_name}'")]
	pub fn get_content(&self, table_name: &str) -> Result<Option<Content>> {
		if !self.storage.table_or_view_exists(CONTENTS_TABLE)? {
			return Ok(None);
		}
		let mut rows = self.storage.query_rows(
			"SELECT table_name, data_type, identifier, description, last_change, min_x, min_y, max_x, max_y, srs_id FROM gpkg_contents WHERE table_name = ?1",
			[table_name],
			content_from_row,
		)?;
		Ok(rows.pop())
	}
}

fn srs_from_row(row: &Row<'_>) -> r2d2_sqlite::rusqlite::Result<SpatialReferenceSystem> {
	Ok(SpatialReferenceSystem {
		name: row.get(0)?,
		srs_id: row.get(1)?,
		organization: row.get(2)?,
		organization_srs_id: row.get(3)?,
		definition: row.get(4)?,
		description: row.get(5)?,
	})
}

fn content_from_row(row: &Row<'_>) -> r2d2_sqlite::rusqlite::Result<Content> {
	let bounds: [Option<f64>; 4] = [row.get(5)?, row.get(6)?, row.get(7)?, row.get(8)?];
	let bounding_box = match bounds {
		[Some(min_x), Some(min_y), Some(max_x), Some(max_y)] => Some(BoundingBox {
			min_x,
			min_y,
			max_x,
			max_y,
		}),
		_ => None,
	};
	Ok(Content {
		table_name: row.get(0)?,
		data_type: row.get(1)?,
		identifier: row.get(2)?,
		description: row.get(3)?,
		last_change: row.get(4)?,
		bounding_box,
		srs_id: row.get(9)?,
	})
}
