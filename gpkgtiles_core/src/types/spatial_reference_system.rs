use crate::{CoordinateReferenceSystem, precondition};
use anyhow::Result;

/// One row of the `gpkg_spatial_ref_sys` catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpatialReferenceSystem {
	pub name: String,
	/// Identifier of the row inside this GeoPackage.
	pub srs_id: i32,
	/// Defining organisation, e.g. `EPSG`.
	pub organization: String,
	/// Code assigned by the organisation.
	pub organization_srs_id: i32,
	/// Well-known text of the reference system.
	pub definition: String,
	pub description: Option<String>,
}

impl SpatialReferenceSystem {
	pub fn new(
		name: &str,
		srs_id: i32,
		organization: &str,
		organization_srs_id: i32,
		definition: &str,
		description: Option<&str>,
	) -> Result<SpatialReferenceSystem> {
		precondition!(!name.is_empty(), "spatial reference system name may not be empty");
		precondition!(!organization.is_empty(), "organization may not be empty");
		precondition!(!definition.is_empty(), "definition may not be empty");
		Ok(SpatialReferenceSystem {
			name: name.to_string(),
			srs_id,
			organization: organization.to_string(),
			organization_srs_id,
			definition: definition.to_string(),
			description: description.map(str::to_string),
		})
	}

	/// The authority/code pair coordinates in this system are tagged with.
	pub fn crs(&self) -> Result<CoordinateReferenceSystem> {
		CoordinateReferenceSystem::new(&self.organization, self.organization_srs_id)
	}

	/// Compares everything except `srs_id` and `description`.
	pub fn same_definition(&self, name: &str, organization: &str, organization_srs_id: i32, definition: &str) -> bool {
		self.name == name
			&& self.organization.eq_ignore_ascii_case(organization)
			&& self.organization_srs_id == organization_srs_id
			&& self.definition == definition
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn crs_of_srs() -> Result<()> {
		let srs = SpatialReferenceSystem::new("WGS 84", 4326, "EPSG", 4326, "GEOGCS[...]", None)?;
		assert_eq!(srs.crs()?, CoordinateReferenceSystem::new("epsg", 4326)?);
		assert!(srs.same_definition("WGS 84", "epsg", 4326, "GEOGCS[...]"));
		assert!(!srs.same_definition("WGS 84", "EPSG", 4326, "other"));
		Ok(())
	}

	#[test]
	fn empty_fields_are_rejected() {
		assert!(SpatialReferenceSystem::new("", 1, "EPSG", 1, "x", None).is_err());
		assert!(SpatialReferenceSystem::new("a", 1, "", 1, "x", None).is_err());
		assert!(SpatialReferenceSystem::new("a", 1, "EPSG", 1, "", None).is_err());
	}
}
