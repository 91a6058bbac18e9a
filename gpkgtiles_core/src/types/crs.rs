use crate::precondition;
use anyhow::Result;
use std::fmt::Display;

/// A coordinate reference system named by its defining authority and the
/// numeric code that authority assigned, e.g. `EPSG:4326`.
///
/// Authorities compare case-insensitively (`epsg` equals `EPSG`), codes
/// compare exactly.
#[derive(Debug, Clone, Eq)]
pub struct CoordinateReferenceSystem {
	authority: String,
	identifier: i32,
}

impl CoordinateReferenceSystem {
	pub fn new(authority: &str, identifier: i32) -> Result<CoordinateReferenceSystem> {
		precondition!(!authority.trim().is_empty(), "authority may not be empty");
		Ok(CoordinateReferenceSystem {
			authority: authority.to_string(),
			identifier,
		})
	}

	pub fn authority(&self) -> &str {
		&self.authority
	}

	pub fn identifier(&self) -> i32 {
		self.identifier
	}
}

impl PartialEq for CoordinateReferenceSystem {
	fn eq(&self, other: &Self) -> bool {
		self.identifier == other.identifier && self.authority.eq_ignore_ascii_case(&other.authority)
	}
}

impl Display for CoordinateReferenceSystem {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}:{}", self.authority, self.identifier)
	}
}

/// A point in a named coordinate reference system.
#[derive(Debug, Clone, PartialEq)]
pub struct CrsCoordinate {
	pub x: f64,
	pub y: f64,
	pub crs: CoordinateReferenceSystem,
}

impl CrsCoordinate {
	pub fn new(x: f64, y: f64, crs: CoordinateReferenceSystem) -> CrsCoordinate {
		CrsCoordinate { x, y, crs }
	}
}

impl Display for CrsCoordinate {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "({}, {}) {}", self.x, self.y, self.crs)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn authority_is_case_insensitive() -> Result<()> {
		assert_eq!(
			CoordinateReferenceSystem::new("EPSG", 4326)?,
			CoordinateReferenceSystem::new("epsg", 4326)?
		);
		assert_ne!(
			CoordinateReferenceSystem::new("EPSG", 4326)?,
			CoordinateReferenceSystem::new("EPSG", 3857)?
		);
		assert_ne!(
			CoordinateReferenceSystem::new("EPSG", 4326)?,
			CoordinateReferenceSystem::new("OGC", 4326)?
		);
		Ok(())
	}

	#[test]
	fn empty_authority() {
		let err = CoordinateReferenceSystem::new("  ", 1).unwrap_err();
		assert_eq!(err.to_string(), "authority may not be empty");
	}

	#[test]
	fn display() -> Result<()> {
		let coordinate = CrsCoordinate::new(13.4, 52.5, CoordinateReferenceSystem::new("EPSG", 4326)?);
		assert_eq!(coordinate.to_string(), "(13.4, 52.5) EPSG:4326");
		Ok(())
	}
}
