//! The configured thoroughness of conformance verification.
//!
//! # Examples
//!
//! ```
//! use gpkgtiles_core::VerificationLevel;
//!
//! assert_eq!(VerificationLevel::parse_str("full").unwrap(), VerificationLevel::Full);
//! assert_eq!(VerificationLevel::default(), VerificationLevel::Fast);
//! assert!(VerificationLevel::Full.decodes_tiles());
//! assert!(!VerificationLevel::Fast.decodes_tiles());
//! ```

use anyhow::{Result, bail};
#[cfg(feature = "cli")]
use clap::ValueEnum;
use serde::Deserialize;
use std::{fmt::Display, str::FromStr};

/// Selects which verification rules run.
///
/// Each level is a superset of the one before it.
#[cfg_attr(feature = "cli", derive(ValueEnum))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationLevel {
	/// Skip verification entirely.
	None,
	/// Run every rule except those decoding tile payloads.
	#[default]
	Fast,
	/// Run every rule, including image decoding of every tile.
	Full,
}

impl VerificationLevel {
	pub fn as_str(&self) -> &str {
		match self {
			VerificationLevel::None => "none",
			VerificationLevel::Fast => "fast",
			VerificationLevel::Full => "full",
		}
	}

	/// Whether rules that read every tile payload are executed.
	pub fn decodes_tiles(&self) -> bool {
		*self == VerificationLevel::Full
	}

	pub fn parse_str(value: &str) -> Result<Self> {
		Ok(match value.to_lowercase().trim() {
			"none" | "off" => VerificationLevel::None,
			"fast" => VerificationLevel::Fast,
			"full" => VerificationLevel::Full,
			_ => bail!("Unknown verification level '{value}'. Expected none, fast or full"),
		})
	}
}

impl Display for VerificationLevel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for VerificationLevel {
	type Err = anyhow::Error;

	fn from_str(s: &str) -> Result<Self> {
		VerificationLevel::parse_str(s)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("none", VerificationLevel::None)]
	#[case("off", VerificationLevel::None)]
	#[case("Fast", VerificationLevel::Fast)]
	#[case(" FULL ", VerificationLevel::Full)]
	fn parse(#[case] input: &str, #[case] expected: VerificationLevel) {
		assert_eq!(VerificationLevel::parse_str(input).unwrap(), expected);
		assert_eq!(input.parse::<VerificationLevel>().unwrap(), expected);
	}

	#[test]
	fn parse_unknown() {
		let err = VerificationLevel::parse_str("paranoid").unwrap_err();
		assert_eq!(
			err.to_string(),
			"Unknown verification level 'paranoid'. Expected none, fast or full"
		);
	}

	#[test]
	fn display_round_trips() {
		for level in [VerificationLevel::None, VerificationLevel::Fast, VerificationLevel::Full] {
			assert_eq!(VerificationLevel::parse_str(&level.to_string()).unwrap(), level);
		}
	}

	#[test]
	fn ordering() {
		assert!(VerificationLevel::None < VerificationLevel::Fast);
		assert!(VerificationLevel::Fast < VerificationLevel::Full);
	}
}
