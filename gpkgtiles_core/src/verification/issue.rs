use crate::Severity;
use std::fmt::Display;

/// A single finding of a verification rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
	/// Identifier of the rule that produced the issue, e.g. `tile_row_range`.
	pub rule_id: String,
	/// The requirement the rule checks, e.g. `Requirement 57`.
	pub reference: String,
	pub severity: Severity,
	pub message: String,
}

impl Issue {
	pub fn new(rule_id: &str, reference: &str, severity: Severity, message: impl Into<String>) -> Self {
		Self {
			rule_id: rule_id.to_string(),
			reference: reference.to_string(),
			severity,
			message: message.into(),
		}
	}

	pub fn is_error(&self) -> bool {
		self.severity == Severity::Error
	}
}

impl Display for Issue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "[{}] {} ({}): {}", self.severity, self.reference, self.rule_id, self.message)
	}
}
