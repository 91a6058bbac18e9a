use std::fmt::Display;

/// How a failed verification rule affects the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
	/// The rule does not apply at the active verification level.
	Skipped,
	/// Recommended behaviour is violated. Reported, never fatal.
	Warning,
	/// A mandatory requirement is violated. The container is not conformant.
	Error,
}

impl Severity {
	pub fn as_str(&self) -> &str {
		match self {
			Severity::Skipped => "skipped",
			Severity::Warning => "warning",
			Severity::Error => "error",
		}
	}
}

impl Display for Severity {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn display() {
		assert_eq!(Severity::Skipped.to_string(), "skipped");
		assert_eq!(Severity::Warning.to_string(), "warning");
		assert_eq!(Severity::Error.to_string(), "error");
	}

	#[test]
	fn error_is_most_severe() {
		let worst = [Severity::Warning, Severity::Error, Severity::Skipped].into_iter().max();
		assert_eq!(worst, Some(Severity::Error));
	}
}
