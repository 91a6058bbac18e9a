use crate::{Issue, Severity};
use itertools::Itertools;
use std::fmt::{self, Display};

/// Invalid caller input: a disallowed name, a non-positive dimension, a
/// coordinate outside the pyramid, a reference-system mismatch and the like.
///
/// Raised before any storage mutation. Usually created through
/// [`precondition!`](crate::precondition) or
/// [`bail_precondition!`](crate::bail_precondition).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreconditionError(String);

impl PreconditionError {
	pub fn new(message: impl Into<String>) -> Self {
		Self(message.into())
	}

	pub fn message(&self) -> &str {
		&self.0
	}
}

impl Display for PreconditionError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl std::error::Error for PreconditionError {}

/// Raised by verification when at least one rule reported an
/// [`Severity::Error`]. Carries every collected issue, warnings included.
#[derive(Debug, Clone, PartialEq)]
pub struct ConformanceError {
	issues: Vec<Issue>,
}

impl ConformanceError {
	pub fn new(issues: Vec<Issue>) -> Self {
		Self { issues }
	}

	pub fn issues(&self) -> &[Issue] {
		&self.issues
	}

	pub fn into_issues(self) -> Vec<Issue> {
		self.issues
	}

	pub fn errors(&self) -> impl Iterator<Item = &Issue> {
		self.issues.iter().filter(|issue| issue.severity == Severity::Error)
	}
}

impl Display for ConformanceError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let errors = self.errors().count();
		let warnings = self.issues.iter().filter(|i| i.severity == Severity::Warning).count();
		write!(
			f,
			"GeoPackage is not conformant: {errors} error(s), {warnings} warning(s) [{}]",
			self.errors().map(|issue| issue.reference.as_str()).join(", ")
		)
	}
}

impl std::error::Error for ConformanceError {}

/// The three kinds of failure surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	/// Invalid input, see [`PreconditionError`].
	Precondition,
	/// Anything raised by the storage layer (SQLite, connection pool).
	Storage,
	/// Verification found Error-severity issues, see [`ConformanceError`].
	Conformance,
}

impl ErrorKind {
	/// Classifies an error by walking its cause chain.
	///
	/// Context layers added with `anyhow::Context` or `#[context]` are skipped,
	/// so a precondition failure deep inside a call stays recognisable.
	pub fn of(err: &anyhow::Error) -> ErrorKind {
		for cause in err.chain() {
			if cause.downcast_ref::<PreconditionError>().is_some() {
				return ErrorKind::Precondition;
			}
			if cause.downcast_ref::<ConformanceError>().is_some() {
				return ErrorKind::Conformance;
			}
		}
		ErrorKind::Storage
	}
}
