use super::{RULES, Rule, VerificationContext};
use crate::StorageView;
use anyhow::Result;
use gpkgtiles_core::{ConformanceError, Issue, Severity, VerificationLevel};
use gpkgtiles_derive::context;

/// Verifies the tile pyramids of `storage` at `level`.
///
/// Returns the warnings if no rule reported an error, and a
/// [`ConformanceError`] carrying every issue otherwise. At
/// [`VerificationLevel::None`] nothing is read.
#[context("verifying '{}' at level {level}", storage.name())]
pub fn verify(storage: &StorageView, level: VerificationLevel) -> Result<Vec<Issue>> {
	if level == VerificationLevel::None {
		log::debug!("verification of '{}' disabled", storage.name());
		return Ok(vec![]);
	}

	let context = VerificationContext::new(storage, level)?;
	let issues = run_rules(&context, RULES);

	if issues.iter().any(Issue::is_error) {
		return Err(ConformanceError::new(issues).into());
	}
	log::debug!("'{}' verified with {} warning(s)", storage.name(), issues.len());
	Ok(issues)
}

/// Runs `rules` in order and returns their issues, skipped ones excluded.
pub fn run_rules(context: &VerificationContext, rules: &[Rule]) -> Vec<Issue> {
	let mut issues = Vec::new();
	for rule in rules {
		for issue in rule.run(context) {
			match issue.severity {
				Severity::Skipped => {
					log::debug!("{issue}");
					continue;
				}
				Severity::Warning => log::warn!("{issue}"),
				Severity::Error => log::error!("{issue}"),
			}
			issues.push(issue);
		}
	}
	issues
}
