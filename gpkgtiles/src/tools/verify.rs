use anyhow::Result;
use clap::Args;
use colored::{ColoredString, Colorize};
use gpkgtiles_container::{Config, StorageView, verify};
use gpkgtiles_core::{ConformanceError, Issue, Severity, VerificationLevel};
use std::path::PathBuf;

#[derive(Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// GeoPackage file to verify
	#[arg(required = true)]
	filename: PathBuf,

	/// verification level, overrides the level of the config file
	#[arg(long, short, value_enum)]
	level: Option<VerificationLevel>,

	/// YAML config file
	#[arg(long, short)]
	config: Option<PathBuf>,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	let mut config = match &arguments.config {
		Some(path) => Config::from_path(path)?,
		None => Config::default(),
	};
	if let Some(level) = arguments.level {
		config = config.with_verification_level(level);
	}
	log::debug!("{config:?}");

	eprintln!(
		"verify {:?} at level {}",
		arguments.filename, config.verification_level
	);

	let storage = StorageView::open(&arguments.filename, config.pool_size)?;
	match verify(&storage, config.verification_level) {
		Ok(issues) => {
			for issue in &issues {
				println!("{}", paint(issue));
			}
			println!("{}", summary(&issues));
			Ok(())
		}
		Err(err) => {
			if let Some(conformance) = err.downcast_ref::<ConformanceError>() {
				for issue in conformance.issues() {
					println!("{}", paint(issue));
				}
			}
			Err(err)
		}
	}
}

fn paint(issue: &Issue) -> ColoredString {
	let text = issue.to_string();
	match issue.severity {
		Severity::Error => text.red(),
		Severity::Warning => text.yellow(),
		Severity::Skipped => text.dimmed(),
	}
}

fn summary(issues: &[Issue]) -> String {
	if issues.is_empty() {
		String::from("conformant")
	} else {
		format!("conformant with {} warning(s)", issues.len())
	}
}
