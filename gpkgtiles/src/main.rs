mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{ErrorLevel, Verbosity};

#[derive(Parser, Debug)]
#[command(
	author,
	version,
	about,
	long_about = None,
	propagate_version = true,
	disable_help_subcommand = true,
)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	#[command(flatten)]
	verbose: Verbosity<ErrorLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
	#[clap(alias = "check")]
	/// Verify the tile pyramids of a GeoPackage
	Verify(tools::verify::Subcommand),

	/// Show the tile sets of a GeoPackage
	Probe(tools::probe::Subcommand),

	/// Find the tile containing a coordinate
	Locate(tools::locate::Subcommand),
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	env_logger::Builder::new()
		.filter_level(cli.verbose.log_level_filter())
		.format_timestamp(None)
		.init();

	run(cli)
}

fn run(cli: Cli) -> Result<()> {
	match &cli.command {
		Commands::Verify(arguments) => tools::verify::run(arguments),
		Commands::Probe(arguments) => tools::probe::run(arguments),
		Commands::Locate(arguments) => tools::locate::run(arguments),
	}
}
