use assert_cmd::{Command, cargo};
use assert_fs::TempDir;
use gpkgtiles_container::{Config, GeoPackage, StorageView, testing::add_sample_pyramid};
use predicates::str;
use rstest::rstest;
use std::path::PathBuf;

#[cfg(windows)]
const BINARY_NAME: &str = "gpkgtiles.exe";
#[cfg(not(windows))]
const BINARY_NAME: &str = "gpkgtiles";

fn sample_geopackage() -> Result<(TempDir, PathBuf), Box<dyn std::error::Error>> {
	let dir = TempDir::new()?;
	let path = dir.path().join("sample.gpkg");
	let gpkg = GeoPackage::create(&path, &Config::default())?;
	add_sample_pyramid(gpkg.storage(), "sample")?;
	Ok((dir, path))
}

#[test]
fn command() -> Result<(), Box<dyn std::error::Error>> {
	Command::new(cargo::cargo_bin!())
		.assert()
		.failure()
		.code(2)
		.stdout(str::is_empty())
		.stderr(str::contains(format!("Usage: {BINARY_NAME} [OPTIONS] <COMMAND>")));
	Ok(())
}

#[rstest]
#[case("verify", "[OPTIONS] <FILENAME>")]
#[case("probe", "[OPTIONS] <FILENAME>")]
#[case("locate", "[OPTIONS] <FILENAME> <TABLE> <ZOOM> <X> <Y>")]
fn subcommand(#[case] sub_command: &str, #[case] usage: &str) -> Result<(), Box<dyn std::error::Error>> {
	Command::new(cargo::cargo_bin!())
		.arg(sub_command)
		.assert()
		.failure()
		.code(2)
		.stdout(str::is_empty())
		.stderr(str::contains(format!("Usage: {BINARY_NAME} {sub_command} {usage}")));
	Ok(())
}

#[test]
fn verify_conformant() -> Result<(), Box<dyn std::error::Error>> {
	let (_dir, path) = sample_geopackage()?;
	Command::new(cargo::cargo_bin!())
		.args(["verify", "--level", "full"])
		.arg(&path)
		.assert()
		.success()
		.stdout(str::contains("conformant"));
	Ok(())
}

#[test]
fn verify_non_conformant() -> Result<(), Box<dyn std::error::Error>> {
	let (_dir, path) = sample_geopackage()?;
	StorageView::open(&path, 1)?.execute_batch("DROP TABLE gpkg_tile_matrix;")?;
	Command::new(cargo::cargo_bin!())
		.arg("verify")
		.arg(&path)
		.assert()
		.failure()
		.stdout(str::contains("Requirement 42 (tile_matrix_table): Missing gpkg_tile_matrix definition."))
		.stderr(str::contains("GeoPackage is not conformant: 1 error(s)"));
	Ok(())
}

#[test]
fn probe() -> Result<(), Box<dyn std::error::Error>> {
	let (_dir, path) = sample_geopackage()?;
	Command::new(cargo::cargo_bin!())
		.arg("probe")
		.arg(&path)
		.assert()
		.success()
		.stdout(str::contains("tile set 'sample'"))
		.stdout(str::contains("zoom 1: 2x2 tiles of 256x256 px, 4 stored"));
	Ok(())
}

#[test]
fn locate() -> Result<(), Box<dyn std::error::Error>> {
	let (_dir, path) = sample_geopackage()?;
	Command::new(cargo::cargo_bin!())
		.arg("locate")
		.arg(&path)
		.args(["sample", "1", "20", "0.01"])
		.assert()
		.success()
		.stdout(str::contains("tile 1/1/1"));
	Ok(())
}

#[test]
fn locate_outside() -> Result<(), Box<dyn std::error::Error>> {
	let (_dir, path) = sample_geopackage()?;
	Command::new(cargo::cargo_bin!())
		.arg("locate")
		.arg(&path)
		.args(["sample", "1", "-10", "5"])
		.assert()
		.failure();
	Ok(())
}
