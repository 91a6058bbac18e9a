use anyhow::{Result, bail, ensure};
use gpkgtiles_derive::context;

#[context("checking zoom level {}", zoom)]
fn check_zoom(zoom: i32) -> Result<i32> {
	ensure!(zoom >= 0, "zoom level {zoom} is negative");
	Ok(zoom * 2)
}

#[context("early return for '{}'", name)]
fn early_return(name: &str) -> Result<usize> {
	if name.is_empty() {
		return Ok(0);
	}
	bail!("name '{name}' is not empty")
}

#[context(move, "consuming {} values", len)]
fn consume(values: Vec<i32>, len: usize) -> Result<i32> {
	let sum: i32 = values.into_iter().sum();
	ensure!(sum > 0, "sum is not positive");
	Ok(sum)
}

struct Counter(u32);

impl Counter {
	#[context("incrementing counter at {}", self.0)]
	fn increment(&mut self, limit: u32) -> Result<u32> {
		ensure!(self.0 < limit, "limit {limit} reached");
		self.0 += 1;
		Ok(self.0)
	}
}

#[test]
fn passes_through_ok_values() -> Result<()> {
	assert_eq!(check_zoom(3)?, 6);
	assert_eq!(early_return("")?, 0);
	assert_eq!(consume(vec![1, 2, 3], 3)?, 6);
	Ok(())
}

#[test]
fn adds_context_to_errors() {
	let err = check_zoom(-1).unwrap_err();
	assert_eq!(err.to_string(), "checking zoom level -1");
	assert_eq!(err.root_cause().to_string(), "zoom level -1 is negative");

	let err = early_return("abc").unwrap_err();
	assert_eq!(format!("{err:#}"), "early return for 'abc': name 'abc' is not empty");

	let err = consume(vec![-5], 1).unwrap_err();
	assert_eq!(format!("{err:#}"), "consuming 1 values: sum is not positive");
}

#[test]
fn works_on_methods() {
	let mut counter = Counter(0);
	assert_eq!(counter.increment(1).unwrap(), 1);
	let err = counter.increment(1).unwrap_err();
	assert_eq!(format!("{err:#}"), "incrementing counter at 1: limit 1 reached");
}
