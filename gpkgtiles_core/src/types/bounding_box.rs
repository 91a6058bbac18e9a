use crate::precondition;
use anyhow::Result;
use std::fmt::{Debug, Display};

/// A rectangular area in the units of a spatial reference system.
///
/// The box is defined by four `f64` values:
/// - `min_x` (west)
/// - `min_y` (south)
/// - `max_x` (east)
/// - `max_y` (north)
///
/// Unlike a geographic bounding box the values are not limited to degrees; a
/// pyramid in a metre-based system stores metres here.
///
/// # Examples
///
/// ```
/// use gpkgtiles_core::BoundingBox;
///
/// let bbox = BoundingBox::new(0.0, 0.0, 30.0, 50.0).unwrap();
/// assert_eq!(bbox.width(), 30.0);
/// assert_eq!(bbox.height(), 50.0);
/// assert_eq!(bbox.top_left(), (0.0, 50.0));
/// assert!(bbox.contains(30.0, 0.0));
/// ```
#[derive(Clone, Copy, PartialEq)]
pub struct BoundingBox {
	pub min_x: f64,
	pub min_y: f64,
	pub max_x: f64,
	pub max_y: f64,
}

impl BoundingBox {
	/// Creates a new bounding box.
	///
	/// # Errors
	/// Fails with a precondition error if a value is not finite or if a
	/// minimum exceeds its maximum.
	pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<BoundingBox> {
		BoundingBox {
			min_x,
			min_y,
			max_x,
			max_y,
		}
		.checked()
	}

	/// Validates the box.
	pub fn checked(self) -> Result<BoundingBox> {
		precondition!(
			self.min_x.is_finite() && self.min_y.is_finite() && self.max_x.is_finite() && self.max_y.is_finite(),
			"bounding box {self} must only contain finite values"
		);
		precondition!(
			self.min_x <= self.max_x,
			"min_x ({}) must be less than or equal to max_x ({})",
			self.min_x,
			self.max_x
		);
		precondition!(
			self.min_y <= self.max_y,
			"min_y ({}) must be less than or equal to max_y ({})",
			self.min_y,
			self.max_y
		);
		Ok(self)
	}

	pub fn width(&self) -> f64 {
		self.max_x - self.min_x
	}

	pub fn height(&self) -> f64 {
		self.max_y - self.min_y
	}

	pub fn top_left(&self) -> (f64, f64) {
		(self.min_x, self.max_y)
	}

	pub fn top_right(&self) -> (f64, f64) {
		(self.max_x, self.max_y)
	}

	pub fn bottom_left(&self) -> (f64, f64) {
		(self.min_x, self.min_y)
	}

	pub fn bottom_right(&self) -> (f64, f64) {
		(self.max_x, self.min_y)
	}

	/// Returns `true` if the point lies inside the box or on its border.
	pub fn contains(&self, x: f64, y: f64) -> bool {
		x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
	}

	/// Rounds the box outward to `precision` decimal digits: minimums are
	/// floored, maximums are ceiled.
	///
	/// This absorbs floating-point drift between a stored box and boxes derived
	/// from tile sizes, so that points on the stored border stay inside.
	///
	/// ```
	/// use gpkgtiles_core::BoundingBox;
	///
	/// let bbox = BoundingBox::new(-0.123456, 1.000001, 2.5, 3.999999).unwrap();
	/// let rounded = bbox.round_outward(2);
	/// assert_eq!(rounded.as_tuple(), (-0.13, 1.0, 2.5, 4.0));
	/// ```
	pub fn round_outward(&self, precision: u32) -> BoundingBox {
		let divisor = 10f64.powi(precision as i32);
		BoundingBox {
			min_x: (self.min_x * divisor).floor() / divisor,
			min_y: (self.min_y * divisor).floor() / divisor,
			max_x: (self.max_x * divisor).ceil() / divisor,
			max_y: (self.max_y * divisor).ceil() / divisor,
		}
	}

	pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
		(self.min_x, self.min_y, self.max_x, self.max_y)
	}

	pub fn as_array(&self) -> [f64; 4] {
		[self.min_x, self.min_y, self.max_x, self.max_y]
	}
}

impl TryFrom<Vec<f64>> for BoundingBox {
	type Error = anyhow::Error;

	fn try_from(input: Vec<f64>) -> Result<Self> {
		precondition!(input.len() == 4, "bounding box needs 4 values, got {}", input.len());
		BoundingBox::new(input[0], input[1], input[2], input[3])
	}
}

impl Debug for BoundingBox {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "BoundingBox{self}")
	}
}

impl Display for BoundingBox {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "[{}, {}, {}, {}]", self.min_x, self.min_y, self.max_x, self.max_y)
	}
}
