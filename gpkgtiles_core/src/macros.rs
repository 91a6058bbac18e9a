//! Macros for raising [`PreconditionError`](crate::PreconditionError)s.
//!
//! They mirror `anyhow::ensure!` and `anyhow::bail!`, but the resulting error
//! can be recognised by [`ErrorKind::of`](crate::ErrorKind::of) as invalid
//! caller input rather than a storage failure.

/// Returns early with a [`PreconditionError`](crate::PreconditionError) if the
/// condition does not hold.
///
/// # Example
/// ```
/// use gpkgtiles_core::{ErrorKind, precondition};
/// use anyhow::Result;
///
/// fn half(value: i32) -> Result<i32> {
///     precondition!(value % 2 == 0, "{value} is odd");
///     Ok(value / 2)
/// }
///
/// assert_eq!(half(4).unwrap(), 2);
/// let err = half(3).unwrap_err();
/// assert_eq!(err.to_string(), "3 is odd");
/// assert_eq!(ErrorKind::of(&err), ErrorKind::Precondition);
/// ```
#[macro_export]
macro_rules! precondition {
	($condition:expr, $($arg:tt)+) => {
		if !$condition {
			return Err($crate::PreconditionError::new(format!($($arg)+)).into());
		}
	};
}

/// Returns early with a [`PreconditionError`](crate::PreconditionError).
#[macro_export]
macro_rules! bail_precondition {
	($($arg:tt)+) => {
		return Err($crate::PreconditionError::new(format!($($arg)+)).into())
	};
}

#[cfg(test)]
mod tests {
	use crate::{ErrorKind, PreconditionError};
	use anyhow::Result;

	fn positive(value: i32) -> Result<i32> {
		precondition!(value > 0, "value {} must be positive", value);
		Ok(value)
	}

	fn always_fails(name: &str) -> Result<()> {
		bail_precondition!("'{name}' is not allowed");
	}

	#[test]
	fn precondition_passes() {
		assert_eq!(positive(5).unwrap(), 5);
	}

	#[test]
	fn precondition_fails_with_typed_error() {
		let err = positive(-1).unwrap_err();
		assert_eq!(err.to_string(), "value -1 must be positive");
		assert!(err.downcast_ref::<PreconditionError>().is_some());
		assert_eq!(ErrorKind::of(&err), ErrorKind::Precondition);
	}

	#[test]
	fn bail_precondition_returns() {
		let err = always_fails("gpkg_x").unwrap_err();
		assert_eq!(err.to_string(), "'gpkg_x' is not allowed");
		assert_eq!(ErrorKind::of(&err), ErrorKind::Precondition);
	}
}
