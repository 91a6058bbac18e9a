//! Conformance verification of tile pyramids.
//!
//! [`verify`] collects a [`VerificationContext`] once and runs every rule of
//! [`RULES`] against it.

mod context;
pub use context::*;

mod rules;
pub use rules::*;

pub mod table_definition;

mod verifier;
pub use verifier::*;
