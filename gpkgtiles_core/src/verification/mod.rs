//! Value types produced and consumed by conformance verification.

mod issue;
pub use issue::*;

mod level;
pub use level::*;

mod severity;
pub use severity::*;
