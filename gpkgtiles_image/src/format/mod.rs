//! Decoders and encoders per image encoding, plus the payload checks built on them.

mod all;
pub use all::*;

pub mod jpeg;
pub mod png;
pub mod webp;
