//! Synthetic value generation for masked fields.
//!
//! The engine only sees the [`ValueGenerator`] capability. [`FakerGenerator`]
//! backs it with the `fake` crate for real runs; [`SequenceGenerator`] gives
//! tests predictable values.

pub mod errors;
pub mod faker;
pub mod generator;
pub mod locales;
pub mod semantic;
pub mod sequence;

pub use errors::GenerationError;
pub use faker::FakerGenerator;
pub use generator::{MASKED, MASKED_ERROR, MaskedValue, ValueGenerator, masked_value};
pub use locales::LocaleKey;
pub use sequence::SequenceGenerator;
