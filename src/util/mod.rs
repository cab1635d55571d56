//! Utility types shared across the codec.
//!
//! - [`Error`] / [`Result`] - Error handling
//! - [`AABox`] and vector re-exports from glam

mod error;
mod math;

pub use error::*;
pub use math::*;
