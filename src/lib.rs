//! # CMDL
//!
//! Byte-exact reader and writer for CMDL model files (magic `0xDEADBABE`),
//! the static model container used by the Metroid Prime series.
//!
//! Decoding followed by encoding reproduces the input exactly, padding
//! included. Count and size fields that the format derives from the data
//! are rebuilt on every encode.
//!
//! ## Modules
//!
//! - [`util`] - Errors and math types
//! - [`codec`] - Schema-driven binary machinery (readers, writers, nodes, sections)
//! - [`model`] - In-memory document types
//! - [`schema`] - The CMDL layout built from codec nodes
//!
//! ## Example
//!
//! ```ignore
//! use cmdl::prelude::*;
//!
//! let bytes = std::fs::read("model.cmdl")?;
//! let options = CodecOptions::for_game(Game::Prime);
//! let model = Cmdl::from_bytes(&bytes, &options)?;
//!
//! println!("{} surfaces, {} positions", model.surfaces.len(), model.attrib_arrays.positions.len());
//! assert_eq!(model.to_bytes(&options)?, bytes);
//! ```

pub mod util;
pub mod codec;
pub mod model;
pub mod schema;

// Re-export commonly used types
pub use util::{Error, Result};
pub use codec::{CodecOptions, Game, SectionKind, SectionLayout, Strictness};
pub use model::Cmdl;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{AABox, Error, Result, Vec2, Vec3, Vec4};
    pub use crate::codec::{CodecOptions, Game, SectionInfo, SectionKind, SectionLayout, Strictness};
    pub use crate::model::*;
    pub use crate::schema::{decode, decode_with_layout, encode, encode_with_layout};
}
