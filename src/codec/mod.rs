//! Schema-driven binary codec machinery.
//!
//! This layer knows nothing about materials or surfaces. It provides:
//! - [`Reader`] / [`Writer`]: bounded big-endian cursors
//! - [`Context`]: the scope chain later fields consult
//! - [`Node`] and its implementations: primitives, composites,
//!   conditionals, vertex attribute variants
//! - [`Computed`]: fields rebuilt from the live structure on encode
//! - [`SectionTable`] / [`SectionStager`] / [`IndirectSection`]: the
//!   indirect-length section mechanism

pub mod format;
pub mod reader;
pub mod writer;
pub mod options;
pub mod context;
pub mod node;
pub mod composite;
pub mod conditional;
pub mod computed;
pub mod section;

pub use format::*;
pub use reader::Reader;
pub use writer::Writer;
pub use options::{CodecOptions, Game, Strictness};
pub use context::{Context, Root};
pub use node::*;
pub use composite::{Aligned, Bytes, FixedArray, Greedy, LengthPrefix, PrefixedArray, Record, Struct};
pub use conditional::{Conditional, Predicate, VertexAttribute, WidthCode};
pub use computed::Computed;
pub use section::{IndirectSection, SectionInfo, SectionKind, SectionLayout, SectionStager, SectionTable};
