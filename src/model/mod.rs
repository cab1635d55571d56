//! In-memory CMDL document model.
//!
//! These are plain data types. Fields the format derives from the structure
//! itself (section count, material count, surface count, TEV stage count,
//! UV animation section size, extra data size) are not stored here; the
//! encoder recomputes them every time.
//!
//! ## Example
//!
//! ```ignore
//! use cmdl::prelude::*;
//!
//! let model = Cmdl::from_bytes(&bytes, &CodecOptions::default())?;
//! for (i, surface) in model.surfaces.iter().enumerate() {
//!     let material = model.material(surface.header.material_index);
//!     println!("surface {}: {} batches, material {:?}", i, surface.primitives.len(), material.map(|m| m.flags));
//! }
//! ```

mod attributes;
mod material;
mod surface;

pub use attributes::*;
pub use material::*;
pub use surface::*;

use std::fmt;

use crate::codec::format::{FLAG_COMPRESSED_NORMALS, FLAG_LIGHTMAP_UVS};
use crate::codec::options::Game;
use crate::util::AABox;

/// 32-bit reference to another asset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub u32);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

impl From<u32> for AssetId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// A decoded CMDL document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cmdl {
    /// Model version (2 = Prime, 4 = Echoes, 5 = Corruption).
    pub version: u32,
    /// Model flag bits (see `FLAG_*` constants).
    pub flags: u32,
    /// Model bounding box.
    pub aabox: AABox,
    /// Material sets; surfaces index into set 0.
    pub material_sets: Vec<MaterialSet>,
    /// Vertex attribute arrays.
    pub attrib_arrays: AttributeArrays,
    /// Stored surface offsets, one per surface.
    pub surface_offsets: SurfaceOffsets,
    /// Surfaces in stream order.
    pub surfaces: Vec<Surface>,
}

impl Cmdl {
    /// Create an empty document for a model version.
    pub fn new(version: u32) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    /// Create an empty document for a game.
    pub fn for_game(game: Game) -> Self {
        Self::new(game.model_version())
    }

    /// Game that writes this document's version, if known.
    pub fn game(&self) -> Option<Game> {
        Game::from_model_version(self.version)
    }

    /// Check if the lightmap UV array is flagged as present.
    pub fn has_lightmap_uvs(&self) -> bool {
        self.flags & FLAG_LIGHTMAP_UVS != 0
    }

    /// Check if normals are flagged as compressed.
    pub fn has_compressed_normals(&self) -> bool {
        self.flags & FLAG_COMPRESSED_NORMALS != 0
    }

    /// Number of framed sections this document encodes to.
    pub fn section_count(&self) -> usize {
        self.material_sets.len() + self.attrib_arrays.present_count() + 1 + self.surfaces.len()
    }

    /// Materials of material set 0, the set surfaces refer to.
    pub fn materials(&self) -> &[Material] {
        self.material_sets
            .first()
            .map(|set| set.materials.as_slice())
            .unwrap_or(&[])
    }

    /// Material of set 0 by index.
    pub fn material(&self, index: u32) -> Option<&Material> {
        self.materials().get(index as usize)
    }

    /// Total number of primitive batches across all surfaces.
    pub fn batch_count(&self) -> usize {
        self.surfaces.iter().map(|s| s.primitives.len()).sum()
    }

    /// Total number of vertex records across all surfaces.
    pub fn vertex_count(&self) -> usize {
        self.surfaces.iter().map(Surface::vertex_count).sum()
    }
}
