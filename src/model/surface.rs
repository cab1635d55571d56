//! Surfaces: header, primitive batches and vertex index records.

use crate::util::Vec3;

/// Stored surface offsets (the surface header section).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SurfaceOffsets {
    /// One offset per surface, kept as stored.
    pub offsets: Vec<u32>,
}

/// One surface: header plus its display list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Surface {
    pub header: SurfaceHeader,
    /// Batches decoded until the section ends. Section padding shows up as
    /// trailing empty batches of type 0.
    pub primitives: Vec<PrimitiveBatch>,
}

impl Surface {
    /// Number of vertex records across all batches.
    pub fn vertex_count(&self) -> usize {
        self.primitives.iter().map(|p| p.vertices.len()).sum()
    }

    /// Batches that carry geometry.
    pub fn batches(&self) -> impl Iterator<Item = &PrimitiveBatch> {
        self.primitives.iter().filter(|p| !p.is_padding())
    }
}

/// Surface header.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurfaceHeader {
    pub center_point: Vec3,
    /// Index into material set 0; selects the vertex layout.
    pub material_index: u32,
    pub mantissa: u16,
    pub display_list_size: u16,
    /// Runtime pointer storage, carried through unchanged.
    pub parent_model_pointer_storage: u32,
    /// Runtime pointer storage, carried through unchanged.
    pub next_surface_pointer_storage: u32,
    pub surface_normal: Vec3,
    /// Present from version 4.
    pub unk_1: Option<u16>,
    /// Present from version 4.
    pub unk_2: Option<u16>,
    /// Trailing header bytes; the stored size is derived from this.
    pub extra_data: Vec<u8>,
}

/// GX primitive opcodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GxPrimitive {
    Quads,
    Triangles,
    TriangleStrip,
    TriangleFan,
    Lines,
    LineStrip,
    Points,
}

impl GxPrimitive {
    /// Decode the opcode bits of a batch type byte (vertex format bits masked off).
    pub fn from_type(primitive_type: u8) -> Option<Self> {
        match primitive_type & 0xF8 {
            0x80 => Some(Self::Quads),
            0x90 => Some(Self::Triangles),
            0x98 => Some(Self::TriangleStrip),
            0xA0 => Some(Self::TriangleFan),
            0xA8 => Some(Self::Lines),
            0xB0 => Some(Self::LineStrip),
            0xB8 => Some(Self::Points),
            _ => None,
        }
    }

    /// Number of triangles a batch of `vertices` produces.
    pub fn triangle_count(self, vertices: usize) -> usize {
        match self {
            Self::Triangles => vertices / 3,
            Self::TriangleStrip | Self::TriangleFan => vertices.saturating_sub(2),
            Self::Quads => vertices / 4 * 2,
            Self::Lines | Self::LineStrip | Self::Points => 0,
        }
    }
}

/// A primitive type byte and its vertex records.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PrimitiveBatch {
    pub primitive_type: u8,
    pub vertices: Vec<Vertex>,
}

impl PrimitiveBatch {
    /// Decoded primitive kind, if the type byte is a known opcode.
    pub fn primitive(&self) -> Option<GxPrimitive> {
        GxPrimitive::from_type(self.primitive_type)
    }

    /// Check if this batch is zero padding read as an empty type-0 batch.
    pub fn is_padding(&self) -> bool {
        self.primitive_type == 0 && self.vertices.is_empty()
    }
}

/// Per-vertex attribute indices.
///
/// Each field is present, one byte or two bytes wide as selected by the
/// owning material's `vertex_attribute_flags`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Vertex {
    pub matrix_position: Option<u16>,
    pub matrix_tex: [Option<u16>; 7],
    pub position: Option<u16>,
    pub normal: Option<u16>,
    pub color_0: Option<u16>,
    pub color_1: Option<u16>,
    pub tex: [Option<u16>; 8],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_decoding() {
        let batch = PrimitiveBatch { primitive_type: 0x98, vertices: vec![Vertex::default(); 5] };
        assert_eq!(batch.primitive(), Some(GxPrimitive::TriangleStrip));
        assert_eq!(GxPrimitive::TriangleStrip.triangle_count(5), 3);
        assert_eq!(GxPrimitive::from_type(0x93), Some(GxPrimitive::Triangles));
        assert_eq!(GxPrimitive::from_type(0), None);
    }

    #[test]
    fn test_padding_batches() {
        let surface = Surface {
            header: SurfaceHeader::default(),
            primitives: vec![
                PrimitiveBatch { primitive_type: 0x90, vertices: vec![Vertex::default(); 3] },
                PrimitiveBatch::default(),
                PrimitiveBatch::default(),
            ],
        };
        assert_eq!(surface.vertex_count(), 3);
        assert_eq!(surface.batches().count(), 1);
    }
}
