//! Conditional fields and the vertex attribute width variant.

use super::context::Context;
use super::node::Node;
use super::reader::Reader;
use super::writer::Writer;
use crate::util::{Error, Result};

/// Presence test evaluated against the context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Predicate {
    /// Any bit of `mask` set in a previously decoded sibling or ancestor field.
    FieldHasBits { field: &'static str, mask: u32 },
    /// All bits of the mask set in the document flags.
    RootFlag(u32),
    /// Document version at least this value.
    MinVersion(u32),
}

impl Predicate {
    /// Evaluate against the current scope.
    pub fn evaluate(&self, ctx: &Context<'_>) -> Result<bool> {
        Ok(match *self {
            Self::FieldHasBits { field, mask } => ctx.lookup(field)? & mask != 0,
            Self::RootFlag(mask) => ctx.root().has_flag(mask),
            Self::MinVersion(version) => ctx.root().version() >= version,
        })
    }

    /// Fail if the presence of an in-memory value disagrees with the predicate.
    pub fn check_presence(&self, present: bool, ctx: &Context<'_>) -> Result<bool> {
        let expected = self.evaluate(ctx)?;
        if expected != present {
            return Err(Error::PresenceMismatch { expected, actual: present });
        }
        Ok(expected)
    }
}

/// Field present only when a predicate holds.
#[derive(Clone, Copy, Debug)]
pub struct Conditional<N> {
    predicate: Predicate,
    inner: N,
}

impl<N> Conditional<N> {
    pub const fn new(predicate: Predicate, inner: N) -> Self {
        Self { predicate, inner }
    }
}

impl<N: Node> Node for Conditional<N> {
    type Value = Option<N::Value>;

    fn decode(&self, r: &mut Reader<'_>, ctx: &Context<'_>) -> Result<Option<N::Value>> {
        if self.predicate.evaluate(ctx)? {
            self.inner.decode(r, ctx).map(Some)
        } else {
            Ok(None)
        }
    }

    fn encode(&self, value: &Option<N::Value>, w: &mut Writer, ctx: &Context<'_>) -> Result<()> {
        self.predicate.check_presence(value.is_some(), ctx)?;
        match value {
            Some(v) => self.inner.encode(v, w, ctx),
            None => Ok(()),
        }
    }
}

/// Storage width selected by a 2-bit attribute code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidthCode {
    /// Code 0: attribute not stored.
    Absent,
    /// Codes 1 and 2: one-byte index.
    Narrow,
    /// Code 3: two-byte index.
    Wide,
}

impl WidthCode {
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            0 => Ok(Self::Absent),
            1 | 2 => Ok(Self::Narrow),
            3 => Ok(Self::Wide),
            other => Err(Error::UnsupportedVariant {
                field: "vertex_attribute_flags",
                detail: format!("width code {}", other),
            }),
        }
    }

    /// Encoded size in bytes.
    pub const fn size(self) -> usize {
        match self {
            Self::Absent => 0,
            Self::Narrow => 1,
            Self::Wide => 2,
        }
    }
}

/// Per-vertex attribute index whose width comes from the governing material.
///
/// The selector is `(material.vertex_attribute_flags & mask) >> shift`, with
/// the material found through the nearest enclosing surface header.
#[derive(Clone, Copy, Debug)]
pub struct VertexAttribute {
    mask: u32,
    shift: u32,
}

impl VertexAttribute {
    pub const fn new(mask: u32) -> Self {
        assert!(mask != 0, "vertex attribute mask must be non-zero");
        Self { mask, shift: mask.trailing_zeros() }
    }

    #[inline]
    pub const fn mask(&self) -> u32 {
        self.mask
    }

    /// Width selected for this attribute by a vertex attribute flag word.
    pub fn width_for(&self, flags: u32) -> Result<WidthCode> {
        WidthCode::from_code((flags & self.mask) >> self.shift)
    }

    fn width(&self, ctx: &Context<'_>) -> Result<WidthCode> {
        self.width_for(ctx.material()?.vertex_attribute_flags)
    }
}

impl Node for VertexAttribute {
    type Value = Option<u16>;

    fn decode(&self, r: &mut Reader<'_>, ctx: &Context<'_>) -> Result<Option<u16>> {
        Ok(match self.width(ctx)? {
            WidthCode::Absent => None,
            WidthCode::Narrow => Some(r.read_u8()? as u16),
            WidthCode::Wide => Some(r.read_u16()?),
        })
    }

    fn encode(&self, value: &Option<u16>, w: &mut Writer, ctx: &Context<'_>) -> Result<()> {
        let width = self.width(ctx)?;
        let expected = width != WidthCode::Absent;
        if expected != value.is_some() {
            return Err(Error::PresenceMismatch { expected, actual: value.is_some() });
        }
        match (width, value) {
            (WidthCode::Narrow, Some(v)) => {
                let byte = u8::try_from(*v).map_err(|_| Error::ValueOutOfRange { value: *v as u64, width: 1 })?;
                w.write_u8(byte)
            }
            (WidthCode::Wide, Some(v)) => w.write_u16(*v),
            _ => Ok(()),
        }
    }
}
