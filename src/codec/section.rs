//! Indirect-length sections.
//!
//! The stream carries a table of slots right after the fixed header. On
//! decode each slot's *address* is recorded, and the 4-byte length stored
//! there is read when the matching section is opened, in table order.
//!
//! Encode is two-phase: every section is first staged into its own buffer by
//! [`IndirectSection::encode`]; [`SectionStager`] then writes the table with
//! the now known lengths and appends the buffers in the same order. The
//! output cursor never moves backwards.

use std::fmt;

use super::context::Context;
use super::format::SECTION_SLOT_SIZE;
use super::node::Node;
use super::reader::Reader;
use super::writer::Writer;
use crate::util::{Error, Result};

/// Logical content of a framed section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SectionKind {
    MaterialSet(usize),
    Positions,
    Normals,
    Colors,
    Uvs,
    LightmapUvs,
    SurfaceHeader,
    Surface(usize),
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaterialSet(i) => write!(f, "material_sets[{}]", i),
            Self::Positions => f.write_str("positions"),
            Self::Normals => f.write_str("normals"),
            Self::Colors => f.write_str("colors"),
            Self::Uvs => f.write_str("uvs"),
            Self::LightmapUvs => f.write_str("lightmap_uvs"),
            Self::SurfaceHeader => f.write_str("surface_header"),
            Self::Surface(i) => write!(f, "surfaces[{}]", i),
        }
    }
}

/// Position of one framed section in the stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectionInfo {
    pub kind: SectionKind,
    /// Absolute offset of the first content byte.
    pub offset: usize,
    /// Framed length from the section table.
    pub length: usize,
}

impl SectionInfo {
    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// Sections of a document in emission order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SectionLayout {
    /// Number of slots in the stream's section table.
    pub slot_count: usize,
    pub sections: Vec<SectionInfo>,
}

impl SectionLayout {
    #[inline]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SectionInfo> {
        self.sections.iter()
    }

    /// Find a section by kind.
    pub fn get(&self, kind: SectionKind) -> Option<&SectionInfo> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    /// Total bytes of framed section content.
    pub fn content_size(&self) -> usize {
        self.sections.iter().map(|s| s.length).sum()
    }
}

/// Decode-side section table.
#[derive(Debug)]
pub struct SectionTable {
    slots: Vec<usize>,
    next: usize,
    layout: SectionLayout,
}

impl SectionTable {
    /// Record the addresses of `count` slots at the cursor and skip past them.
    pub fn read(r: &mut Reader<'_>, count: usize) -> Result<Self> {
        let mut slots = Vec::with_capacity(count.min(r.remaining() / SECTION_SLOT_SIZE));
        for _ in 0..count {
            slots.push(r.offset());
            r.skip(SECTION_SLOT_SIZE)?;
        }
        tracing::debug!("section table: {} slots", count);
        Ok(Self {
            slots,
            next: 0,
            layout: SectionLayout { slot_count: count, sections: Vec::new() },
        })
    }

    /// Number of slots in the table.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots already consumed by opened sections.
    #[inline]
    pub fn consumed(&self) -> usize {
        self.next
    }

    /// Consume the next slot and frame the following bytes as `kind`.
    pub fn open<'a>(&mut self, r: &mut Reader<'a>, kind: SectionKind) -> Result<Reader<'a>> {
        let slot = *self.slots.get(self.next).ok_or_else(|| {
            Error::LengthTableDesync(format!(
                "no slot left for {} (table has {} entries)",
                kind,
                self.slots.len()
            ))
        })?;
        self.next += 1;

        let length = r.u32_at(slot)? as usize;
        let offset = r.offset();
        tracing::debug!("section {}: offset {:#x}, length {}", kind, offset, length);
        let window = r.take(length)?;
        self.layout.sections.push(SectionInfo { kind, offset, length });
        Ok(window)
    }

    /// Layout of every section opened so far.
    pub fn into_layout(self) -> SectionLayout {
        self.layout
    }
}

/// Encode-side staging area for framed sections.
#[derive(Debug, Default)]
pub struct SectionStager {
    sections: Vec<(SectionKind, Vec<u8>)>,
}

impl SectionStager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: SectionKind, bytes: Vec<u8>) {
        tracing::debug!("staged section {}: {} bytes", kind, bytes.len());
        self.sections.push((kind, bytes));
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Total staged bytes.
    pub fn content_size(&self) -> usize {
        self.sections.iter().map(|(_, b)| b.len()).sum()
    }

    /// Write one length slot per staged section, in staging order.
    pub fn write_table(&self, w: &mut Writer) -> Result<()> {
        for (kind, bytes) in &self.sections {
            let length = u32::try_from(bytes.len()).map_err(|_| {
                Error::LengthTableDesync(format!("section {} is {} bytes long", kind, bytes.len()))
            })?;
            w.write_u32(length)?;
        }
        Ok(())
    }

    /// Append every staged buffer and report where each one landed.
    pub fn append_to(self, w: &mut Writer) -> Result<SectionLayout> {
        let mut layout = SectionLayout {
            slot_count: self.sections.len(),
            sections: Vec::with_capacity(self.sections.len()),
        };
        for (kind, bytes) in self.sections {
            layout.sections.push(SectionInfo { kind, offset: w.pos(), length: bytes.len() });
            w.write_bytes(&bytes)?;
        }
        Ok(layout)
    }
}

/// Section framed through the length table.
#[derive(Clone, Copy, Debug)]
pub struct IndirectSection<N> {
    inner: N,
}

impl<N: Node> IndirectSection<N> {
    pub const fn new(inner: N) -> Self {
        Self { inner }
    }

    /// Decode the next section; its content must be consumed exactly.
    pub fn decode(
        &self,
        table: &mut SectionTable,
        r: &mut Reader<'_>,
        kind: SectionKind,
        ctx: &Context<'_>,
    ) -> Result<N::Value> {
        let mut window = table.open(r, kind)?;
        let value = self.inner.decode(&mut window, ctx)?;
        if !window.is_exhausted() {
            return Err(Error::TrailingBytes {
                offset: window.offset(),
                remaining: window.remaining(),
            });
        }
        Ok(value)
    }

    /// Serialize the section into its own buffer and stage it.
    pub fn encode(
        &self,
        value: &N::Value,
        stager: &mut SectionStager,
        kind: SectionKind,
        ctx: &Context<'_>,
    ) -> Result<()> {
        let mut w = Writer::new();
        self.inner.encode(value, &mut w, ctx)?;
        stager.push(kind, w.into_bytes());
        Ok(())
    }
}
