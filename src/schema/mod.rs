//! The CMDL document layout.
//!
//! Stream layout (big-endian):
//!
//! ```text
//! magic            u32  0xDEADBABE
//! version          u32
//! flags            u32
//! aabox            6 x f32
//! section_count    u32  (rebuilt on encode)
//! material_sets    u32  (rebuilt on encode)
//! section table    section_count x u32 lengths
//! padding          to 32 bytes
//! sections         material sets, positions, normals, colors, uvs,
//!                  [lightmap uvs], surface header, surfaces
//! ```
//!
//! Every section is framed through the table and padded to 32 bytes inside
//! its frame, so each one starts on a 32-byte boundary.

mod attributes;
mod material;
mod surface;

pub use attributes::{lightmap_uv, NormalEncoding};
pub use surface::vertex_size;

use tracing::{debug, warn};

use crate::codec::*;
use crate::model::{Cmdl, MaterialSet, Surface};
use crate::util::{Error, Result};

use attributes::{decode_attributes, encode_attributes};
use material::MATERIAL_SET;
use surface::{SURFACE, SURFACE_OFFSETS};

const SECTION_COUNT: Computed = Computed::new("section_count");
const MATERIAL_SET_COUNT: Computed = Computed::new("material_set_count");

/// Decode a CMDL document.
pub fn decode(bytes: &[u8], options: &CodecOptions) -> Result<Cmdl> {
    decode_with_layout(bytes, options).map(|(model, _)| model)
}

/// Decode a CMDL document and report where each section was found.
#[tracing::instrument(skip_all, fields(len = bytes.len()))]
pub fn decode_with_layout(bytes: &[u8], options: &CodecOptions) -> Result<(Cmdl, SectionLayout)> {
    let mut r = Reader::new(bytes);

    let magic = r.read_u32()?;
    if magic != CMDL_MAGIC {
        return Err(Error::MagicMismatch { found: magic });
    }
    let version = r.read_u32()?;
    let flags = r.read_u32()?;
    options.check_version(version)?;
    debug!("header: version {}, flags {:#x}", version, flags);

    let root = Root::new(version, flags, options);
    let ctx = Context::new(&root);
    let aabox = ctx.decode_field("aabox", &BoundingBox, &mut r)?;
    let section_count = SECTION_COUNT.decode(&mut r)?;
    let material_set_count = MATERIAL_SET_COUNT.decode(&mut r)?;

    let mut table = SectionTable::read(&mut r, section_count as usize)?;
    let offset = r.offset();
    let padding = r.align_to(SECTION_ALIGNMENT)?;
    options.check_padding(offset, padding)?;

    let mut material_sets = Vec::with_capacity((material_set_count as usize).min(table.slot_count()));
    for i in 0..material_set_count as usize {
        let scope = ctx.item("material_sets", i);
        let set = MATERIAL_SET
            .decode(&mut table, &mut r, SectionKind::MaterialSet(i), &scope)
            .map_err(|e| scope.attach(e))?;
        material_sets.push(set);
    }

    let attrib_arrays = decode_attributes(&mut table, &mut r, &ctx)?;

    let scope = ctx.child("surface_offsets");
    let surface_offsets = SURFACE_OFFSETS
        .decode(&mut table, &mut r, SectionKind::SurfaceHeader, &scope)
        .map_err(|e| scope.attach(e))?;

    let surfaces = decode_surfaces(&mut table, &mut r, &root, &material_sets, surface_offsets.offsets.len())?;

    SECTION_COUNT.verify(section_count, table.consumed(), &ctx)?;
    if !r.is_exhausted() {
        let err = Error::TrailingBytes { offset: r.offset(), remaining: r.remaining() };
        if options.is_strict() {
            return Err(err);
        }
        warn!("{}", err);
    }

    let model = Cmdl {
        version,
        flags,
        aabox,
        material_sets,
        attrib_arrays,
        surface_offsets,
        surfaces,
    };
    debug!(
        "decoded {} sections, {} surfaces",
        table.consumed(),
        model.surfaces.len()
    );
    Ok((model, table.into_layout()))
}

/// Surfaces resolve their vertex layout through material set 0.
fn decode_surfaces(
    table: &mut SectionTable,
    r: &mut Reader<'_>,
    root: &Root<'_>,
    material_sets: &[MaterialSet],
    count: usize,
) -> Result<Vec<Surface>> {
    let materials = material_sets.first().map(|set| set.materials.as_slice()).unwrap_or(&[]);
    let root = root.with_materials(materials);
    let ctx = Context::new(&root);

    let mut surfaces = Vec::with_capacity(count.min(table.slot_count()));
    for i in 0..count {
        let scope = ctx.item("surfaces", i);
        let surface = SURFACE
            .decode(table, r, SectionKind::Surface(i), &scope)
            .map_err(|e| scope.attach(e))?;
        surfaces.push(surface);
    }
    Ok(surfaces)
}

/// Encode a CMDL document.
pub fn encode(model: &Cmdl, options: &CodecOptions) -> Result<Vec<u8>> {
    encode_with_layout(model, options).map(|(bytes, _)| bytes)
}

/// Encode a CMDL document and report where each section was written.
#[tracing::instrument(skip_all, fields(version = model.version))]
pub fn encode_with_layout(model: &Cmdl, options: &CodecOptions) -> Result<(Vec<u8>, SectionLayout)> {
    options.check_version(model.version)?;

    let root = Root::new(model.version, model.flags, options);
    let ctx = Context::new(&root);

    // Stage every section first; lengths are only known afterwards.
    let mut stager = SectionStager::new();
    for (i, set) in model.material_sets.iter().enumerate() {
        let scope = ctx.item("material_sets", i);
        MATERIAL_SET
            .encode(set, &mut stager, SectionKind::MaterialSet(i), &scope)
            .map_err(|e| scope.attach(e))?;
    }

    encode_attributes(&model.attrib_arrays, &mut stager, &ctx)?;

    let mut scope = ctx.child("surface_offsets");
    let surface_count = u32::try_from(model.surfaces.len()).map_err(|_| Error::ValueOutOfRange {
        value: model.surfaces.len() as u64,
        width: 4,
    })?;
    scope.set("surface_count", surface_count);
    SURFACE_OFFSETS
        .encode(&model.surface_offsets, &mut stager, SectionKind::SurfaceHeader, &scope)
        .map_err(|e| scope.attach(e))?;

    encode_surfaces(&mut stager, &root, model)?;

    let derived = model.section_count();
    if stager.len() != derived {
        return Err(Error::LengthTableDesync(format!(
            "staged {} sections, document has {}",
            stager.len(),
            derived
        )));
    }

    let table_size = stager.len() * SECTION_SLOT_SIZE;
    let mut w = Writer::with_capacity(
        align_up(FIXED_HEADER_SIZE + table_size, SECTION_ALIGNMENT) + stager.content_size(),
    );
    w.write_u32(CMDL_MAGIC)?;
    w.write_u32(model.version)?;
    w.write_u32(model.flags)?;
    ctx.encode_field("aabox", &BoundingBox, &model.aabox, &mut w)?;
    SECTION_COUNT.encode(stager.len(), &mut w)?;
    MATERIAL_SET_COUNT.encode(model.material_sets.len(), &mut w)?;
    stager.write_table(&mut w)?;
    w.pad_to(SECTION_ALIGNMENT)?;
    let layout = stager.append_to(&mut w)?;

    debug!("encoded {} sections, {} bytes", layout.len(), w.pos());
    Ok((w.into_bytes(), layout))
}

fn encode_surfaces(stager: &mut SectionStager, root: &Root<'_>, model: &Cmdl) -> Result<()> {
    let root = root.with_materials(model.materials());
    let ctx = Context::new(&root);
    for (i, surface) in model.surfaces.iter().enumerate() {
        let scope = ctx.item("surfaces", i);
        SURFACE
            .encode(surface, stager, SectionKind::Surface(i), &scope)
            .map_err(|e| scope.attach(e))?;
    }
    Ok(())
}

impl Cmdl {
    /// Decode a document from bytes.
    pub fn from_bytes(bytes: &[u8], options: &CodecOptions) -> Result<Self> {
        decode(bytes, options)
    }

    /// Decode a document and its section layout from bytes.
    pub fn from_bytes_with_layout(bytes: &[u8], options: &CodecOptions) -> Result<(Self, SectionLayout)> {
        decode_with_layout(bytes, options)
    }

    /// Encode this document.
    pub fn to_bytes(&self, options: &CodecOptions) -> Result<Vec<u8>> {
        encode(self, options)
    }
}
