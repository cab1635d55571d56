//! Vertex attribute array sections.

use half::f16;

use crate::codec::*;
use crate::model::AttributeArrays;
use crate::util::{Error, Result, Vec3};

const POSITIONS: IndirectSection<Aligned<Greedy<Vector3>>> =
    IndirectSection::new(Aligned::new(SECTION_ALIGNMENT, Greedy::new(Vector3)));
const NORMALS: IndirectSection<Aligned<Normals>> = IndirectSection::new(Aligned::new(SECTION_ALIGNMENT, Normals));
const COLORS: IndirectSection<Aligned<Greedy<Color4>>> =
    IndirectSection::new(Aligned::new(SECTION_ALIGNMENT, Greedy::new(Color4)));
const UVS: IndirectSection<Aligned<Greedy<Vector2>>> =
    IndirectSection::new(Aligned::new(SECTION_ALIGNMENT, Greedy::new(Vector2)));
const LIGHTMAP_UVS: IndirectSection<Aligned<Greedy<HalfVector2>>> =
    IndirectSection::new(Aligned::new(SECTION_ALIGNMENT, Greedy::new(HalfVector2)));

const LIGHTMAP_PRESENT: Predicate = Predicate::RootFlag(FLAG_LIGHTMAP_UVS);

/// Storage of the normal array, selected by the model flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NormalEncoding {
    /// Three f32 components per normal.
    Full,
    /// Half-precision vectors; not supported.
    Compressed,
}

impl NormalEncoding {
    pub fn from_flags(flags: u32) -> Self {
        if flags & FLAG_COMPRESSED_NORMALS != 0 {
            Self::Compressed
        } else {
            Self::Full
        }
    }
}

/// Normal array node; compressed normals fail in both directions.
#[derive(Clone, Copy, Debug, Default)]
struct Normals;

impl Normals {
    fn check(ctx: &Context<'_>) -> Result<()> {
        match NormalEncoding::from_flags(ctx.root().flags()) {
            NormalEncoding::Full => Ok(()),
            NormalEncoding::Compressed => Err(Error::UnsupportedVariant {
                field: "normals",
                detail: "compressed normals are not supported".into(),
            }),
        }
    }
}

impl Node for Normals {
    type Value = Vec<Vec3>;

    fn decode(&self, r: &mut Reader<'_>, ctx: &Context<'_>) -> Result<Vec<Vec3>> {
        Self::check(ctx)?;
        Greedy::new(Vector3).decode(r, ctx)
    }

    fn encode(&self, value: &Vec<Vec3>, w: &mut Writer, ctx: &Context<'_>) -> Result<()> {
        Self::check(ctx)?;
        Greedy::new(Vector3).encode(value, w, ctx)
    }
}

fn decode_array<N: Node>(
    section: &IndirectSection<N>,
    table: &mut SectionTable,
    r: &mut Reader<'_>,
    kind: SectionKind,
    name: &'static str,
    ctx: &Context<'_>,
) -> Result<N::Value> {
    let scope = ctx.child(name);
    section.decode(table, r, kind, &scope).map_err(|e| scope.attach(e))
}

fn encode_array<N: Node>(
    section: &IndirectSection<N>,
    value: &N::Value,
    stager: &mut SectionStager,
    kind: SectionKind,
    name: &'static str,
    ctx: &Context<'_>,
) -> Result<()> {
    let scope = ctx.child(name);
    section.encode(value, stager, kind, &scope).map_err(|e| scope.attach(e))
}

/// Decode the four or five attribute array sections.
pub(crate) fn decode_attributes(
    table: &mut SectionTable,
    r: &mut Reader<'_>,
    ctx: &Context<'_>,
) -> Result<AttributeArrays> {
    let positions = decode_array(&POSITIONS, table, r, SectionKind::Positions, "positions", ctx)?;
    let normals = decode_array(&NORMALS, table, r, SectionKind::Normals, "normals", ctx)?;
    let colors = decode_array(&COLORS, table, r, SectionKind::Colors, "colors", ctx)?;
    let uvs = decode_array(&UVS, table, r, SectionKind::Uvs, "uvs", ctx)?;
    let lightmap_uvs = if LIGHTMAP_PRESENT.evaluate(ctx)? {
        Some(decode_array(&LIGHTMAP_UVS, table, r, SectionKind::LightmapUvs, "lightmap_uvs", ctx)?)
    } else {
        None
    };
    tracing::debug!(
        positions = positions.len(),
        normals = normals.len(),
        colors = colors.len(),
        uvs = uvs.len(),
        lightmap_uvs = lightmap_uvs.as_ref().map(Vec::len),
        "attribute arrays"
    );

    Ok(AttributeArrays {
        positions,
        normals,
        colors,
        uvs,
        lightmap_uvs,
    })
}

/// Stage the attribute array sections.
pub(crate) fn encode_attributes(
    arrays: &AttributeArrays,
    stager: &mut SectionStager,
    ctx: &Context<'_>,
) -> Result<()> {
    encode_array(&POSITIONS, &arrays.positions, stager, SectionKind::Positions, "positions", ctx)?;
    encode_array(&NORMALS, &arrays.normals, stager, SectionKind::Normals, "normals", ctx)?;
    encode_array(&COLORS, &arrays.colors, stager, SectionKind::Colors, "colors", ctx)?;
    encode_array(&UVS, &arrays.uvs, stager, SectionKind::Uvs, "uvs", ctx)?;

    let scope = ctx.child("lightmap_uvs");
    LIGHTMAP_PRESENT
        .check_presence(arrays.lightmap_uvs.is_some(), &scope)
        .map_err(|e| scope.attach(e))?;
    if let Some(lightmap_uvs) = &arrays.lightmap_uvs {
        encode_array(&LIGHTMAP_UVS, lightmap_uvs, stager, SectionKind::LightmapUvs, "lightmap_uvs", ctx)?;
    }
    Ok(())
}

/// Half-float pair from two f32 values.
pub fn lightmap_uv(u: f32, v: f32) -> [f16; 2] {
    [f16::from_f32(u), f16::from_f32(v)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::{Vec2, Vec4};

    fn stage(arrays: &AttributeArrays, flags: u32) -> Result<SectionStager> {
        let options = CodecOptions::default();
        let root = Root::new(2, flags, &options);
        let ctx = Context::new(&root);
        let mut stager = SectionStager::new();
        encode_attributes(arrays, &mut stager, &ctx)?;
        Ok(stager)
    }

    fn decode(stager: SectionStager, flags: u32) -> Result<(AttributeArrays, SectionLayout)> {
        let mut w = Writer::new();
        stager.write_table(&mut w)?;
        let slots = stager.len();
        w.pad_to(SECTION_ALIGNMENT)?;
        stager.append_to(&mut w)?;
        let bytes = w.into_bytes();

        let options = CodecOptions::default();
        let root = Root::new(2, flags, &options);
        let ctx = Context::new(&root);
        let mut r = Reader::new(&bytes);
        let mut table = SectionTable::read(&mut r, slots)?;
        r.align_to(SECTION_ALIGNMENT)?;
        let arrays = decode_attributes(&mut table, &mut r, &ctx)?;
        assert!(r.is_exhausted());
        Ok((arrays, table.into_layout()))
    }

    #[test]
    fn test_arrays_pad_to_sections() {
        let arrays = AttributeArrays {
            positions: vec![Vec3::ONE; 8],
            normals: vec![Vec3::Y],
            colors: vec![Vec4::ONE; 2],
            uvs: vec![Vec2::ZERO; 4],
            lightmap_uvs: None,
        };
        let stager = stage(&arrays, 0).unwrap();
        assert_eq!(stager.len(), 4);
        // 96, 32, 32 and 32 bytes.
        assert_eq!(stager.content_size(), 96 + 32 + 32 + 32);

        let (decoded, layout) = decode(stager, 0).unwrap();
        assert_eq!(decoded.positions, arrays.positions);
        assert_eq!(decoded.colors, arrays.colors);
        assert_eq!(decoded.uvs, arrays.uvs);
        // The normal section's padding reads back as extra zero vectors.
        assert_eq!(decoded.normals[0], Vec3::Y);
        assert_eq!(decoded.normals.len(), 2);
        assert!(layout.get(SectionKind::LightmapUvs).is_none());
        assert!(layout.iter().all(|s| s.offset % 32 == 0 && s.length % 32 == 0));
    }

    #[test]
    fn test_lightmap_follows_flag() {
        let arrays = AttributeArrays {
            lightmap_uvs: Some(vec![lightmap_uv(0.5, 0.25); 3]),
            ..AttributeArrays::default()
        };
        let stager = stage(&arrays, FLAG_LIGHTMAP_UVS).unwrap();
        assert_eq!(stager.len(), 5);
        let (decoded, layout) = decode(stager, FLAG_LIGHTMAP_UVS).unwrap();
        let lightmap = decoded.lightmap_uvs.unwrap();
        assert_eq!(lightmap.len(), 8);
        assert_eq!(lightmap[2], lightmap_uv(0.5, 0.25));
        assert_eq!(layout.get(SectionKind::LightmapUvs).map(|s| s.length), Some(32));

        let err = stage(&arrays, 0).unwrap_err();
        assert_eq!(err.path(), Some("cmdl/lightmap_uvs"));
        assert!(matches!(err.root_cause(), Error::PresenceMismatch { expected: false, actual: true }));
    }

    #[test]
    fn test_compressed_normals_rejected() {
        let arrays = AttributeArrays::default();
        let err = stage(&arrays, FLAG_COMPRESSED_NORMALS).unwrap_err();
        assert_eq!(err.path(), Some("cmdl/normals"));
        assert!(matches!(err.root_cause(), Error::UnsupportedVariant { field: "normals", .. }));

        // Same bytes, reread with the compressed flag set.
        let stager = stage(&arrays, 0).unwrap();
        let err = decode(stager, FLAG_COMPRESSED_NORMALS).unwrap_err();
        assert!(matches!(err.root_cause(), Error::UnsupportedVariant { field: "normals", .. }));
    }
}
