//! Surface header section and surface layout.

use crate::codec::*;
use crate::model::{PrimitiveBatch, Surface, SurfaceHeader, SurfaceOffsets, Vertex};
use crate::util::Result;

const SURFACE_COUNT: Computed = Computed::new("surface_count");
const EXTRA_DATA_SIZE: Computed = Computed::new("extra_data_size");

const EXTENDED_HALF: Conditional<U16> = Conditional::new(Predicate::MinVersion(EXTENDED_FIELDS_VERSION), U16);
const HEADER: Aligned<Struct<SurfaceHeader>> = Aligned::new(SECTION_ALIGNMENT, Struct::new());
const PRIMITIVES: Greedy<Struct<PrimitiveBatch>> = Greedy::new(Struct::new());
const VERTICES: PrefixedArray<U16, Struct<Vertex>> = PrefixedArray::new(U16, Struct::new());

const MATRIX_POSITION: VertexAttribute = VertexAttribute::new(0x01 << 24);
const MATRIX_TEX: [VertexAttribute; 7] = [
    VertexAttribute::new(0x02 << 24),
    VertexAttribute::new(0x04 << 24),
    VertexAttribute::new(0x08 << 24),
    VertexAttribute::new(0x10 << 24),
    VertexAttribute::new(0x20 << 24),
    VertexAttribute::new(0x40 << 24),
    VertexAttribute::new(0x80 << 24),
];
const POSITION: VertexAttribute = VertexAttribute::new(0x0000_0003);
const NORMAL: VertexAttribute = VertexAttribute::new(0x0000_000C);
const COLOR_0: VertexAttribute = VertexAttribute::new(0x0000_0030);
const COLOR_1: VertexAttribute = VertexAttribute::new(0x0000_00C0);
const TEX: [VertexAttribute; 8] = [
    VertexAttribute::new(0x0000_0300),
    VertexAttribute::new(0x0000_0C00),
    VertexAttribute::new(0x0000_3000),
    VertexAttribute::new(0x0000_C000),
    VertexAttribute::new(0x0003_0000),
    VertexAttribute::new(0x000C_0000),
    VertexAttribute::new(0x0030_0000),
    VertexAttribute::new(0x00C0_0000),
];

/// Surface header section: surface count and stored offsets.
pub(crate) const SURFACE_OFFSETS: IndirectSection<Aligned<Struct<SurfaceOffsets>>> =
    IndirectSection::new(Aligned::new(SECTION_ALIGNMENT, Struct::new()));

/// One surface section.
pub(crate) const SURFACE: IndirectSection<Aligned<Struct<Surface>>> =
    IndirectSection::new(Aligned::new(SECTION_ALIGNMENT, Struct::new()));

impl Record for SurfaceOffsets {
    fn decode_fields(r: &mut Reader<'_>, scope: &mut Context<'_>) -> Result<Self> {
        let count = SURFACE_COUNT.decode(r)?;
        scope.set("surface_count", count);
        tracing::debug!("surface header: {} surfaces", count);
        let offsets = scope.decode_field("offsets", &FixedArray::new(count as usize, U32), r)?;
        Ok(Self { offsets })
    }

    /// The surface count comes from the enclosing document's surface list.
    fn encode_fields(&self, w: &mut Writer, scope: &mut Context<'_>) -> Result<()> {
        let count = scope.lookup("surface_count")? as usize;
        SURFACE_COUNT.encode(count, w)?;
        scope.encode_field("offsets", &FixedArray::new(count, U32), &self.offsets, w)
    }
}

/// Every surface must name a material of set 0, whether or not it has vertices.
fn check_material(header: &SurfaceHeader, scope: &Context<'_>) -> Result<()> {
    let field = scope.child("header");
    match field.root().material(header.material_index) {
        Ok(_) => Ok(()),
        Err(e) => Err(field.attach(e)),
    }
}

impl Record for Surface {
    fn decode_fields(r: &mut Reader<'_>, scope: &mut Context<'_>) -> Result<Self> {
        let header = scope.decode_field("header", &HEADER, r)?;
        check_material(&header, scope)?;
        let primitives = {
            let body = scope.with_header(&header);
            body.decode_field("primitives", &PRIMITIVES, r)?
        };
        Ok(Self { header, primitives })
    }

    fn encode_fields(&self, w: &mut Writer, scope: &mut Context<'_>) -> Result<()> {
        check_material(&self.header, scope)?;
        scope.encode_field("header", &HEADER, &self.header, w)?;
        let body = scope.with_header(&self.header);
        body.encode_field("primitives", &PRIMITIVES, &self.primitives, w)
    }
}

impl Record for SurfaceHeader {
    fn decode_fields(r: &mut Reader<'_>, scope: &mut Context<'_>) -> Result<Self> {
        let center_point = Vector3.decode(r, scope)?;
        let material_index = U32.decode(r, scope)?;
        let mantissa = U16.decode(r, scope)?;
        let display_list_size = U16.decode(r, scope)?;
        let parent_model_pointer_storage = U32.decode(r, scope)?;
        let next_surface_pointer_storage = U32.decode(r, scope)?;
        let extra_data_size = EXTRA_DATA_SIZE.decode(r)?;
        let surface_normal = Vector3.decode(r, scope)?;
        let unk_1 = scope.decode_field("unk_1", &EXTENDED_HALF, r)?;
        let unk_2 = scope.decode_field("unk_2", &EXTENDED_HALF, r)?;
        let extra_data = scope.decode_field("extra_data", &Bytes::new(extra_data_size as usize), r)?;
        tracing::trace!(material_index, extra_data_size, "surface header");

        Ok(Self {
            center_point,
            material_index,
            mantissa,
            display_list_size,
            parent_model_pointer_storage,
            next_surface_pointer_storage,
            surface_normal,
            unk_1,
            unk_2,
            extra_data,
        })
    }

    fn encode_fields(&self, w: &mut Writer, scope: &mut Context<'_>) -> Result<()> {
        Vector3.encode(&self.center_point, w, scope)?;
        U32.encode(&self.material_index, w, scope)?;
        U16.encode(&self.mantissa, w, scope)?;
        U16.encode(&self.display_list_size, w, scope)?;
        U32.encode(&self.parent_model_pointer_storage, w, scope)?;
        U32.encode(&self.next_surface_pointer_storage, w, scope)?;
        EXTRA_DATA_SIZE.encode(self.extra_data.len(), w)?;
        Vector3.encode(&self.surface_normal, w, scope)?;
        scope.encode_field("unk_1", &EXTENDED_HALF, &self.unk_1, w)?;
        scope.encode_field("unk_2", &EXTENDED_HALF, &self.unk_2, w)?;
        scope.encode_field("extra_data", &Bytes::new(self.extra_data.len()), &self.extra_data, w)
    }
}

impl Record for PrimitiveBatch {
    fn decode_fields(r: &mut Reader<'_>, scope: &mut Context<'_>) -> Result<Self> {
        let primitive_type = U8.decode(r, scope)?;
        let vertices = scope.decode_field("vertices", &VERTICES, r)?;
        Ok(Self { primitive_type, vertices })
    }

    fn encode_fields(&self, w: &mut Writer, scope: &mut Context<'_>) -> Result<()> {
        U8.encode(&self.primitive_type, w, scope)?;
        scope.encode_field("vertices", &VERTICES, &self.vertices, w)
    }
}

impl Record for Vertex {
    fn decode_fields(r: &mut Reader<'_>, scope: &mut Context<'_>) -> Result<Self> {
        let mut vertex = Vertex {
            matrix_position: MATRIX_POSITION.decode(r, scope)?,
            ..Vertex::default()
        };
        for (slot, attr) in vertex.matrix_tex.iter_mut().zip(&MATRIX_TEX) {
            *slot = attr.decode(r, scope)?;
        }
        vertex.position = POSITION.decode(r, scope)?;
        vertex.normal = NORMAL.decode(r, scope)?;
        vertex.color_0 = COLOR_0.decode(r, scope)?;
        vertex.color_1 = COLOR_1.decode(r, scope)?;
        for (slot, attr) in vertex.tex.iter_mut().zip(&TEX) {
            *slot = attr.decode(r, scope)?;
        }
        Ok(vertex)
    }

    fn encode_fields(&self, w: &mut Writer, scope: &mut Context<'_>) -> Result<()> {
        MATRIX_POSITION.encode(&self.matrix_position, w, scope)?;
        for (value, attr) in self.matrix_tex.iter().zip(&MATRIX_TEX) {
            attr.encode(value, w, scope)?;
        }
        POSITION.encode(&self.position, w, scope)?;
        NORMAL.encode(&self.normal, w, scope)?;
        COLOR_0.encode(&self.color_0, w, scope)?;
        COLOR_1.encode(&self.color_1, w, scope)?;
        for (value, attr) in self.tex.iter().zip(&TEX) {
            attr.encode(value, w, scope)?;
        }
        Ok(())
    }
}

/// Encoded size of one vertex record under a vertex attribute flag word.
pub fn vertex_size(vertex_attribute_flags: u32) -> Result<usize> {
    let mut size = 0;
    for attr in [MATRIX_POSITION, POSITION, NORMAL, COLOR_0, COLOR_1]
        .iter()
        .chain(&MATRIX_TEX)
        .chain(&TEX)
    {
        size += attr.width_for(vertex_attribute_flags)?.size();
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Material;
    use crate::util::{Error, Vec3};

    fn materials() -> Vec<Material> {
        vec![
            // Position wide, normal narrow, tex0 narrow.
            Material { vertex_attribute_flags: 0x0000_0107, ..Material::default() },
            // Matrix position narrow, position narrow, tex1 wide.
            Material { vertex_attribute_flags: 0x0100_0C01, ..Material::default() },
        ]
    }

    fn surface(material_index: u32) -> Surface {
        let vertex = |p: u16| Vertex {
            position: Some(p),
            normal: Some(1),
            tex: [Some(2), None, None, None, None, None, None, None],
            ..Vertex::default()
        };
        Surface {
            header: SurfaceHeader {
                center_point: Vec3::new(1.0, 2.0, 3.0),
                material_index,
                mantissa: 0x8000,
                display_list_size: 0x20,
                surface_normal: Vec3::Z,
                extra_data: vec![0xAB; 5],
                ..SurfaceHeader::default()
            },
            primitives: vec![PrimitiveBatch {
                primitive_type: 0x90,
                vertices: vec![vertex(0x0100), vertex(7), vertex(8)],
            }],
        }
    }

    #[test]
    fn test_vertex_size() {
        assert_eq!(vertex_size(0).unwrap(), 0);
        assert_eq!(vertex_size(0x0000_0107).unwrap(), 2 + 1 + 1);
        assert_eq!(vertex_size(0x0100_0C01).unwrap(), 1 + 1 + 2);
        assert_eq!(vertex_size(0x00FF_FFFF).unwrap(), 2 * 12);
    }

    #[test]
    fn test_surface_round_trip() {
        let options = CodecOptions::default();
        let materials = materials();
        let base = Root::new(2, 0, &options);
        let root = base.with_materials(&materials);
        let ctx = Context::new(&root);
        let surface = surface(0);

        let mut w = Writer::new();
        Aligned::new(32, Struct::<Surface>::new()).encode(&surface, &mut w, &ctx).unwrap();
        let bytes = w.into_bytes();
        // Header: 44 fixed bytes + 5 extra, padded to 64; one batch of 3 + 3 * 4 bytes.
        assert_eq!(bytes.len(), 96);
        assert_eq!(&bytes[44..49], &[0xAB; 5]);
        assert_eq!(&bytes[64..70], &[0x90, 0x00, 0x03, 0x01, 0x00, 0x01]);

        let mut r = Reader::new(&bytes);
        let decoded = Aligned::new(32, Struct::<Surface>::new()).decode(&mut r, &ctx).unwrap();
        assert!(r.is_exhausted());
        assert_eq!(decoded.header, surface.header);
        assert_eq!(decoded.primitives[0], surface.primitives[0]);
        // 17 padding bytes after the batch come back as empty type-0 batches.
        assert_eq!(decoded.primitives.len(), 1 + 5);
        assert!(decoded.primitives[1..].iter().all(PrimitiveBatch::is_padding));

        let mut w = Writer::new();
        Aligned::new(32, Struct::<Surface>::new()).encode(&decoded, &mut w, &ctx).unwrap();
        assert_eq!(w.into_bytes(), bytes);
    }

    #[test]
    fn test_vertex_layout_follows_material() {
        let options = CodecOptions::default();
        let materials = materials();
        let base = Root::new(2, 0, &options);
        let root = base.with_materials(&materials);
        let ctx = Context::new(&root);

        let vertex = Vertex {
            matrix_position: Some(3),
            position: Some(4),
            tex: [None, Some(0x1234), None, None, None, None, None, None],
            ..Vertex::default()
        };
        let header = SurfaceHeader { material_index: 1, ..SurfaceHeader::default() };
        let body = ctx.with_header(&header);
        let mut w = Writer::new();
        Struct::<Vertex>::new().encode(&vertex, &mut w, &body).unwrap();
        assert_eq!(w.as_bytes(), &[3, 4, 0x12, 0x34]);

        // The same record does not fit material 0's layout.
        let header = SurfaceHeader { material_index: 0, ..SurfaceHeader::default() };
        let body = ctx.with_header(&header);
        let err = Struct::<Vertex>::new().encode(&vertex, &mut Writer::new(), &body).unwrap_err();
        assert!(matches!(err.root_cause(), Error::PresenceMismatch { .. }));
    }

    #[test]
    fn test_bad_material_index() {
        let options = CodecOptions::default();
        let materials = materials();
        let base = Root::new(2, 0, &options);
        let root = base.with_materials(&materials);
        let ctx = Context::new(&root);
        let surfaces = ctx.item("surfaces", 0);

        let mut w = Writer::new();
        let err = Aligned::new(32, Struct::<Surface>::new())
            .encode(&surface(7), &mut w, &surfaces)
            .unwrap_err();
        assert_eq!(err.path(), Some("cmdl/surfaces[0]/header"));
        assert!(matches!(err.root_cause(), Error::MaterialIndex { index: 7, count: 2 }));

        // No vertices to resolve a layout for, still rejected.
        let empty = Surface { primitives: Vec::new(), ..surface(7) };
        let err = Struct::<Surface>::new().encode(&empty, &mut Writer::new(), &surfaces).unwrap_err();
        assert!(matches!(err.root_cause(), Error::MaterialIndex { index: 7, count: 2 }));
    }

    #[test]
    fn test_reserved_width_code() {
        assert!(matches!(vertex_size(0x0000_0004), Ok(1)));
        // Every 2-bit field holds 0..=3, so a reserved code can only come from a wider mask.
        let wide = VertexAttribute::new(0x0000_0007);
        assert!(matches!(wide.width_for(0x7), Err(Error::UnsupportedVariant { .. })));
    }
}
