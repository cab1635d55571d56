//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use cmdl::prelude::*;
use cmdl::schema::lightmap_uv;

/// Position wide, normal narrow, tex0 narrow.
pub const LAYOUT_STRIP: u32 = 0x0000_0107;
/// Matrix position narrow, position narrow, tex1 wide.
pub const LAYOUT_TRIANGLES: u32 = 0x0100_0C01;

fn cube_corners() -> Vec<Vec3> {
    let mut points = Vec::with_capacity(8);
    for i in 0..8 {
        let x = if i & 1 == 0 { -1.0 } else { 1.0 };
        let y = if i & 2 == 0 { -1.0 } else { 1.0 };
        let z = if i & 4 == 0 { -1.0 } else { 1.0 };
        points.push(Vec3::new(x, y, z));
    }
    points
}

fn strip_material() -> Material {
    let mut material = Material {
        flags: 0x8,
        texture_indices: vec![0, 1],
        vertex_attribute_flags: LAYOUT_STRIP,
        group_index: 3,
        konst_colors: Some(vec![0xFFFF_FFFF, 0x8080_80FF]),
        blend_destination_factor: 0,
        blend_source_factor: 1,
        color_channel_flags: vec![0x1],
        texgen_flags: vec![0x0000_1234],
        uv_animations: vec![UvAnimation {
            mode: UvAnimationMode::Scroll,
            parameters: vec![0.5, 0.25, 1.0, 0.0],
        }],
        ..Material::default()
    };
    material.push_tev_stage(
        TevStage {
            color_input_flags: 0x0000_F08F,
            alpha_input_flags: 0x0000_7C1F,
            konst_color_input: 0x0C,
            ..TevStage::default()
        },
        TevInput {
            texture_tev_input: 0,
            tex_coord_tev_input: 0,
            ..TevInput::default()
        },
    );
    material
}

fn triangles_material() -> Material {
    let mut material = Material {
        flags: 0x400,
        texture_indices: vec![1],
        vertex_attribute_flags: LAYOUT_TRIANGLES,
        reflection_indirect_texture_slot_index: Some(1),
        color_channel_flags: vec![0x1, 0x0],
        uv_animations: vec![
            UvAnimation {
                mode: UvAnimationMode::Rotation,
                parameters: vec![0.0, 90.0],
            },
            UvAnimation::new(UvAnimationMode::InverseModelView),
        ],
        ..Material::default()
    };
    material.push_tev_stage(TevStage::default(), TevInput::default());
    material.push_tev_stage(
        TevStage {
            color_combine_flags: 0x100,
            ..TevStage::default()
        },
        TevInput {
            texture_tev_input: 1,
            tex_coord_tev_input: 1,
            ..TevInput::default()
        },
    );
    material
}

fn strip_surface() -> Surface {
    let vertices = (0..4u16)
        .map(|i| Vertex {
            position: Some(0x0100 + i),
            normal: Some(i),
            tex: [Some(i), None, None, None, None, None, None, None],
            ..Vertex::default()
        })
        .collect();
    Surface {
        header: SurfaceHeader {
            center_point: Vec3::new(0.0, 0.5, 0.0),
            material_index: 0,
            mantissa: 0x8000,
            display_list_size: 0x20,
            surface_normal: Vec3::Y,
            ..SurfaceHeader::default()
        },
        primitives: vec![PrimitiveBatch {
            primitive_type: 0x98,
            vertices,
        }],
    }
}

fn triangles_surface() -> Surface {
    let vertices = (0..3u16)
        .map(|i| Vertex {
            matrix_position: Some(i * 3),
            position: Some(4 + i),
            tex: [None, Some(0x0200 + i), None, None, None, None, None, None],
            ..Vertex::default()
        })
        .collect();
    Surface {
        header: SurfaceHeader {
            center_point: Vec3::new(0.0, -0.5, 0.0),
            material_index: 1,
            mantissa: 0x8000,
            display_list_size: 0x20,
            surface_normal: Vec3::NEG_Y,
            extra_data: vec![0xAB, 0xCD, 0xEF],
            ..SurfaceHeader::default()
        },
        primitives: vec![PrimitiveBatch {
            primitive_type: 0x90,
            vertices,
        }],
    }
}

/// Prime model: one material set, four arrays and two surfaces.
///
/// Every attribute array fills its section exactly, so decoded arrays
/// compare equal to these.
pub fn prime_model() -> Cmdl {
    let positions = cube_corners();
    let mut set = MaterialSet::new();
    set.texture_file_ids = vec![AssetId(0x0A1B_2C3D), AssetId(0x1122_3344)];
    set.push(strip_material());
    set.push(triangles_material());
    set.material_end_offsets = vec![0x74, 0xE0];

    let mut model = Cmdl::for_game(Game::Prime);
    model.aabox = AABox::from_points(&positions);
    model.material_sets.push(set);
    model.attrib_arrays = AttributeArrays {
        normals: positions.iter().map(|p| p.normalize()).collect(),
        positions,
        colors: vec![Vec4::ONE, Vec4::new(1.0, 0.0, 0.0, 1.0)],
        uvs: vec![Vec2::ZERO, Vec2::X, Vec2::Y, Vec2::ONE],
        lightmap_uvs: None,
    };
    model.surface_offsets.offsets = vec![0x40, 0x80];
    model.surfaces = vec![strip_surface(), triangles_surface()];
    model
}

/// Prime model that also carries the lightmap UV array.
pub fn lightmap_model() -> Cmdl {
    let mut model = prime_model();
    model.flags |= 0x4;
    model.attrib_arrays.lightmap_uvs = Some((0..8).map(|i| lightmap_uv(i as f32 / 8.0, 1.0)).collect());
    model
}

/// Echoes model: the version 4 fields are filled in.
pub fn echoes_model() -> Cmdl {
    let mut model = prime_model();
    model.version = Game::Echoes.model_version();
    for material in &mut model.material_sets[0].materials {
        material.unk_1 = Some(0x1000);
        material.unk_2 = Some(0x2000);
    }
    for surface in &mut model.surfaces {
        surface.header.unk_1 = Some(0x0001);
        surface.header.unk_2 = Some(0xFFFF);
    }
    model
}

/// Encode with default options; fixtures are always valid.
pub fn encode(model: &Cmdl) -> Vec<u8> {
    model.to_bytes(&CodecOptions::default()).expect("fixture should encode")
}

/// Encode with default options, keeping the error.
pub fn encode_result(model: &Cmdl) -> cmdl::Result<Vec<u8>> {
    model.to_bytes(&CodecOptions::default())
}
