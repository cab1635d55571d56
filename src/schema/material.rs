//! Material set layout.

use crate::codec::*;
use crate::model::{Material, MaterialSet, TevInput, TevStage, UvAnimation, UvAnimationMode};
use crate::util::Result;

const U32_LIST: PrefixedArray<U32, U32> = PrefixedArray::new(U32, U32);
const TEXTURE_FILE_IDS: PrefixedArray<U32, AssetId32> = PrefixedArray::new(U32, AssetId32);
const EXTENDED_WORD: Conditional<U32> = Conditional::new(Predicate::MinVersion(EXTENDED_FIELDS_VERSION), U32);
const KONST_COLORS: Conditional<PrefixedArray<U32, U32>> = Conditional::new(
    Predicate::FieldHasBits { field: "flags", mask: MATERIAL_FLAG_KONST_COLORS },
    U32_LIST,
);
const REFLECTION_INDIRECT_SLOT: Conditional<U32> = Conditional::new(
    Predicate::FieldHasBits { field: "flags", mask: MATERIAL_FLAG_REFLECTION_INDIRECT },
    U32,
);
const UV_ANIMATIONS: PrefixedArray<U32, Struct<UvAnimation>> = PrefixedArray::new(U32, Struct::new());

const MATERIAL_COUNT: Computed = Computed::new("material_count");
const TEV_STAGE_COUNT: Computed = Computed::new("tev_stage_count");
const UV_ANIMATION_SECTION_SIZE: Computed = Computed::new("material_animations_section_size");

/// Material set section: a material set padded to the section boundary.
pub(crate) const MATERIAL_SET: IndirectSection<Aligned<Struct<MaterialSet>>> =
    IndirectSection::new(Aligned::new(SECTION_ALIGNMENT, Struct::new()));

impl Record for MaterialSet {
    fn decode_fields(r: &mut Reader<'_>, scope: &mut Context<'_>) -> Result<Self> {
        let texture_file_ids = scope.decode_field("texture_file_ids", &TEXTURE_FILE_IDS, r)?;
        let material_count = MATERIAL_COUNT.decode(r)?;
        scope.set("material_count", material_count);
        tracing::trace!("material set: {} textures, {} materials", texture_file_ids.len(), material_count);

        let count = material_count as usize;
        let material_end_offsets = scope.decode_field("material_end_offsets", &FixedArray::new(count, U32), r)?;
        let materials = scope.decode_field("materials", &FixedArray::new(count, Struct::<Material>::new()), r)?;

        Ok(Self {
            texture_file_ids,
            material_end_offsets,
            materials,
        })
    }

    fn encode_fields(&self, w: &mut Writer, scope: &mut Context<'_>) -> Result<()> {
        let count = self.materials.len();
        scope.encode_field("texture_file_ids", &TEXTURE_FILE_IDS, &self.texture_file_ids, w)?;
        MATERIAL_COUNT.encode(count, w)?;
        scope.encode_field(
            "material_end_offsets",
            &FixedArray::new(count, U32),
            &self.material_end_offsets,
            w,
        )?;
        scope.encode_field("materials", &FixedArray::new(count, Struct::<Material>::new()), &self.materials, w)
    }
}

impl Record for Material {
    fn decode_fields(r: &mut Reader<'_>, scope: &mut Context<'_>) -> Result<Self> {
        let flags = scope.decode_field("flags", &U32, r)?;
        scope.set("flags", flags);
        let texture_indices = scope.decode_field("texture_indices", &U32_LIST, r)?;
        let vertex_attribute_flags = scope.decode_field("vertex_attribute_flags", &U32, r)?;
        let unk_1 = scope.decode_field("unk_1", &EXTENDED_WORD, r)?;
        let unk_2 = scope.decode_field("unk_2", &EXTENDED_WORD, r)?;
        let group_index = scope.decode_field("group_index", &U32, r)?;
        let konst_colors = scope.decode_field("konst_colors", &KONST_COLORS, r)?;
        let blend_destination_factor = scope.decode_field("blend_destination_factor", &U16, r)?;
        let blend_source_factor = scope.decode_field("blend_source_factor", &U16, r)?;
        let reflection_indirect_texture_slot_index =
            scope.decode_field("reflection_indirect_texture_slot_index", &REFLECTION_INDIRECT_SLOT, r)?;
        let color_channel_flags = scope.decode_field("color_channel_flags", &U32_LIST, r)?;

        let tev_stage_count = TEV_STAGE_COUNT.decode(r)?;
        scope.set("tev_stage_count", tev_stage_count);
        let stages = FixedArray::new(tev_stage_count as usize, Struct::<TevStage>::new());
        let tev_stages = scope.decode_field("tev_stages", &stages, r)?;
        let inputs = FixedArray::new(tev_stage_count as usize, Struct::<TevInput>::new());
        let tev_inputs = scope.decode_field("tev_inputs", &inputs, r)?;

        let texgen_flags = scope.decode_field("texgen_flags", &U32_LIST, r)?;

        let stored_size = UV_ANIMATION_SECTION_SIZE.decode(r)?;
        let start = r.pos();
        let uv_animations = scope.decode_field("uv_animations", &UV_ANIMATIONS, r)?;
        UV_ANIMATION_SECTION_SIZE.verify(stored_size, r.pos() - start, scope)?;

        Ok(Self {
            flags,
            texture_indices,
            vertex_attribute_flags,
            unk_1,
            unk_2,
            group_index,
            konst_colors,
            blend_destination_factor,
            blend_source_factor,
            reflection_indirect_texture_slot_index,
            color_channel_flags,
            tev_stages,
            tev_inputs,
            texgen_flags,
            uv_animations,
        })
    }

    fn encode_fields(&self, w: &mut Writer, scope: &mut Context<'_>) -> Result<()> {
        scope.set("flags", self.flags);
        scope.encode_field("flags", &U32, &self.flags, w)?;
        scope.encode_field("texture_indices", &U32_LIST, &self.texture_indices, w)?;
        scope.encode_field("vertex_attribute_flags", &U32, &self.vertex_attribute_flags, w)?;
        scope.encode_field("unk_1", &EXTENDED_WORD, &self.unk_1, w)?;
        scope.encode_field("unk_2", &EXTENDED_WORD, &self.unk_2, w)?;
        scope.encode_field("group_index", &U32, &self.group_index, w)?;
        scope.encode_field("konst_colors", &KONST_COLORS, &self.konst_colors, w)?;
        scope.encode_field("blend_destination_factor", &U16, &self.blend_destination_factor, w)?;
        scope.encode_field("blend_source_factor", &U16, &self.blend_source_factor, w)?;
        scope.encode_field(
            "reflection_indirect_texture_slot_index",
            &REFLECTION_INDIRECT_SLOT,
            &self.reflection_indirect_texture_slot_index,
            w,
        )?;
        scope.encode_field("color_channel_flags", &U32_LIST, &self.color_channel_flags, w)?;

        let stage_count = self.tev_stages.len();
        TEV_STAGE_COUNT.encode(stage_count, w)?;
        scope.encode_field("tev_stages", &FixedArray::new(stage_count, Struct::<TevStage>::new()), &self.tev_stages, w)?;
        scope.encode_field("tev_inputs", &FixedArray::new(stage_count, Struct::<TevInput>::new()), &self.tev_inputs, w)?;

        scope.encode_field("texgen_flags", &U32_LIST, &self.texgen_flags, w)?;

        UV_ANIMATION_SECTION_SIZE.encode(self.uv_animation_section_size(), w)?;
        let start = w.pos();
        scope.encode_field("uv_animations", &UV_ANIMATIONS, &self.uv_animations, w)?;
        debug_assert_eq!(w.pos() - start, self.uv_animation_section_size());
        Ok(())
    }
}

impl Record for TevStage {
    fn decode_fields(r: &mut Reader<'_>, scope: &mut Context<'_>) -> Result<Self> {
        Ok(Self {
            color_input_flags: U32.decode(r, scope)?,
            alpha_input_flags: U32.decode(r, scope)?,
            color_combine_flags: U32.decode(r, scope)?,
            alpha_combine_flags: U32.decode(r, scope)?,
            padding: U8.decode(r, scope)?,
            konst_alpha_input: U8.decode(r, scope)?,
            konst_color_input: U8.decode(r, scope)?,
            rasterized_color_input: U8.decode(r, scope)?,
        })
    }

    fn encode_fields(&self, w: &mut Writer, scope: &mut Context<'_>) -> Result<()> {
        U32.encode(&self.color_input_flags, w, scope)?;
        U32.encode(&self.alpha_input_flags, w, scope)?;
        U32.encode(&self.color_combine_flags, w, scope)?;
        U32.encode(&self.alpha_combine_flags, w, scope)?;
        U8.encode(&self.padding, w, scope)?;
        U8.encode(&self.konst_alpha_input, w, scope)?;
        U8.encode(&self.konst_color_input, w, scope)?;
        U8.encode(&self.rasterized_color_input, w, scope)
    }
}

impl Record for TevInput {
    fn decode_fields(r: &mut Reader<'_>, scope: &mut Context<'_>) -> Result<Self> {
        Ok(Self {
            padding: U16.decode(r, scope)?,
            texture_tev_input: U8.decode(r, scope)?,
            tex_coord_tev_input: U8.decode(r, scope)?,
        })
    }

    fn encode_fields(&self, w: &mut Writer, scope: &mut Context<'_>) -> Result<()> {
        U16.encode(&self.padding, w, scope)?;
        U8.encode(&self.texture_tev_input, w, scope)?;
        U8.encode(&self.tex_coord_tev_input, w, scope)
    }
}

impl Record for UvAnimation {
    fn decode_fields(r: &mut Reader<'_>, scope: &mut Context<'_>) -> Result<Self> {
        let mode = UvAnimationMode::from_u32(U32.decode(r, scope)?)?;
        let parameters = scope.decode_field("parameters", &FixedArray::new(mode.param_count(), F32), r)?;
        Ok(Self { mode, parameters })
    }

    fn encode_fields(&self, w: &mut Writer, scope: &mut Context<'_>) -> Result<()> {
        U32.encode(&self.mode.as_u32(), w, scope)?;
        scope.encode_field(
            "parameters",
            &FixedArray::new(self.mode.param_count(), F32),
            &self.parameters,
            w,
        )
    }
}
