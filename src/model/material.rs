//! Material sets, materials and their TEV / UV animation records.

use std::fmt;

use super::AssetId;
use crate::codec::format::{MATERIAL_FLAG_KONST_COLORS, MATERIAL_FLAG_REFLECTION_INDIRECT};
use crate::util::{Error, Result};

/// A batch of materials together with the textures they reference.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialSet {
    /// Texture assets referenced by `Material::texture_indices`.
    pub texture_file_ids: Vec<AssetId>,
    /// Stored end offset of each material, one per material.
    pub material_end_offsets: Vec<u32>,
    /// Materials in stream order.
    pub materials: Vec<Material>,
}

impl MaterialSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a material with a zero end offset.
    pub fn push(&mut self, material: Material) {
        self.material_end_offsets.push(0);
        self.materials.push(material);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

/// One material definition.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Material {
    /// Material flag bits; `0x8` adds konst colors, `0x400` a reflection slot.
    pub flags: u32,
    /// Indices into the set's texture list.
    pub texture_indices: Vec<u32>,
    /// Packed 2-bit width codes for every per-vertex attribute.
    pub vertex_attribute_flags: u32,
    /// Present from version 4.
    pub unk_1: Option<u32>,
    /// Present from version 4.
    pub unk_2: Option<u32>,
    pub group_index: u32,
    /// Present when `flags & 0x8`.
    pub konst_colors: Option<Vec<u32>>,
    pub blend_destination_factor: u16,
    pub blend_source_factor: u16,
    /// Present when `flags & 0x400`.
    pub reflection_indirect_texture_slot_index: Option<u32>,
    pub color_channel_flags: Vec<u32>,
    /// TEV stages; the stored stage count is derived from this list.
    pub tev_stages: Vec<TevStage>,
    /// One input per TEV stage.
    pub tev_inputs: Vec<TevInput>,
    pub texgen_flags: Vec<u32>,
    pub uv_animations: Vec<UvAnimation>,
}

impl Material {
    /// Check if the konst color list is flagged as present.
    pub fn has_konst_colors(&self) -> bool {
        self.flags & MATERIAL_FLAG_KONST_COLORS != 0
    }

    /// Check if the reflection indirect texture slot is flagged as present.
    pub fn has_reflection_indirect(&self) -> bool {
        self.flags & MATERIAL_FLAG_REFLECTION_INDIRECT != 0
    }

    /// Append a TEV stage together with its input.
    pub fn push_tev_stage(&mut self, stage: TevStage, input: TevInput) {
        self.tev_stages.push(stage);
        self.tev_inputs.push(input);
    }

    /// Encoded size of the UV animation list, including its count prefix.
    pub fn uv_animation_section_size(&self) -> usize {
        4 + self.uv_animations.iter().map(UvAnimation::encoded_size).sum::<usize>()
    }
}

/// One TEV (texture environment) combiner stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TevStage {
    pub color_input_flags: u32,
    pub alpha_input_flags: u32,
    pub color_combine_flags: u32,
    pub alpha_combine_flags: u32,
    pub padding: u8,
    pub konst_alpha_input: u8,
    pub konst_color_input: u8,
    pub rasterized_color_input: u8,
}

/// Texture and texture-coordinate inputs of one TEV stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TevInput {
    pub padding: u16,
    pub texture_tev_input: u8,
    pub tex_coord_tev_input: u8,
}

/// UV animation mode; the mode fixes the number of parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum UvAnimationMode {
    #[default]
    InverseModelView,
    InverseModelViewTranslated,
    Scroll,
    Rotation,
    HorizontalFilmstrip,
    VerticalFilmstrip,
    ModelMatrix,
    Cylinder,
    Mode8,
}

impl UvAnimationMode {
    pub const ALL: [UvAnimationMode; 9] = [
        Self::InverseModelView,
        Self::InverseModelViewTranslated,
        Self::Scroll,
        Self::Rotation,
        Self::HorizontalFilmstrip,
        Self::VerticalFilmstrip,
        Self::ModelMatrix,
        Self::Cylinder,
        Self::Mode8,
    ];

    /// Parse a stored mode tag.
    pub fn from_u32(tag: u32) -> Result<Self> {
        Self::ALL.get(tag as usize).copied().ok_or_else(|| Error::UnsupportedVariant {
            field: "uv_animation.mode",
            detail: format!("unknown mode {}", tag),
        })
    }

    /// Stored mode tag.
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Number of f32 parameters following the tag.
    pub const fn param_count(self) -> usize {
        match self {
            Self::InverseModelView | Self::InverseModelViewTranslated | Self::ModelMatrix => 0,
            Self::Rotation | Self::Cylinder => 2,
            Self::Scroll | Self::HorizontalFilmstrip | Self::VerticalFilmstrip => 4,
            Self::Mode8 => 9,
        }
    }
}

impl fmt::Display for UvAnimationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InverseModelView => "inverse_model_view",
            Self::InverseModelViewTranslated => "inverse_model_view_translated",
            Self::Scroll => "scroll",
            Self::Rotation => "rotation",
            Self::HorizontalFilmstrip => "horizontal_filmstrip",
            Self::VerticalFilmstrip => "vertical_filmstrip",
            Self::ModelMatrix => "model_matrix",
            Self::Cylinder => "cylinder",
            Self::Mode8 => "mode_8",
        };
        f.write_str(name)
    }
}

/// A UV animation: mode plus its parameters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UvAnimation {
    pub mode: UvAnimationMode,
    /// Exactly `mode.param_count()` values.
    pub parameters: Vec<f32>,
}

impl UvAnimation {
    /// Animation with all parameters zeroed.
    pub fn new(mode: UvAnimationMode) -> Self {
        Self {
            mode,
            parameters: vec![0.0; mode.param_count()],
        }
    }

    /// Encoded size: tag plus parameters.
    pub fn encoded_size(&self) -> usize {
        4 + 4 * self.parameters.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uv_animation_arity() {
        let expected = [0, 0, 4, 2, 4, 4, 0, 2, 9];
        for (tag, count) in expected.iter().enumerate() {
            let mode = UvAnimationMode::from_u32(tag as u32).unwrap();
            assert_eq!(mode.as_u32(), tag as u32);
            assert_eq!(mode.param_count(), *count, "mode {}", tag);
        }
        assert!(matches!(UvAnimationMode::from_u32(9), Err(Error::UnsupportedVariant { .. })));
    }

    #[test]
    fn test_uv_animation_section_size() {
        let mut material = Material::default();
        assert_eq!(material.uv_animation_section_size(), 4);
        material.uv_animations.push(UvAnimation::new(UvAnimationMode::Mode8));
        material.uv_animations.push(UvAnimation::new(UvAnimationMode::ModelMatrix));
        assert_eq!(material.uv_animation_section_size(), 4 + (4 + 36) + 4);
    }

    #[test]
    fn test_material_flags() {
        let material = Material { flags: 0x408, ..Material::default() };
        assert!(material.has_konst_colors());
        assert!(material.has_reflection_indirect());
        assert!(!Material::default().has_konst_colors());
    }

    #[test]
    fn test_set_push() {
        let mut set = MaterialSet::new();
        set.push(Material::default());
        assert_eq!(set.len(), 1);
        assert_eq!(set.material_end_offsets, vec![0]);
    }
}
