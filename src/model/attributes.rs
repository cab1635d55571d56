//! Vertex attribute arrays.

use half::f16;

use crate::util::{AABox, Vec2, Vec3, Vec4};

/// The per-model vertex attribute arrays, one section each.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeArrays {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub colors: Vec<Vec4>,
    pub uvs: Vec<Vec2>,
    /// Present only when the model's lightmap flag is set.
    pub lightmap_uvs: Option<Vec<[f16; 2]>>,
}

impl AttributeArrays {
    /// Number of arrays that occupy a section.
    pub fn present_count(&self) -> usize {
        4 + usize::from(self.lightmap_uvs.is_some())
    }

    /// Bounding box of all positions.
    pub fn bounds(&self) -> AABox {
        AABox::from_points(&self.positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_count() {
        let mut arrays = AttributeArrays::default();
        assert_eq!(arrays.present_count(), 4);
        arrays.lightmap_uvs = Some(vec![[f16::ZERO, f16::ONE]]);
        assert_eq!(arrays.present_count(), 5);
    }

    #[test]
    fn test_bounds() {
        let arrays = AttributeArrays {
            positions: vec![Vec3::new(-1.0, 0.0, 2.0), Vec3::new(1.0, 3.0, -2.0)],
            ..AttributeArrays::default()
        };
        let bounds = arrays.bounds();
        assert_eq!(bounds.min, Vec3::new(-1.0, 0.0, -2.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 3.0, 2.0));
    }
}
