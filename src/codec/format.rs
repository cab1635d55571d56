//! CMDL format constants.

/// Magic constant at the start of every CMDL file.
pub const CMDL_MAGIC: u32 = 0xDEAD_BABE;

/// Byte size of the fixed header fields before the section table
/// (magic, version, flags, bounding box, section count, material set count).
pub const FIXED_HEADER_SIZE: usize = 4 + 4 + 4 + 24 + 4 + 4;

/// Every section starts on, and is padded to, this boundary.
pub const SECTION_ALIGNMENT: usize = 32;

/// Size of one section-table slot.
pub const SECTION_SLOT_SIZE: usize = 4;

/// Model flag: normals are stored as compressed half vectors.
pub const FLAG_COMPRESSED_NORMALS: u32 = 0x2;

/// Model flag: a lightmap UV array section is present.
pub const FLAG_LIGHTMAP_UVS: u32 = 0x4;

/// Material flag: a konst color list follows the group index.
pub const MATERIAL_FLAG_KONST_COLORS: u32 = 0x8;

/// Material flag: a reflection indirect texture slot follows the blend factors.
pub const MATERIAL_FLAG_REFLECTION_INDIRECT: u32 = 0x400;

/// First model version carrying the extra material/surface words (Echoes).
pub const EXTENDED_FIELDS_VERSION: u32 = 4;

/// Number of padding bytes needed to advance `size` to a multiple of `boundary`.
#[inline]
pub const fn padding_for(size: usize, boundary: usize) -> usize {
    (boundary - size % boundary) % boundary
}

/// Round `size` up to a multiple of `boundary`.
#[inline]
pub const fn align_up(size: usize, boundary: usize) -> usize {
    size + padding_for(size, boundary)
}

/// Check whether an offset sits on a section boundary.
#[inline]
pub const fn is_section_aligned(offset: usize) -> bool {
    offset % SECTION_ALIGNMENT == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic() {
        assert_eq!(CMDL_MAGIC.to_be_bytes(), [0xDE, 0xAD, 0xBA, 0xBE]);
        assert_eq!(FIXED_HEADER_SIZE, 44);
    }

    #[test]
    fn test_padding() {
        assert_eq!(padding_for(0, 32), 0);
        assert_eq!(padding_for(1, 32), 31);
        assert_eq!(padding_for(32, 32), 0);
        assert_eq!(padding_for(60, 32), 4);
        assert_eq!(align_up(44 + 4 * 7, 32), 96);
        assert!(is_section_aligned(96));
        assert!(!is_section_aligned(100));
    }
}
