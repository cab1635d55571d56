//! Encode / decode / re-encode round trips over whole documents.

mod common;

use std::fs;
use std::io::Write;

use cmdl::prelude::*;
use memmap2::Mmap;
use tempfile::NamedTempFile;

fn assert_stable(model: &Cmdl, options: &CodecOptions) {
    let bytes = model.to_bytes(options).expect("Failed to encode");
    assert_eq!(bytes.len() % 32, 0, "document should end on a section boundary");

    let decoded = Cmdl::from_bytes(&bytes, options).expect("Failed to decode");
    let again = decoded.to_bytes(options).expect("Failed to re-encode");
    assert_eq!(again, bytes, "re-encoded bytes differ");

    // A second decode of the same bytes yields the same document.
    let redecoded = Cmdl::from_bytes(&again, options).expect("Failed to decode again");
    assert_eq!(redecoded, decoded);
}

#[test]
fn test_roundtrip_prime() {
    let model = common::prime_model();
    assert_stable(&model, &CodecOptions::for_game(Game::Prime));
}

#[test]
fn test_roundtrip_echoes() {
    let model = common::echoes_model();
    assert_stable(&model, &CodecOptions::for_game(Game::Echoes));
}

#[test]
fn test_roundtrip_lightmap() {
    let model = common::lightmap_model();
    assert_stable(&model, &CodecOptions::default());
}

#[test]
fn test_roundtrip_empty_document() {
    let model = Cmdl::for_game(Game::Corruption);
    let bytes = common::encode(&model);
    // 44-byte header and five table slots, padded to 64. Only the surface
    // header section has content: a zero count padded to 32.
    assert_eq!(bytes.len(), 96);
    assert_stable(&model, &CodecOptions::default());
}

#[test]
fn test_decoded_fields_match() {
    let model = common::prime_model();
    let bytes = common::encode(&model);
    let decoded = Cmdl::from_bytes(&bytes, &CodecOptions::default()).expect("Failed to decode");

    assert_eq!(decoded.version, model.version);
    assert_eq!(decoded.flags, model.flags);
    assert_eq!(decoded.aabox, model.aabox);
    assert_eq!(decoded.material_sets, model.material_sets);
    assert_eq!(decoded.attrib_arrays, model.attrib_arrays);
    assert_eq!(decoded.surface_offsets, model.surface_offsets);
    assert_eq!(decoded.surfaces.len(), model.surfaces.len());

    for (decoded, original) in decoded.surfaces.iter().zip(&model.surfaces) {
        assert_eq!(decoded.header, original.header);
        let batches: Vec<&PrimitiveBatch> = decoded.batches().collect();
        let expected: Vec<&PrimitiveBatch> = original.primitives.iter().collect();
        assert_eq!(batches, expected);
        // Section padding comes back as empty type-0 batches.
        assert!(decoded.primitives.len() > original.primitives.len());
    }
}

#[test]
fn test_stored_offsets_kept() {
    let mut model = common::prime_model();
    model.material_sets[0].material_end_offsets = vec![0xDEAD, 0xBEEF];
    model.surface_offsets.offsets = vec![7, 9];

    let bytes = common::encode(&model);
    let decoded = Cmdl::from_bytes(&bytes, &CodecOptions::default()).expect("Failed to decode");
    assert_eq!(decoded.material_sets[0].material_end_offsets, vec![0xDEAD, 0xBEEF]);
    assert_eq!(decoded.surface_offsets.offsets, vec![7, 9]);
}

#[test]
fn test_roundtrip_file() {
    let model = common::echoes_model();
    let bytes = common::encode(&model);

    let mut temp = NamedTempFile::new().expect("Failed to create temp file");
    temp.write_all(&bytes).expect("Failed to write model");
    temp.flush().expect("Failed to flush model");

    let file = fs::File::open(temp.path()).expect("Failed to open model");
    let mmap = unsafe { Mmap::map(&file) }.expect("Failed to map model");
    let options = CodecOptions::for_game(Game::Echoes);
    let (decoded, layout) = Cmdl::from_bytes_with_layout(&mmap, &options).expect("Failed to decode");

    assert_eq!(layout.len(), model.section_count());
    assert_eq!(decoded.to_bytes(&options).expect("Failed to re-encode"), &mmap[..]);
}
