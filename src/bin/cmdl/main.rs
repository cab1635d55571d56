//! CMDL CLI - Tool for inspecting and round-trip checking CMDL model files.

use cmdl::prelude::*;
use cmdl::schema::vertex_size;
use memmap2::Mmap;
use rayon::prelude::*;
use std::env;
use std::fs::File;
use std::process;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Options shared by every command.
struct Global {
    level: &'static str,
    options: CodecOptions,
}

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut global = Global { level: "info", options: CodecOptions::default() };
    let mut filtered_args: Vec<&str> = Vec::new();
    let mut iter = args[1..].iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-v" | "--verbose" => global.level = "debug",
            "-vv" | "--trace" => global.level = "trace",
            "-q" | "--quiet" => global.level = "error",
            "--lenient" => global.options = global.options.lenient(),
            "-g" | "--game" => {
                let Some(name) = iter.next() else {
                    fail("missing value for --game");
                };
                match Game::from_name(name) {
                    Some(game) => global.options = global.options.with_game(game),
                    None => fail(&format!("unknown game '{}' (expected prime, echoes or corruption)", name)),
                }
            }
            _ => filtered_args.push(arg),
        }
    }

    init_logging(global.level);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    match filtered_args[0] {
        // Info command - header, section table and counts
        "info" | "i" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: cmdl-cli info <file.cmdl>");
                process::exit(1);
            }
            cmd_info(filtered_args[1], &global.options);
        }

        // Dump command - materials and surfaces
        "dump" | "d" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: cmdl-cli dump <file.cmdl> [--json]");
                process::exit(1);
            }
            let json_mode = filtered_args.iter().any(|&s| s == "--json" || s == "-j");
            cmd_dump(filtered_args[1], &global.options, json_mode);
        }

        // Verify command - byte-exact round trip
        "verify" | "r" => {
            let files: Vec<&str> = filtered_args[1..].to_vec();
            if files.is_empty() {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: cmdl-cli verify <file.cmdl>...");
                process::exit(1);
            }
            cmd_verify(&files, &global.options);
        }

        "help" | "h" | "-h" | "--help" => print_help(),

        "version" | "-V" | "--version" => println!("cmdl-cli {}", version_string()),

        // A bare file path is treated as 'info'
        path if path.to_ascii_lowercase().ends_with(".cmdl") => cmd_info(path, &global.options),

        other => {
            eprintln!("Unknown command: {}", other);
            print_help();
            process::exit(1);
        }
    }
}

fn init_logging(level: &str) {
    // RUST_LOG wins over the verbosity flags.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn fail(msg: &str) -> ! {
    eprintln!("Error: {}", msg);
    process::exit(1);
}

fn version_string() -> String {
    format!(
        "{} (built {} {})",
        env!("CARGO_PKG_VERSION"),
        option_env!("CMDL_BUILD_DATE").unwrap_or("unknown"),
        option_env!("CMDL_BUILD_TIME").unwrap_or("unknown")
    )
}

fn print_help() {
    println!("cmdl-cli {} - CMDL model file toolkit", version_string());
    println!();
    println!("USAGE:");
    println!("    cmdl-cli [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    i, info   <file>              Show header, section table and counts");
    println!("    d, dump   <file> [--json]     Show materials and surfaces");
    println!("    r, verify <file>...           Decode and re-encode, compare bytes");
    println!("    h, help                       Show this help");
    println!("    version                       Show version and build date");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose        Show debug output");
    println!("    -vv, --trace         Show trace output (very verbose)");
    println!("    -q, --quiet          Only show errors");
    println!("    -g, --game <name>    Expected game: prime, echoes or corruption");
    println!("    --lenient            Accept stale count/size fields");
    println!();
    println!("EXAMPLES:");
    println!("    cmdl-cli info 0A1B2C3D.CMDL");
    println!("    cmdl-cli -g echoes dump model.cmdl --json");
    println!("    cmdl-cli verify models/*.cmdl");
    println!();
    println!("NOTES:");
    println!("    - Passing a .cmdl file directly is equivalent to 'info'");
    println!("    - RUST_LOG overrides the verbosity flags");
}

fn map_file(path: &str) -> cmdl::Result<Mmap> {
    let file = File::open(path)?;
    // The mapping is read-only and lives no longer than this process's use of it.
    let mmap = unsafe { Mmap::map(&file) }?;
    debug!("mapped {} ({} bytes)", path, mmap.len());
    Ok(mmap)
}

fn load(path: &str, options: &CodecOptions) -> (Cmdl, SectionLayout) {
    info!("Opening model: {}", path);
    let result = map_file(path).and_then(|bytes| Cmdl::from_bytes_with_layout(&bytes, options));
    match result {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Failed to read {}: {}", path, e);
            process::exit(1);
        }
    }
}

fn cmd_info(path: &str, options: &CodecOptions) {
    let (model, layout) = load(path, options);

    println!("Model: {}", path);
    match model.game() {
        Some(game) => println!("Version: {} ({})", model.version, game),
        None => println!("Version: {}", model.version),
    }
    println!(
        "Flags: {:#x}{}{}",
        model.flags,
        if model.has_compressed_normals() { " compressed-normals" } else { "" },
        if model.has_lightmap_uvs() { " lightmap-uvs" } else { "" }
    );
    println!("Bounds: {:?}", model.aabox);
    if !model.aabox.is_empty() {
        println!("  center {:?}  size {:?}", model.aabox.center(), model.aabox.size());
    }
    println!();

    println!("Sections: {}", layout.slot_count);
    for section in layout.iter() {
        println!("  {:<20} offset {:#08x}  length {}", section.kind.to_string(), section.offset, section.length);
    }
    println!();

    let arrays = &model.attrib_arrays;
    println!("Material sets: {}", model.material_sets.len());
    println!("Materials:     {}", model.materials().len());
    println!("Positions:     {}", arrays.positions.len());
    println!("Normals:       {}", arrays.normals.len());
    println!("Colors:        {}", arrays.colors.len());
    println!("UVs:           {}", arrays.uvs.len());
    if let Some(lightmap) = &arrays.lightmap_uvs {
        println!("Lightmap UVs:  {}", lightmap.len());
    }
    println!("Surfaces:      {}", model.surfaces.len());
    println!(
        "Batches:       {} ({} vertices)",
        model.surfaces.iter().map(|s| s.batches().count()).sum::<usize>(),
        model.vertex_count()
    );
}

fn triangle_count(surface: &Surface) -> usize {
    surface
        .batches()
        .filter_map(|b| b.primitive().map(|p| p.triangle_count(b.vertices.len())))
        .sum()
}

fn cmd_dump(path: &str, options: &CodecOptions, json_mode: bool) {
    let (model, _) = load(path, options);

    if json_mode {
        let material_sets: Vec<_> = model
            .material_sets
            .iter()
            .map(|set| {
                let materials: Vec<_> = set
                    .materials
                    .iter()
                    .map(|m| {
                        serde_json::json!({
                            "flags": m.flags,
                            "vertex_attribute_flags": m.vertex_attribute_flags,
                            "vertex_size": vertex_size(m.vertex_attribute_flags).ok(),
                            "textures": m.texture_indices,
                            "group_index": m.group_index,
                            "tev_stages": m.tev_stages.len(),
                            "uv_animations": m.uv_animations.iter().map(|a| a.mode.to_string()).collect::<Vec<_>>(),
                        })
                    })
                    .collect();
                serde_json::json!({
                    "textures": set.texture_file_ids.iter().map(|id| id.to_string()).collect::<Vec<_>>(),
                    "materials": materials,
                })
            })
            .collect();
        let surfaces: Vec<_> = model
            .surfaces
            .iter()
            .map(|s| {
                serde_json::json!({
                    "material_index": s.header.material_index,
                    "center": s.header.center_point.to_array(),
                    "normal": s.header.surface_normal.to_array(),
                    "batches": s.batches().count(),
                    "vertices": s.vertex_count(),
                    "triangles": triangle_count(s),
                    "extra_data": s.header.extra_data.len(),
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "model": path,
                "version": model.version,
                "flags": model.flags,
                "aabox": { "min": model.aabox.min.to_array(), "max": model.aabox.max.to_array() },
                "material_sets": material_sets,
                "surfaces": surfaces,
            }))
            .unwrap_or_default()
        );
        return;
    }

    println!("Model: {}", path);
    println!();
    for (s, set) in model.material_sets.iter().enumerate() {
        println!("[MATERIAL SET {}] {} textures, {} materials", s, set.texture_file_ids.len(), set.len());
        for (i, id) in set.texture_file_ids.iter().enumerate() {
            println!("  texture {}: {}", i, id);
        }
        for (i, m) in set.materials.iter().enumerate() {
            let size = vertex_size(m.vertex_attribute_flags)
                .map(|n| n.to_string())
                .unwrap_or_else(|_| "?".into());
            println!(
                "  material {}: flags {:#x}, attributes {:#010x} ({} bytes/vertex), {} TEV stages, textures {:?}",
                i,
                m.flags,
                m.vertex_attribute_flags,
                size,
                m.tev_stages.len(),
                m.texture_indices
            );
            for anim in &m.uv_animations {
                println!("    uv animation {}: {:?}", anim.mode, anim.parameters);
            }
        }
        println!();
    }

    for (i, s) in model.surfaces.iter().enumerate() {
        println!(
            "[SURFACE {}] material {}, {} batches, {} vertices, {} triangles",
            i,
            s.header.material_index,
            s.batches().count(),
            s.vertex_count(),
            triangle_count(s)
        );
        println!("  center {:?}  normal {:?}", s.header.center_point, s.header.surface_normal);
        for batch in s.batches() {
            match batch.primitive() {
                Some(kind) => println!("    {:?}: {} vertices", kind, batch.vertices.len()),
                None => println!("    type {:#04x}: {} vertices", batch.primitive_type, batch.vertices.len()),
            }
        }
    }
}

/// Outcome of a single round-trip check.
enum Verdict {
    Identical { size: usize, sections: usize },
    Differs { size: usize, encoded: usize, first_diff: usize },
    Failed(Error),
}

fn verify_file(path: &str, options: &CodecOptions) -> Verdict {
    let bytes = match map_file(path) {
        Ok(bytes) => bytes,
        Err(e) => return Verdict::Failed(e),
    };
    let (model, layout) = match Cmdl::from_bytes_with_layout(&bytes, options) {
        Ok(decoded) => decoded,
        Err(e) => return Verdict::Failed(e),
    };
    let encoded = match model.to_bytes(options) {
        Ok(encoded) => encoded,
        Err(e) => return Verdict::Failed(e),
    };

    if encoded[..] == bytes[..] {
        Verdict::Identical { size: bytes.len(), sections: layout.len() }
    } else {
        let first_diff = encoded
            .iter()
            .zip(bytes.iter())
            .position(|(a, b)| a != b)
            .unwrap_or_else(|| encoded.len().min(bytes.len()));
        Verdict::Differs { size: bytes.len(), encoded: encoded.len(), first_diff }
    }
}

fn cmd_verify(files: &[&str], options: &CodecOptions) {
    let results: Vec<(&str, Verdict)> = files
        .par_iter()
        .map(|&path| (path, verify_file(path, options)))
        .collect();

    let mut failures = 0;
    for (path, verdict) in &results {
        match verdict {
            Verdict::Identical { size, sections } => {
                println!("OK    {} ({} bytes, {} sections)", path, size, sections);
            }
            Verdict::Differs { size, encoded, first_diff } => {
                failures += 1;
                println!(
                    "DIFF  {} ({} bytes in, {} bytes out, first difference at {:#x})",
                    path, size, encoded, first_diff
                );
            }
            Verdict::Failed(e) => {
                failures += 1;
                println!("FAIL  {}: {}", path, e);
            }
        }
    }

    println!();
    println!("{} of {} files round-trip exactly", results.len() - failures, results.len());
    if failures > 0 {
        process::exit(1);
    }
}
