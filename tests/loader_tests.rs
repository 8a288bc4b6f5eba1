//! Resource Loading Tests
//!
//! Tests for:
//! - LoadProgress: single-fire completion, duplicate marks, unknown names
//! - ResourceLoader: fail-fast on missing assets and short timeouts
//! - AssetReader: source filename extraction
//! - Model import: clean rejection of malformed binary glTF

use std::time::{Duration, Instant};

use foxglade::assets::gltf::import_model;
use foxglade::assets::io::AssetReader;
use foxglade::assets::{LoadProgress, ResourceLoader};
use foxglade::errors::ViewerError;
use foxglade::scene::Scene;

// ============================================================================
// Progress accounting
// ============================================================================

#[test]
fn progress_completion_fires_exactly_once() {
    let mut progress = LoadProgress::new(&["a", "b", "c"]);
    assert!(!progress.is_complete());

    assert!(!progress.mark_loaded("a"));
    assert!(!progress.mark_loaded("b"));
    // The mark that empties the set is the one that signals.
    assert!(progress.mark_loaded("c"));
    assert!(progress.is_complete());

    // Further marks never re-fire the signal.
    assert!(!progress.mark_loaded("c"));
    assert!(!progress.mark_loaded("a"));
}

#[test]
fn progress_duplicate_marks_count_once() {
    let mut progress = LoadProgress::new(&["a", "b"]);

    assert!(!progress.mark_loaded("a"));
    assert!(!progress.mark_loaded("a"));
    assert!(!progress.mark_loaded("a"));

    assert_eq!(progress.loaded_count(), 1);
    assert!(!progress.is_complete());
}

#[test]
fn progress_ignores_unknown_names() {
    let mut progress = LoadProgress::new(&["a"]);

    assert!(!progress.mark_loaded("nope"));
    assert_eq!(progress.loaded_count(), 0);

    assert!(progress.mark_loaded("a"));
    assert_eq!(progress.loaded_count(), 1);
    assert_eq!(progress.total(), 1);
}

#[test]
fn progress_counts_reflect_pending_set() {
    let mut progress = LoadProgress::new(&["x", "y", "z"]);
    assert_eq!(progress.total(), 3);
    assert_eq!(progress.loaded_count(), 0);

    progress.mark_loaded("y");
    assert_eq!(progress.loaded_count(), 1);
    assert_eq!(progress.total(), 3);
}

// ============================================================================
// Loader failure paths
// ============================================================================

#[test]
fn loader_fails_fast_on_missing_files() {
    let loader = ResourceLoader::new()
        .expect("loader construction")
        .with_timeout(Duration::from_secs(5));

    let start = Instant::now();
    let result = loader.load_blocking(
        "does_not_exist/Fox.glb",
        "does_not_exist/floor_color.jpg",
        "does_not_exist/floor_normal.jpg",
    );

    // A missing file is an error, not a stall waiting on the timeout.
    assert!(result.is_err());
    assert!(start.elapsed() < Duration::from_secs(4));
}

#[test]
fn loader_rejects_one_bad_asset_among_good_ones() {
    let dir = std::env::temp_dir().join("foxglade_loader_test");
    std::fs::create_dir_all(&dir).expect("temp dir");

    // A tiny valid PNG (1x1 white pixel) stands in for the floor textures.
    let png: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
        0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00,
        0x00, 0x90, 0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, 0x08,
        0xD7, 0x63, 0xF8, 0xFF, 0xFF, 0x3F, 0x00, 0x05, 0xFE, 0x02, 0xFE, 0xDC, 0xCC, 0x59,
        0xE7, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];
    let color_path = dir.join("color.png");
    let normal_path = dir.join("normal.png");
    std::fs::write(&color_path, png).expect("write color");
    std::fs::write(&normal_path, png).expect("write normal");

    let loader = ResourceLoader::new().expect("loader construction");
    let result = loader.load_blocking(
        dir.join("missing_model.glb").to_str().expect("utf8 path"),
        color_path.to_str().expect("utf8 path"),
        normal_path.to_str().expect("utf8 path"),
    );
    assert!(result.is_err());
}

// ============================================================================
// Malformed model assets
// ============================================================================

/// Assembles a binary glTF container around the given JSON and binary chunks.
fn glb(json: &str, bin: &[u8]) -> Vec<u8> {
    let mut json_chunk = json.as_bytes().to_vec();
    while json_chunk.len() % 4 != 0 {
        json_chunk.push(b' ');
    }
    let mut bin_chunk = bin.to_vec();
    while bin_chunk.len() % 4 != 0 {
        bin_chunk.push(0);
    }

    let total = 12 + 8 + json_chunk.len() + 8 + bin_chunk.len();
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&0x4654_6C67_u32.to_le_bytes()); // "glTF"
    out.extend_from_slice(&2_u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json_chunk.len() as u32).to_le_bytes());
    out.extend_from_slice(&0x4E4F_534A_u32.to_le_bytes()); // "JSON"
    out.extend_from_slice(&json_chunk);
    out.extend_from_slice(&(bin_chunk.len() as u32).to_le_bytes());
    out.extend_from_slice(&0x004E_4942_u32.to_le_bytes()); // "BIN\0"
    out.extend_from_slice(&bin_chunk);
    out
}

#[test]
fn import_rejects_truncated_binary_chunk() {
    // The buffer declares far more bytes than the binary chunk carries.
    let json = r#"{
        "asset": {"version": "2.0"},
        "buffers": [{"byteLength": 1024}],
        "scenes": [{"nodes": []}],
        "scene": 0
    }"#;
    let bytes = glb(json, &[0_u8; 8]);

    let mut scene = Scene::new();
    let result = import_model(&mut scene, &bytes, "Broken");
    assert!(matches!(result, Err(ViewerError::GltfError(_))));
}

#[test]
fn import_rejects_garbage_bytes() {
    let mut scene = Scene::new();
    let result = import_model(&mut scene, b"not a gltf asset", "Garbage");
    assert!(matches!(result, Err(ViewerError::GltfError(_))));
}

// ============================================================================
// Source handling
// ============================================================================

#[test]
fn source_filename_handles_paths_and_urls() {
    assert_eq!(AssetReader::source_filename("assets/Fox.glb"), "Fox.glb");
    assert_eq!(
        AssetReader::source_filename("https://example.com/models/Fox.glb"),
        "Fox.glb"
    );
    assert_eq!(AssetReader::source_filename("Fox.glb"), "Fox.glb");
}
