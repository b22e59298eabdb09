//! Image fixtures written to temporary directories

use std::path::Path;
use tempfile::TempDir;

/// First bytes of a PNG file
pub const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// First bytes of a DDS file
pub const DDS_MAGIC: &[u8] = b"DDS ";

/// Payload used for a named fixture: magic bytes followed by the name
pub fn fixture_bytes(name: &str) -> Vec<u8> {
    let magic = match Path::new(name).extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("dds") => DDS_MAGIC,
        _ => PNG_MAGIC,
    };
    let mut bytes = magic.to_vec();
    bytes.extend_from_slice(name.as_bytes());
    bytes
}

/// Create a temporary directory holding one fixture per name
pub fn texture_dir(names: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    for name in names {
        std::fs::write(dir.path().join(name), fixture_bytes(name))
            .expect("Failed to write fixture");
    }
    dir
}
