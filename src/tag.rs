//! Tag derivation and texture file recognition
//!
//! A tag is the file stem of a locator, lower-cased: the run of word
//! characters and hyphens immediately before the final extension.

use crate::types::ImageFormat;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Stem directly followed by a single trailing `.ext`
#[allow(clippy::expect_used)]
static STEM_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\w-]+)\.\w+$").expect("stem pattern is valid"));

/// Derive the lookup tag for a locator
///
/// Returns `None` when the locator has no `stem.ext` suffix, e.g. `"noext"`.
///
/// # Examples
///
/// ```
/// use texture_loader::tag::derive_tag;
///
/// assert_eq!(
///     derive_tag("file:///a/b/My-Texture_01.PNG").as_deref(),
///     Some("my-texture_01")
/// );
/// assert_eq!(derive_tag("noext"), None);
/// ```
pub fn derive_tag(locator: &str) -> Option<String> {
    STEM_PATTERN
        .captures(locator)
        .and_then(|caps| caps.get(1))
        .map(|stem| stem.as_str().to_lowercase())
}

/// Whether a path carries one of the recognized image extensions
pub fn is_texture_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(ImageFormat::from_extension)
        .is_some()
}

/// Turn a filesystem path into a `file://` locator with forward slashes
pub fn file_locator(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    if normalized.starts_with('/') {
        format!("file://{normalized}")
    } else {
        format!("file:///{normalized}")
    }
}
