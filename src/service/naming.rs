//! Folder normalization and storage filename generation.

use std::path::Path;

use chrono::Utc;
use rand::Rng;

/// Folder used whenever a requested folder is absent or malformed.
pub const DEFAULT_FOLDER: &str = "general";

/// A folder name is one or more of `[A-Za-z0-9_-]`.
pub fn is_valid_folder(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Malformed folder names fall back to [`DEFAULT_FOLDER`] instead of being rejected.
pub fn normalize_folder(requested: Option<&str>) -> String {
    match requested {
        Some(name) if is_valid_folder(name) => name.to_string(),
        _ => DEFAULT_FOLDER.to_string(),
    }
}

/// `<unix-millis>-<random integer>` plus the original extension.
pub fn generate_filename(original_name: &str) -> String {
    let random: u32 = rand::rng().random_range(0..=1_000_000_000);
    format!(
        "{}-{random}{}",
        Utc::now().timestamp_millis(),
        extension_of(original_name)
    )
}

/// Extension with its leading dot, kept only when it is plain alphanumeric.
fn extension_of(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{e}"))
        .unwrap_or_default()
}

/// Match the subtype of a MIME type (after the last `/`) against the accepted list.
pub fn is_accepted_type(mimetype: &str, accepted: &[String]) -> bool {
    match mimetype.rsplit_once('/') {
        Some((_, subtype)) => accepted.iter().any(|a| a == subtype),
        None => false,
    }
}
