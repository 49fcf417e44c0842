use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::bookmarks::ValidationError;

// --- Icon catalog types ---

// Immutable catalog entry: a favicon as an inline image data URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
    pub id: String,
    #[serde(rename = "base64Data")]
    pub base64_data: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IconRepository {
    pub icons: Vec<Icon>,
}

pub fn parse_icon_catalog(json: &str) -> anyhow::Result<IconRepository> {
    let repository: IconRepository = serde_json::from_str(json)?;
    Ok(repository)
}

// --- Lookup ---

/// Exact-match lookup. A missing icon is a normal case, not an error;
/// the catalog is small enough that a linear scan is fine.
pub fn get_icon_by_id<'a>(icon_id: &str, icons: &'a [Icon]) -> Option<&'a Icon> {
    icons.iter().find(|icon| icon.id == icon_id)
}

// --- Validation ---

/// Syntactic check that `base64_data` is a complete image data URI with
/// one of the supported format tokens. Does not decode the payload.
pub fn validate_icon(base64_data: &str) -> bool {
    if base64_data.is_empty() {
        return false;
    }
    let re = regex::Regex::new(r"(?i)^data:image/(png|jpg|jpeg|gif|svg\+xml|webp|bmp|ico);base64,")
        .unwrap();
    re.is_match(base64_data)
}

/// Pass complete data URLs through untouched; wrap bare base64 as PNG
/// after checking that it actually decodes.
pub fn create_icon_data_url(icon_data: &str) -> Result<String, ValidationError> {
    if icon_data.starts_with("data:image/") {
        return Ok(icon_data.to_string());
    }

    let payload = icon_data.trim();
    BASE64
        .decode(payload)
        .map_err(|e| ValidationError::new("base64Data", format!("Invalid base64 payload: {}", e)))?;

    Ok(format!("data:image/png;base64,{}", payload))
}
