use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// How an image entered the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetSource {
    Upload,
    DragDrop,
    CatalogFetch,
}

impl AssetSource {
    pub fn label(&self) -> &'static str {
        match self {
            AssetSource::Upload => "upload",
            AssetSource::DragDrop => "drag_drop",
            AssetSource::CatalogFetch => "catalog_fetch",
        }
    }
}

/// The two independent image slots a session holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetSlot {
    Person,
    Garment,
}

impl AssetSlot {
    pub fn label(&self) -> &'static str {
        match self {
            AssetSlot::Person => "person",
            AssetSlot::Garment => "garment",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "person" => Some(AssetSlot::Person),
            "garment" | "clothing" => Some(AssetSlot::Garment),
            _ => None,
        }
    }
}

/// Normalized in-memory image: raw bytes plus the base64 form and a
/// renderable `data:` URI. The encoded fields are derived from the bytes
/// in the constructor, so they can never disagree with each other or
/// with the raw payload.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAsset {
    raw_bytes: Vec<u8>,
    encoded: String,
    preview_uri: String,
    mime_type: String,
    source: AssetSource,
}

impl ImageAsset {
    pub fn new(raw_bytes: Vec<u8>, mime_type: impl Into<String>, source: AssetSource) -> Self {
        let mime_type = mime_type.into();
        let encoded = BASE64.encode(&raw_bytes);
        let preview_uri = format!("data:{mime_type};base64,{encoded}");
        Self {
            raw_bytes,
            encoded,
            preview_uri,
            mime_type,
            source,
        }
    }

    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw_bytes
    }

    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    pub fn preview_uri(&self) -> &str {
        &self.preview_uri
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn source(&self) -> AssetSource {
        self.source
    }
}

impl fmt::Debug for ImageAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageAsset")
            .field("bytes", &self.raw_bytes.len())
            .field("mime_type", &self.mime_type)
            .field("source", &self.source)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_form_round_trips_to_raw_bytes() {
        let bytes = vec![0u8, 1, 2, 254, 255];
        let asset = ImageAsset::new(bytes.clone(), "image/png", AssetSource::Upload);
        let decoded = BASE64.decode(asset.encoded()).unwrap();
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn preview_uri_embeds_mime_and_encoded_payload() {
        let asset = ImageAsset::new(vec![0x41], "image/jpeg", AssetSource::DragDrop);
        assert_eq!(asset.encoded(), "QQ==");
        assert_eq!(asset.preview_uri(), "data:image/jpeg;base64,QQ==");
    }

    #[test]
    fn slot_parse_accepts_clothing_alias() {
        assert_eq!(AssetSlot::parse("person"), Some(AssetSlot::Person));
        assert_eq!(AssetSlot::parse(" Garment "), Some(AssetSlot::Garment));
        assert_eq!(AssetSlot::parse("clothing"), Some(AssetSlot::Garment));
        assert_eq!(AssetSlot::parse("hat"), None);
    }
}
