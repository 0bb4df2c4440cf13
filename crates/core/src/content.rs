//! Content parts — the tagged union of what a message can carry.
//!
//! Capture and OCR layers hand us pre-encoded payloads: text fragments,
//! base64 data URLs, or remote image URLs. This module normalizes them into
//! one shape so provider adapters can translate exhaustively instead of
//! sniffing strings.

use serde::{Deserialize, Serialize};

/// One fragment of message content, in caller-given order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text.
    Text { text: String },
    /// An image payload descriptor. Opaque to everything except provider
    /// translation — never validated or re-encoded in this core.
    Image { source: ImageSource },
}

impl ContentPart {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create an image part from any URL string (data URL or remote).
    pub fn image(url: &str) -> Self {
        Self::Image {
            source: ImageSource::from_url(url),
        }
    }
}

/// Where an image payload lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageSource {
    /// An embedded base64 payload with its media type.
    Base64 { media_type: String, data: String },
    /// A remote URL. Not every provider can fetch these; adapters that
    /// cannot degrade the part to a text placeholder.
    Url { url: String },
}

impl ImageSource {
    /// Parse a URL string into a source. `data:<mime>;base64,<payload>`
    /// becomes `Base64`; anything else is treated as a remote URL.
    pub fn from_url(url: &str) -> Self {
        if let Some(rest) = url.strip_prefix("data:") {
            if let Some((media_type, data)) = rest.split_once(";base64,") {
                return Self::Base64 {
                    media_type: media_type.to_string(),
                    data: data.to_string(),
                };
            }
        }
        Self::Url {
            url: url.to_string(),
        }
    }

    /// Render as a single URL string (data URL for embedded payloads).
    pub fn as_url(&self) -> String {
        match self {
            Self::Base64 { media_type, data } => {
                format!("data:{media_type};base64,{data}")
            }
            Self::Url { url } => url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_parses_to_base64() {
        let src = ImageSource::from_url("data:image/png;base64,iVBORw0KGgo=");
        assert_eq!(
            src,
            ImageSource::Base64 {
                media_type: "image/png".into(),
                data: "iVBORw0KGgo=".into(),
            }
        );
    }

    #[test]
    fn remote_url_stays_url() {
        let src = ImageSource::from_url("https://example.com/chart.png");
        assert_eq!(
            src,
            ImageSource::Url {
                url: "https://example.com/chart.png".into()
            }
        );
    }

    #[test]
    fn url_roundtrip() {
        let data_url = "data:image/jpeg;base64,/9j/4AAQ";
        assert_eq!(ImageSource::from_url(data_url).as_url(), data_url);

        let remote = "https://example.com/a.png";
        assert_eq!(ImageSource::from_url(remote).as_url(), remote);
    }

    #[test]
    fn malformed_data_url_falls_back_to_url() {
        // No ";base64," separator — we don't guess, we pass it through.
        let src = ImageSource::from_url("data:image/png,rawbytes");
        assert!(matches!(src, ImageSource::Url { .. }));
    }

    #[test]
    fn content_part_serialization_is_tagged() {
        let part = ContentPart::text("hello");
        let json = serde_json::to_string(&part).unwrap();
        assert!(json.contains("\"type\":\"text\""));

        let img = ContentPart::image("data:image/png;base64,AAAA");
        let json = serde_json::to_string(&img).unwrap();
        assert!(json.contains("\"type\":\"image\""));
        assert!(json.contains("\"kind\":\"base64\""));
    }
}
