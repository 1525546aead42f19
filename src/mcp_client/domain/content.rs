//! Content parts returned by a tool invocation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One unit of a tool call's response payload.
///
/// The transport maps the protocol's content union onto these variants.
/// Kinds the core does not understand (embedded resources, resource links,
/// future additions) arrive as [`ToolContent::Other`] carrying their raw JSON
/// so they can still be surfaced as text.
///
/// Known kinds serialize with a `type` tag; [`ToolContent::Other`] serializes
/// as its raw JSON, and any tagged object that matches no known kind
/// deserializes into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolContent {
    /// Plain text.
    Text {
        /// The text content.
        text: String,
    },
    /// Image payload.
    Image {
        /// Image bytes exactly as delivered by the transport.
        data: Vec<u8>,
        /// MIME type of the image.
        mime_type: String,
    },
    /// Audio payload.
    Audio {
        /// Audio bytes exactly as delivered by the transport.
        data: Vec<u8>,
        /// MIME type of the audio clip.
        mime_type: String,
    },
    /// A content kind with no dedicated variant.
    #[serde(untagged)]
    Other(Value),
}

impl ToolContent {
    /// Creates a text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Creates an image part.
    #[must_use]
    pub fn image(data: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self::Image {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Creates an audio part.
    #[must_use]
    pub fn audio(data: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self::Audio {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Creates a part of an unrecognized kind.
    #[must_use]
    pub const fn other(raw: Value) -> Self {
        Self::Other(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn known_kinds_serialize_with_type_tag() {
        let value = serde_json::to_value(ToolContent::image(b"X".to_vec(), "image/png"))
            .expect("serializable");

        assert_eq!(
            value,
            json!({"type": "image", "data": [88], "mime_type": "image/png"})
        );
    }

    #[test]
    fn unknown_kind_deserializes_as_other() {
        let raw = json!({"type": "resource_link", "uri": "file:///tmp/a.txt"});

        let content: ToolContent = serde_json::from_value(raw.clone()).expect("deserializable");

        assert_eq!(content, ToolContent::Other(raw.clone()));
        assert_eq!(serde_json::to_value(&content).expect("serializable"), raw);
    }

    #[test]
    fn text_round_trips_through_json() {
        let content: ToolContent =
            serde_json::from_value(json!({"type": "text", "text": "hello"}))
                .expect("deserializable");

        assert_eq!(content, ToolContent::text("hello"));
    }
}
