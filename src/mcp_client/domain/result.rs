//! Normalized tool invocation result.

use super::ToolContent;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The normalized outcome of one tool invocation.
///
/// `content` always holds every textual part of the response, newline-joined
/// in encounter order. At most one binary payload is kept: the first image,
/// or failing that the first audio clip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolResult {
    /// Text-only result.
    Text {
        /// Concatenated text content.
        content: String,
    },
    /// Result carrying an image.
    Image {
        /// Concatenated text accompanying the image.
        content: String,
        /// Image bytes.
        data: Vec<u8>,
        /// MIME type of the image.
        media_type: String,
    },
    /// Result carrying an audio clip.
    Media {
        /// Concatenated text accompanying the clip.
        content: String,
        /// Audio bytes.
        data: Vec<u8>,
        /// MIME type of the clip.
        media_type: String,
    },
}

/// Discriminant of a [`ToolResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolResultKind {
    /// Text-only result.
    Text,
    /// Image result.
    Image,
    /// Audio result.
    Media,
}

impl ToolResultKind {
    /// Returns the canonical string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Media => "media",
        }
    }
}

impl fmt::Display for ToolResultKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl ToolResult {
    /// Creates a text-only result.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    /// Returns the explicit empty success used when a call yields no parts.
    #[must_use]
    pub const fn empty() -> Self {
        Self::Text {
            content: String::new(),
        }
    }

    /// Folds the content parts of a call response into one result.
    ///
    /// Unrecognized parts are rendered as compact JSON and appended to the
    /// text stream. An image takes precedence over audio when both are
    /// present; within each kind the first part wins.
    #[must_use]
    pub fn from_parts(parts: impl IntoIterator<Item = ToolContent>) -> Self {
        let mut text_parts = Vec::new();
        let mut image: Option<(Vec<u8>, String)> = None;
        let mut audio: Option<(Vec<u8>, String)> = None;

        for part in parts {
            match part {
                ToolContent::Text { text } => text_parts.push(text),
                ToolContent::Image { data, mime_type } => {
                    if image.is_none() {
                        image = Some((data, mime_type));
                    }
                }
                ToolContent::Audio { data, mime_type } => {
                    if audio.is_none() {
                        audio = Some((data, mime_type));
                    }
                }
                ToolContent::Other(raw) => text_parts.push(raw.to_string()),
            }
        }

        let content = text_parts.join("\n");
        match (image, audio) {
            (Some((data, media_type)), _) => Self::Image {
                content,
                data,
                media_type,
            },
            (None, Some((data, media_type))) => Self::Media {
                content,
                data,
                media_type,
            },
            (None, None) => Self::Text { content },
        }
    }

    /// Returns the result discriminant.
    #[must_use]
    pub const fn kind(&self) -> ToolResultKind {
        match self {
            Self::Text { .. } => ToolResultKind::Text,
            Self::Image { .. } => ToolResultKind::Image,
            Self::Media { .. } => ToolResultKind::Media,
        }
    }

    /// Returns the textual content.
    #[must_use]
    pub fn content(&self) -> &str {
        match self {
            Self::Text { content } | Self::Image { content, .. } | Self::Media { content, .. } => {
                content
            }
        }
    }

    /// Returns the binary payload and its media type, if any.
    #[must_use]
    pub fn payload(&self) -> Option<(&[u8], &str)> {
        match self {
            Self::Text { .. } => None,
            Self::Image {
                data, media_type, ..
            }
            | Self::Media {
                data, media_type, ..
            } => Some((data.as_slice(), media_type.as_str())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn no_parts_is_an_empty_text_result() {
        let result = ToolResult::from_parts(Vec::new());
        assert_eq!(result, ToolResult::empty());
        assert_eq!(result.kind(), ToolResultKind::Text);
        assert_eq!(result.content(), "");
    }

    #[test]
    fn image_result_collects_surrounding_text() {
        let result = ToolResult::from_parts(vec![
            ToolContent::text("a"),
            ToolContent::image(b"X".to_vec(), "image/png"),
            ToolContent::text("b"),
        ]);

        assert_eq!(
            result,
            ToolResult::Image {
                content: "a\nb".to_owned(),
                data: b"X".to_vec(),
                media_type: "image/png".to_owned(),
            }
        );
    }

    #[test]
    fn audio_only_response_is_media() {
        let result = ToolResult::from_parts(vec![ToolContent::audio(b"Y".to_vec(), "audio/wav")]);

        assert_eq!(
            result,
            ToolResult::Media {
                content: String::new(),
                data: b"Y".to_vec(),
                media_type: "audio/wav".to_owned(),
            }
        );
    }

    #[test]
    fn image_wins_over_earlier_audio() {
        let result = ToolResult::from_parts(vec![
            ToolContent::audio(b"clip".to_vec(), "audio/mpeg"),
            ToolContent::image(b"pic".to_vec(), "image/jpeg"),
        ]);

        assert_eq!(result.kind(), ToolResultKind::Image);
        assert_eq!(result.payload(), Some((b"pic".as_slice(), "image/jpeg")));
    }

    #[test]
    fn first_image_wins() {
        let result = ToolResult::from_parts(vec![
            ToolContent::image(b"first".to_vec(), "image/png"),
            ToolContent::image(b"second".to_vec(), "image/gif"),
        ]);

        assert_eq!(result.payload(), Some((b"first".as_slice(), "image/png")));
    }

    #[test]
    fn first_audio_wins() {
        let result = ToolResult::from_parts(vec![
            ToolContent::audio(b"one".to_vec(), "audio/wav"),
            ToolContent::audio(b"two".to_vec(), "audio/ogg"),
        ]);

        assert_eq!(result.payload(), Some((b"one".as_slice(), "audio/wav")));
    }

    #[test]
    fn unrecognized_parts_are_stringified_in_order() {
        let result = ToolResult::from_parts(vec![
            ToolContent::text("before"),
            ToolContent::other(json!({"type": "resource_link", "uri": "file:///a"})),
            ToolContent::text("after"),
        ]);

        assert_eq!(
            result.content(),
            "before\n{\"type\":\"resource_link\",\"uri\":\"file:///a\"}\nafter"
        );
        assert_eq!(result.kind(), ToolResultKind::Text);
    }

    #[test]
    fn result_serializes_with_type_tag() {
        let value = serde_json::to_value(ToolResult::text("done")).expect("serializable");
        assert_eq!(value, json!({"type": "text", "content": "done"}));
    }
}
