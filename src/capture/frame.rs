//! Encoded still image carried from the camera to the service.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// MIME type produced by the camera devices in this crate.
pub const JPEG_MIME: &str = "image/jpeg";

/// Errors that can occur while parsing an image from its wire form.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// Missing `data:` prefix or `;base64,` marker.
    #[error("not a base64 data uri")]
    InvalidDataUri,
    /// Payload is not valid base64.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// A single encoded still frame.
///
/// The bytes are opaque to this crate: they are whatever the camera
/// encoder produced. On the wire an image is a data URI
/// (`data:image/jpeg;base64,...`). Two images are equal when their MIME
/// type and bytes match; the capture time is informational only.
#[derive(Clone)]
pub struct Image {
    /// Encoded image bytes.
    bytes: Vec<u8>,
    /// MIME type of `bytes`.
    mime: String,
    /// When the frame was sampled (or parsed, for received images).
    captured_at: DateTime<Utc>,
}

impl Image {
    /// Creates an image from encoded bytes of the given MIME type.
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
            captured_at: Utc::now(),
        }
    }

    /// Creates a JPEG image from encoded bytes.
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self::new(bytes, JPEG_MIME)
    }

    /// Returns the encoded bytes.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the MIME type.
    #[inline]
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Returns the capture timestamp.
    #[inline]
    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Returns the encoded size in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the image carries no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Encodes the image as a `data:<mime>;base64,<payload>` URI.
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime,
            BASE64_STANDARD.encode(&self.bytes)
        )
    }

    /// Parses an image from a base64 data URI.
    pub fn from_data_uri(uri: &str) -> Result<Self, ImageError> {
        let rest = uri.strip_prefix("data:").ok_or(ImageError::InvalidDataUri)?;
        let (header, payload) = rest.split_once(',').ok_or(ImageError::InvalidDataUri)?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or(ImageError::InvalidDataUri)?;
        if mime.is_empty() {
            return Err(ImageError::InvalidDataUri);
        }

        let bytes = BASE64_STANDARD.decode(payload)?;
        Ok(Self::new(bytes, mime))
    }
}

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        self.mime == other.mime && self.bytes == other.bytes
    }
}

impl Eq for Image {}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("mime", &self.mime)
            .field("bytes", &self.bytes.len())
            .field("captured_at", &self.captured_at)
            .finish()
    }
}

impl Serialize for Image {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_data_uri())
    }
}

impl<'de> Deserialize<'de> for Image {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let uri = String::deserialize(deserializer)?;
        Image::from_data_uri(&uri).map_err(de::Error::custom)
    }
}
