use base64::{Engine as _, engine::general_purpose};

use crate::domain::GameError;

/// A captured frame submitted with a shot.
///
/// Clients may send either bare base64 or a `data:<mime>;base64,` URL; both are
/// accepted and the payload is checked to be decodable before detection runs.
#[derive(Debug, Clone)]
pub struct ShotImage {
    // Exactly what the client sent; this is what the audit log keeps.
    raw: String,
    // Base64 body with any data-URL prefix removed.
    payload_start: usize,
    bytes: Vec<u8>,
}

impl ShotImage {
    pub fn parse(raw: impl Into<String>) -> Result<Self, GameError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(GameError::InvalidSubmission("image is required"));
        }

        let payload_start = raw
            .find("base64,")
            .map(|idx| idx + "base64,".len())
            .unwrap_or(0);
        let bytes = general_purpose::STANDARD
            .decode(raw[payload_start..].trim())
            .map_err(|_| GameError::InvalidSubmission("image is not valid base64"))?;
        if bytes.is_empty() {
            return Err(GameError::InvalidSubmission("image is empty"));
        }

        Ok(Self {
            raw,
            payload_start,
            bytes,
        })
    }

    /// Base64 body without the data-URL prefix.
    pub fn base64(&self) -> &str {
        self.raw[self.payload_start..].trim()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_raw(self) -> String {
        self.raw
    }
}
