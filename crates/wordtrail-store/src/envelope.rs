//! Checksummed envelope around stored JSON documents.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Envelope layout version written by this crate.
pub const ENVELOPE_FORMAT_VERSION: u32 = 1;

/// Why a stored document could not be read.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Not valid JSON, or not the expected shape.
    #[error("malformed document: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The payload does not match its checksum.
    #[error("checksum mismatch: expected {expected}, found {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    /// Written by a newer version.
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u32),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    format_version: u32,
    checksum: String,
    payload: Value,
}

/// SHA-256 of the compact JSON form of `payload`, as lowercase hex.
#[must_use]
pub fn checksum(payload: &Value) -> String {
    let digest = Sha256::digest(payload.to_string().as_bytes());
    format!("{digest:x}")
}

/// Serializes `document` inside an envelope.
///
/// # Errors
///
/// Returns an error if `document` cannot be represented as JSON.
pub fn seal<T: Serialize>(document: &T) -> Result<Vec<u8>, serde_json::Error> {
    let payload = serde_json::to_value(document)?;
    let envelope = Envelope {
        format_version: ENVELOPE_FORMAT_VERSION,
        checksum: checksum(&payload),
        payload,
    };
    serde_json::to_vec_pretty(&envelope)
}

/// Reads a document, verifying the envelope if there is one. Bare documents
/// without an envelope are accepted as-is.
///
/// # Errors
///
/// Returns `DecodeError` for malformed JSON, a checksum mismatch or a newer
/// envelope version.
pub fn open<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DecodeError> {
    let value: Value = serde_json::from_slice(bytes)?;
    let is_envelope = value.get("formatVersion").is_some() && value.get("payload").is_some();
    if !is_envelope {
        return Ok(serde_json::from_value(value)?);
    }
    let envelope: Envelope = serde_json::from_value(value)?;
    if envelope.format_version > ENVELOPE_FORMAT_VERSION {
        return Err(DecodeError::UnsupportedVersion(envelope.format_version));
    }
    let actual = checksum(&envelope.payload);
    if actual != envelope.checksum {
        return Err(DecodeError::ChecksumMismatch {
            expected: envelope.checksum,
            actual,
        });
    }
    Ok(serde_json::from_value(envelope.payload)?)
}
