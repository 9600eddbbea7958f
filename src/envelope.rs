//! Envelope wire codec
//!
//! The envelope is the JSON sub-object standing in for one encrypted field:
//! ciphertext, wrapped symmetric key, IV, plus optional identification
//! metadata. Wire field names are fully caller-configurable through
//! [`FieldNames`]; the codec is parameterized purely by that name table and
//! knows nothing about the cipher.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while decoding an envelope sub-object
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// A required envelope field is absent or not a string
    #[error("Envelope field {field:?} is missing or not a string")]
    MissingField { field: String },

    /// An envelope field does not decode under the configured encoding
    #[error("Envelope field {field:?} is not valid {encoding}")]
    InvalidEncoding {
        field: String,
        encoding: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An embedded fingerprint contradicts the configured key material
    #[error("Envelope fingerprint does not match the configured key material")]
    FingerprintMismatch,

    /// The embedded algorithm tag names an unsupported digest
    #[error("Envelope digest algorithm {0:?} is not recognized")]
    UnknownDigest(String),
}

/// Binary-to-text encoding applied to envelope byte fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueEncoding {
    /// Lowercase hexadecimal
    #[default]
    Hex,
    /// Standard-alphabet base64
    Base64,
}

impl ValueEncoding {
    fn encode(&self, bytes: &[u8]) -> String {
        match self {
            ValueEncoding::Hex => hex::encode(bytes),
            ValueEncoding::Base64 => BASE64.encode(bytes),
        }
    }

    fn decode(&self, field: &str, text: &str) -> Result<Vec<u8>, EnvelopeError> {
        match self {
            ValueEncoding::Hex => hex::decode(text).map_err(|e| EnvelopeError::InvalidEncoding {
                field: field.to_string(),
                encoding: "hex",
                source: Box::new(e),
            }),
            ValueEncoding::Base64 => {
                BASE64
                    .decode(text)
                    .map_err(|e| EnvelopeError::InvalidEncoding {
                        field: field.to_string(),
                        encoding: "base64",
                        source: Box::new(e),
                    })
            }
        }
    }
}

/// Wire names for the envelope fields.
///
/// The three required names carry the byte fields; the optional names, when
/// set, additionally carry the algorithm tag and fingerprints. An optional
/// name left as `None` is neither written on encode nor required on decode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldNames {
    pub encrypted_value: String,
    pub encrypted_key: String,
    pub iv: String,
    pub oaep_digest: Option<String>,
    pub certificate_fingerprint: Option<String>,
    pub key_fingerprint: Option<String>,
}

impl Default for FieldNames {
    fn default() -> Self {
        FieldNames {
            encrypted_value: "encryptedValue".to_string(),
            encrypted_key: "encryptedKey".to_string(),
            iv: "iv".to_string(),
            oaep_digest: Some("oaepHashingAlgorithm".to_string()),
            certificate_fingerprint: Some("encryptionCertificateFingerprint".to_string()),
            key_fingerprint: Some("encryptionKeyFingerprint".to_string()),
        }
    }
}

impl FieldNames {
    /// Name table carrying only the three required fields.
    pub fn minimal(
        encrypted_value: impl Into<String>,
        encrypted_key: impl Into<String>,
        iv: impl Into<String>,
    ) -> Self {
        FieldNames {
            encrypted_value: encrypted_value.into(),
            encrypted_key: encrypted_key.into(),
            iv: iv.into(),
            oaep_digest: None,
            certificate_fingerprint: None,
            key_fingerprint: None,
        }
    }
}

/// One encrypted field in transit: raw bytes plus optional metadata.
///
/// Transient by design: an envelope exists only for the duration of one
/// field's encode/decode and is fully reconstructable from its own bytes
/// plus the decrypting party's private key and digest choice.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub ciphertext: Vec<u8>,
    pub wrapped_key: Vec<u8>,
    pub iv: Vec<u8>,
    pub oaep_digest: Option<String>,
    pub certificate_fingerprint: Option<String>,
    pub key_fingerprint: Option<String>,
}

impl Envelope {
    /// Serialize into a JSON object keyed by the configured field names.
    ///
    /// Writes exactly the fields named: byte fields under the configured
    /// encoding, metadata verbatim, and only when both the name and the
    /// value are present.
    pub fn encode(&self, names: &FieldNames, encoding: ValueEncoding) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(
            names.encrypted_value.clone(),
            Value::String(encoding.encode(&self.ciphertext)),
        );
        map.insert(
            names.encrypted_key.clone(),
            Value::String(encoding.encode(&self.wrapped_key)),
        );
        map.insert(names.iv.clone(), Value::String(encoding.encode(&self.iv)));

        let metadata = [
            (&names.oaep_digest, &self.oaep_digest),
            (&names.certificate_fingerprint, &self.certificate_fingerprint),
            (&names.key_fingerprint, &self.key_fingerprint),
        ];
        for (name, value) in metadata {
            if let (Some(name), Some(value)) = (name, value) {
                map.insert(name.clone(), Value::String(value.clone()));
            }
        }
        map
    }

    /// Deserialize from a JSON object keyed by the configured field names.
    ///
    /// The three byte fields are required; metadata fields are read only
    /// when their name is configured and the field is present.
    pub fn decode(
        map: &Map<String, Value>,
        names: &FieldNames,
        encoding: ValueEncoding,
    ) -> Result<Self, EnvelopeError> {
        let ciphertext = encoding.decode(
            &names.encrypted_value,
            required_str(map, &names.encrypted_value)?,
        )?;
        let wrapped_key = encoding.decode(
            &names.encrypted_key,
            required_str(map, &names.encrypted_key)?,
        )?;
        let iv = encoding.decode(&names.iv, required_str(map, &names.iv)?)?;

        Ok(Envelope {
            ciphertext,
            wrapped_key,
            iv,
            oaep_digest: optional_str(map, names.oaep_digest.as_deref()),
            certificate_fingerprint: optional_str(map, names.certificate_fingerprint.as_deref()),
            key_fingerprint: optional_str(map, names.key_fingerprint.as_deref()),
        })
    }
}

fn required_str<'a>(map: &'a Map<String, Value>, field: &str) -> Result<&'a str, EnvelopeError> {
    map.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| EnvelopeError::MissingField {
            field: field.to_string(),
        })
}

fn optional_str(map: &Map<String, Value>, field: Option<&str>) -> Option<String> {
    field
        .and_then(|f| map.get(f))
        .and_then(Value::as_str)
        .map(str::to_string)
}
