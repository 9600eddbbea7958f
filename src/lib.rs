mod config;
mod crypto;
mod document;
mod envelope;
mod error;
mod fle;
mod keys;

pub use config::{ConfigError, EncryptionConfig, EncryptionConfigBuilder, FieldMapping};
pub use crypto::{CryptoError, OaepDigest};
pub use document::{DocumentAccess, JsonPointerAccess};
pub use envelope::{Envelope, EnvelopeError, FieldNames, ValueEncoding};
pub use error::FieldSealError;
pub use fle::{decrypt_payload, decrypt_payload_with, encrypt_payload, encrypt_payload_with};
pub use keys::{sha256_fingerprint, DecryptionKey, EncryptionCertificate, KeyError};
