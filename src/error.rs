//! Unified error type for the public API
//!
//! Internal modules keep their domain-specific errors for precise handling;
//! this type consolidates them for callers that just want one `Result`
//! alias. Errors are propagated unmodified: there are no retries
//! (cryptographic failures are not transient) and no partial recovery.

use thiserror::Error;

/// Unified error type for all field-level encryption operations
#[derive(Debug, Error)]
pub enum FieldSealError {
    /// Key or certificate loading error
    #[error("Key error: {0}")]
    Key(#[from] crate::keys::KeyError),

    /// Configuration construction or misuse error
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Envelope encoding/decoding error
    #[error("Envelope error: {0}")]
    Envelope(#[from] crate::envelope::EnvelopeError),

    /// Cryptographic operation error
    #[error("Crypto error: {0}")]
    Crypto(#[from] crate::crypto::CryptoError),

    /// A required field was absent from the document
    #[error("Field not found at {path:?}")]
    FieldNotFound { path: String },

    /// JSON serialization error while preparing a field value
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FieldSealError {
    /// Returns true if this is a key-material loading error
    pub fn is_key_error(&self) -> bool {
        matches!(self, Self::Key(_))
    }

    /// Returns true if this is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if this is an envelope format error
    pub fn is_envelope_error(&self) -> bool {
        matches!(self, Self::Envelope(_))
    }

    /// Returns true if this is a cryptographic error
    pub fn is_crypto_error(&self) -> bool {
        matches!(self, Self::Crypto(_))
    }

    /// Returns true if a required document field was missing
    pub fn is_field_not_found(&self) -> bool {
        matches!(self, Self::FieldNotFound { .. })
    }
}
