//! Encryption configuration
//!
//! An [`EncryptionConfig`] is an immutable value object built once and
//! reused across many encrypt/decrypt calls; it holds no interior mutability
//! and is safe to share across threads by reference. A client encrypting
//! outbound payloads needs only the certificate half; a server decrypting
//! inbound payloads needs only the private key half.

use crate::crypto::OaepDigest;
use crate::envelope::{FieldNames, ValueEncoding};
use crate::keys::{DecryptionKey, EncryptionCertificate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building or misusing a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Encrypt was called without a loaded encryption certificate
    #[error("An encryption certificate is required to encrypt")]
    MissingEncryptionKey,

    /// Decrypt was called without a loaded decryption key
    #[error("A decryption key is required to decrypt")]
    MissingDecryptionKey,

    /// Neither key half was supplied to the builder
    #[error("At least one of encryption certificate or decryption key is required")]
    MissingKeyMaterial,

    /// A digest algorithm name was not recognized
    #[error("Unknown OAEP digest algorithm: {0}")]
    UnknownDigest(String),
}

/// Pairs a source path with a destination path for one field.
///
/// On encryption the plaintext is read at `source` and the envelope written
/// at `destination`; decryption mappings run the mirror direction. Optional
/// by default: a missing source field is skipped unless [`required`] was set.
///
/// [`required`]: FieldMapping::required
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMapping {
    pub source: String,
    pub destination: String,
    #[serde(default)]
    pub required: bool,
}

impl FieldMapping {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        FieldMapping {
            source: source.into(),
            destination: destination.into(),
            required: false,
        }
    }

    /// Fail with `FieldNotFound` when the source field is absent instead of
    /// skipping the mapping.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Immutable field-level encryption configuration.
#[derive(Debug, Clone)]
pub struct EncryptionConfig {
    encryption_certificate: Option<EncryptionCertificate>,
    decryption_key: Option<DecryptionKey>,
    encryption_paths: Vec<FieldMapping>,
    decryption_paths: Vec<FieldMapping>,
    oaep_digest: OaepDigest,
    field_names: FieldNames,
    value_encoding: ValueEncoding,
    certificate_fingerprint: Option<String>,
    key_fingerprint: Option<String>,
    verify_fingerprints: bool,
}

impl EncryptionConfig {
    pub fn builder() -> EncryptionConfigBuilder {
        EncryptionConfigBuilder::default()
    }

    pub(crate) fn encryption_certificate(&self) -> Result<&EncryptionCertificate, ConfigError> {
        self.encryption_certificate
            .as_ref()
            .ok_or(ConfigError::MissingEncryptionKey)
    }

    pub(crate) fn decryption_key(&self) -> Result<&DecryptionKey, ConfigError> {
        self.decryption_key
            .as_ref()
            .ok_or(ConfigError::MissingDecryptionKey)
    }

    pub fn encryption_paths(&self) -> &[FieldMapping] {
        &self.encryption_paths
    }

    pub fn decryption_paths(&self) -> &[FieldMapping] {
        &self.decryption_paths
    }

    pub fn oaep_digest(&self) -> OaepDigest {
        self.oaep_digest
    }

    pub fn field_names(&self) -> &FieldNames {
        &self.field_names
    }

    pub fn value_encoding(&self) -> ValueEncoding {
        self.value_encoding
    }

    pub(crate) fn verify_fingerprints(&self) -> bool {
        self.verify_fingerprints
    }

    /// The certificate fingerprint to advertise: the explicitly configured
    /// value, or one derived from the loaded certificate.
    pub fn certificate_fingerprint(&self) -> Option<String> {
        self.certificate_fingerprint.clone().or_else(|| {
            self.encryption_certificate
                .as_ref()
                .map(EncryptionCertificate::fingerprint)
        })
    }

    /// The public key fingerprint to advertise: the explicitly configured
    /// value, or one derived from the loaded certificate.
    pub fn key_fingerprint(&self) -> Option<String> {
        self.key_fingerprint.clone().or_else(|| {
            self.encryption_certificate
                .as_ref()
                .map(EncryptionCertificate::public_key_fingerprint)
        })
    }
}

/// Builder for [`EncryptionConfig`].
#[derive(Debug, Default)]
pub struct EncryptionConfigBuilder {
    encryption_certificate: Option<EncryptionCertificate>,
    decryption_key: Option<DecryptionKey>,
    encryption_paths: Vec<FieldMapping>,
    decryption_paths: Vec<FieldMapping>,
    oaep_digest: Option<OaepDigest>,
    field_names: Option<FieldNames>,
    value_encoding: Option<ValueEncoding>,
    certificate_fingerprint: Option<String>,
    key_fingerprint: Option<String>,
    verify_fingerprints: bool,
}

impl EncryptionConfigBuilder {
    pub fn encryption_certificate(mut self, certificate: EncryptionCertificate) -> Self {
        self.encryption_certificate = Some(certificate);
        self
    }

    pub fn decryption_key(mut self, key: DecryptionKey) -> Self {
        self.decryption_key = Some(key);
        self
    }

    /// Add an encryption mapping: plaintext at `source`, envelope written
    /// at `destination`.
    pub fn encrypt_path(mut self, source: impl Into<String>, destination: impl Into<String>) -> Self {
        self.encryption_paths.push(FieldMapping::new(source, destination));
        self
    }

    /// Add a decryption mapping: envelope at `source`, recovered plaintext
    /// written at `destination`.
    pub fn decrypt_path(mut self, source: impl Into<String>, destination: impl Into<String>) -> Self {
        self.decryption_paths.push(FieldMapping::new(source, destination));
        self
    }

    pub fn encrypt_mapping(mut self, mapping: FieldMapping) -> Self {
        self.encryption_paths.push(mapping);
        self
    }

    pub fn decrypt_mapping(mut self, mapping: FieldMapping) -> Self {
        self.decryption_paths.push(mapping);
        self
    }

    pub fn oaep_digest(mut self, digest: OaepDigest) -> Self {
        self.oaep_digest = Some(digest);
        self
    }

    /// Set the OAEP digest by name (`"SHA-256"`, `"SHA512"`, ...).
    pub fn oaep_digest_name(mut self, name: &str) -> Result<Self, ConfigError> {
        let digest =
            OaepDigest::parse(name).ok_or_else(|| ConfigError::UnknownDigest(name.to_string()))?;
        self.oaep_digest = Some(digest);
        Ok(self)
    }

    pub fn field_names(mut self, names: FieldNames) -> Self {
        self.field_names = Some(names);
        self
    }

    pub fn value_encoding(mut self, encoding: ValueEncoding) -> Self {
        self.value_encoding = Some(encoding);
        self
    }

    /// Override the advertised certificate fingerprint (the decrypting party
    /// cannot always derive it itself).
    pub fn certificate_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.certificate_fingerprint = Some(fingerprint.into());
        self
    }

    /// Override the advertised public key fingerprint.
    pub fn key_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.key_fingerprint = Some(fingerprint.into());
        self
    }

    /// Verify embedded envelope fingerprints against the configured
    /// expectations on decrypt. Off by default: fingerprints are normally
    /// informational, for the remote party's key selection.
    pub fn verify_fingerprints(mut self, verify: bool) -> Self {
        self.verify_fingerprints = verify;
        self
    }

    pub fn build(self) -> Result<EncryptionConfig, ConfigError> {
        if self.encryption_certificate.is_none() && self.decryption_key.is_none() {
            return Err(ConfigError::MissingKeyMaterial);
        }
        Ok(EncryptionConfig {
            encryption_certificate: self.encryption_certificate,
            decryption_key: self.decryption_key,
            encryption_paths: self.encryption_paths,
            decryption_paths: self.decryption_paths,
            oaep_digest: self.oaep_digest.unwrap_or_default(),
            field_names: self.field_names.unwrap_or_default(),
            value_encoding: self.value_encoding.unwrap_or_default(),
            certificate_fingerprint: self.certificate_fingerprint,
            key_fingerprint: self.key_fingerprint,
            verify_fingerprints: self.verify_fingerprints,
        })
    }
}
