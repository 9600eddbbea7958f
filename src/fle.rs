//! Field encryption orchestrator
//!
//! Walks the configured field mappings over a JSON document: on encryption
//! each mapped plaintext field is replaced by an envelope sub-object at its
//! destination path; decryption mirrors the transformation. Processing is
//! fail-fast: the first failing field aborts with its error.

use crate::config::EncryptionConfig;
use crate::crypto;
use crate::document::{DocumentAccess, JsonPointerAccess};
use crate::envelope::{Envelope, EnvelopeError};
use crate::error::FieldSealError;
use serde_json::Value;

/// Encrypt the configured fields of `payload`, returning the transformed
/// document. Paths are resolved with the default JSON Pointer collaborator.
pub fn encrypt_payload(
    payload: &Value,
    config: &EncryptionConfig,
) -> Result<Value, FieldSealError> {
    encrypt_payload_with(payload, config, &JsonPointerAccess)
}

/// Decrypt the configured fields of `payload`, returning the transformed
/// document. Paths are resolved with the default JSON Pointer collaborator.
pub fn decrypt_payload(
    payload: &Value,
    config: &EncryptionConfig,
) -> Result<Value, FieldSealError> {
    decrypt_payload_with(payload, config, &JsonPointerAccess)
}

/// Encrypt using a caller-supplied document traversal collaborator.
pub fn encrypt_payload_with<D: DocumentAccess>(
    payload: &Value,
    config: &EncryptionConfig,
    access: &D,
) -> Result<Value, FieldSealError> {
    let mut document = payload.clone();

    for mapping in config.encryption_paths() {
        let Some(value) = access.read(&document, &mapping.source) else {
            if mapping.required {
                return Err(FieldSealError::FieldNotFound {
                    path: mapping.source.clone(),
                });
            }
            tracing::debug!(path = %mapping.source, "source field absent, skipping");
            continue;
        };

        let plaintext = plaintext_bytes(value)?;
        let certificate = config.encryption_certificate()?;
        let mut envelope =
            crypto::encrypt_bytes(&plaintext, certificate.public_key(), config.oaep_digest())?;
        attach_metadata(&mut envelope, config);

        let encoded = envelope.encode(config.field_names(), config.value_encoding());
        if mapping.source != mapping.destination {
            access.remove(&mut document, &mapping.source);
        }
        if !access.write(&mut document, &mapping.destination, Value::Object(encoded)) {
            return Err(FieldSealError::FieldNotFound {
                path: mapping.destination.clone(),
            });
        }
        tracing::debug!(
            source = %mapping.source,
            destination = %mapping.destination,
            "field encrypted"
        );
    }

    Ok(document)
}

/// Decrypt using a caller-supplied document traversal collaborator.
pub fn decrypt_payload_with<D: DocumentAccess>(
    payload: &Value,
    config: &EncryptionConfig,
    access: &D,
) -> Result<Value, FieldSealError> {
    let mut document = payload.clone();

    for mapping in config.decryption_paths() {
        let Some(value) = access.read(&document, &mapping.source) else {
            if mapping.required {
                return Err(FieldSealError::FieldNotFound {
                    path: mapping.source.clone(),
                });
            }
            tracing::debug!(path = %mapping.source, "envelope field absent, skipping");
            continue;
        };
        let Some(map) = value.as_object() else {
            return Err(EnvelopeError::MissingField {
                field: config.field_names().encrypted_value.clone(),
            }
            .into());
        };

        let envelope = Envelope::decode(map, config.field_names(), config.value_encoding())?;
        if config.verify_fingerprints() {
            verify_fingerprints(&envelope, config)?;
        }

        // An embedded algorithm tag, when the field is mapped and present,
        // overrides the out-of-band configured digest.
        let digest = match &envelope.oaep_digest {
            Some(name) => crypto::OaepDigest::parse(name)
                .ok_or_else(|| EnvelopeError::UnknownDigest(name.clone()))?,
            None => config.oaep_digest(),
        };

        let key = config.decryption_key()?;
        let plaintext = crypto::decrypt_bytes(&envelope, key.rsa_key(), digest)?;
        let value = plaintext_value(&plaintext);

        if mapping.source != mapping.destination {
            access.remove(&mut document, &mapping.source);
        }
        if !access.write(&mut document, &mapping.destination, value) {
            return Err(FieldSealError::FieldNotFound {
                path: mapping.destination.clone(),
            });
        }
        tracing::debug!(
            source = %mapping.source,
            destination = %mapping.destination,
            "field decrypted"
        );
    }

    Ok(document)
}

fn attach_metadata(envelope: &mut Envelope, config: &EncryptionConfig) {
    let names = config.field_names();
    if names.oaep_digest.is_some() {
        envelope.oaep_digest = Some(config.oaep_digest().wire_name().to_string());
    }
    if names.certificate_fingerprint.is_some() {
        envelope.certificate_fingerprint = config.certificate_fingerprint();
    }
    if names.key_fingerprint.is_some() {
        envelope.key_fingerprint = config.key_fingerprint();
    }
}

fn verify_fingerprints(
    envelope: &Envelope,
    config: &EncryptionConfig,
) -> Result<(), EnvelopeError> {
    let checks = [
        (&envelope.certificate_fingerprint, config.certificate_fingerprint()),
        (&envelope.key_fingerprint, config.key_fingerprint()),
    ];
    for (embedded, expected) in checks {
        if let (Some(embedded), Some(expected)) = (embedded, expected) {
            if !embedded.eq_ignore_ascii_case(&expected) {
                return Err(EnvelopeError::FingerprintMismatch);
            }
        }
    }
    Ok(())
}

/// Serialize a field value for encryption as compact JSON. Strings keep
/// their JSON quoting so [`plaintext_value`] re-parses them losslessly: a
/// string like `"123"` must come back as a string, not a number.
fn plaintext_bytes(value: &Value) -> Result<Vec<u8>, FieldSealError> {
    Ok(serde_json::to_vec(value)?)
}

/// Reconstruct a field value from decrypted bytes: parsed as JSON when
/// possible. The string fallback keeps interoperability with peers that
/// encrypt bare unquoted strings.
fn plaintext_value(plaintext: &[u8]) -> Value {
    serde_json::from_slice(plaintext)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(plaintext).into_owned()))
}
