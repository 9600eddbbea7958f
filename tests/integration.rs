use fieldseal::{
    decrypt_payload, encrypt_payload, DecryptionKey, EncryptionCertificate, EncryptionConfig,
    FieldMapping, FieldNames, FieldSealError, OaepDigest, ValueEncoding,
};
use serde_json::json;
use std::path::PathBuf;

const CERT_FINGERPRINT: &str = "9854db70af8569c3065b84e4981e1fa9ad076a275f72be38b866ecf1e1f7db42";
const KEY_FINGERPRINT: &str = "3b4b518ab1990f813428a985f3826f89f97ce0c4e41d5b903f57e15148cc7987";

fn data(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn certificate() -> EncryptionCertificate {
    EncryptionCertificate::from_file(data("test_certificate.pem")).unwrap()
}

fn private_key() -> DecryptionKey {
    DecryptionKey::from_file(data("test_key_pkcs8.der")).unwrap()
}

fn encrypt_config(encoding: ValueEncoding) -> EncryptionConfig {
    EncryptionConfig::builder()
        .encryption_certificate(certificate())
        .encrypt_path("/data", "/encryptedData")
        .field_names(FieldNames::minimal("encryptedValue", "encryptedKey", "iv"))
        .value_encoding(encoding)
        .build()
        .unwrap()
}

fn decrypt_config(encoding: ValueEncoding) -> EncryptionConfig {
    EncryptionConfig::builder()
        .decryption_key(private_key())
        .decrypt_path("/encryptedData", "/data")
        .field_names(FieldNames::minimal("encryptedValue", "encryptedKey", "iv"))
        .value_encoding(encoding)
        .build()
        .unwrap()
}

#[test]
fn test_document_roundtrip_hex() -> Result<(), FieldSealError> {
    let document = json!({"data": {"field1": "value1"}});

    let encrypted = encrypt_payload(&document, &encrypt_config(ValueEncoding::Hex))?;

    // The plaintext field is gone; the envelope sub-object replaces it.
    assert!(encrypted.get("data").is_none());
    let envelope = encrypted["encryptedData"].as_object().unwrap();
    for field in ["encryptedValue", "encryptedKey", "iv"] {
        let text = envelope[field].as_str().unwrap();
        assert!(!text.is_empty());
        assert!(
            text.chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()),
            "{field} is not lowercase hex: {text}"
        );
    }
    // 2048-bit modulus: wrapped key is 256 bytes, 512 hex chars.
    assert_eq!(envelope["encryptedKey"].as_str().unwrap().len(), 512);
    assert_eq!(envelope["iv"].as_str().unwrap().len(), 32);

    let decrypted = decrypt_payload(&encrypted, &decrypt_config(ValueEncoding::Hex))?;
    assert_eq!(decrypted, document);
    Ok(())
}

#[test]
fn test_document_roundtrip_base64() -> Result<(), FieldSealError> {
    let document = json!({"data": {"field1": "value1", "nested": {"n": 1}}});

    let encrypted = encrypt_payload(&document, &encrypt_config(ValueEncoding::Base64))?;
    let decrypted = decrypt_payload(&encrypted, &decrypt_config(ValueEncoding::Base64))?;

    assert_eq!(decrypted, document);
    Ok(())
}

#[test]
fn test_string_field_roundtrip() -> Result<(), FieldSealError> {
    let config = EncryptionConfig::builder()
        .encryption_certificate(certificate())
        .decryption_key(private_key())
        .encrypt_path("/secret", "/encryptedSecret")
        .decrypt_path("/encryptedSecret", "/secret")
        .build()
        .unwrap();

    let document = json!({"secret": "value1", "public": true});
    let encrypted = encrypt_payload(&document, &config)?;
    assert!(encrypted.get("secret").is_none());
    assert!(encrypted["public"].as_bool().unwrap());

    let decrypted = decrypt_payload(&encrypted, &config)?;
    assert_eq!(decrypted, document);
    Ok(())
}

#[test]
fn test_json_looking_string_keeps_its_type() -> Result<(), FieldSealError> {
    let config = EncryptionConfig::builder()
        .encryption_certificate(certificate())
        .decryption_key(private_key())
        .encrypt_path("/secret", "/encryptedSecret")
        .decrypt_path("/encryptedSecret", "/secret")
        .build()
        .unwrap();

    // Strings whose content happens to parse as JSON must stay strings.
    for text in ["123", "true", "null", "{\"field1\":\"value1\"}"] {
        let document = json!({"secret": text});
        let encrypted = encrypt_payload(&document, &config)?;
        let decrypted = decrypt_payload(&encrypted, &config)?;
        assert_eq!(decrypted, document, "string {text:?} changed type");
        assert!(decrypted["secret"].is_string());
    }
    Ok(())
}

#[test]
fn test_unknown_embedded_digest_tag_fails() {
    let document = json!({"data": {"field1": "value1"}});
    let encrypt = EncryptionConfig::builder()
        .encryption_certificate(certificate())
        .encrypt_path("/data", "/encryptedData")
        .build()
        .unwrap();
    let mut encrypted = encrypt_payload(&document, &encrypt).unwrap();
    encrypted["encryptedData"]["oaepHashingAlgorithm"] = json!("MD5");

    let decrypt = EncryptionConfig::builder()
        .decryption_key(private_key())
        .decrypt_path("/encryptedData", "/data")
        .build()
        .unwrap();

    let err = decrypt_payload(&encrypted, &decrypt).unwrap_err();
    assert!(err.is_envelope_error(), "expected UnknownDigest, got {err:?}");
}

#[test]
fn test_successive_encryptions_differ() -> Result<(), FieldSealError> {
    let config = encrypt_config(ValueEncoding::Hex);
    let document = json!({"data": {"field1": "value1"}});

    let first = encrypt_payload(&document, &config)?;
    let second = encrypt_payload(&document, &config)?;

    for field in ["encryptedValue", "encryptedKey", "iv"] {
        assert_ne!(
            first["encryptedData"][field], second["encryptedData"][field],
            "{field} must be fresh per call"
        );
    }
    Ok(())
}

#[test]
fn test_cross_digest_decryption_fails() {
    let document = json!({"data": {"field1": "value1"}});

    // Minimal field names: no algorithm tag travels with the envelope, so
    // the decrypting side relies entirely on its (wrong) configured digest.
    let encrypted = encrypt_payload(&document, &encrypt_config(ValueEncoding::Hex)).unwrap();

    let config = EncryptionConfig::builder()
        .decryption_key(private_key())
        .decrypt_path("/encryptedData", "/data")
        .field_names(FieldNames::minimal("encryptedValue", "encryptedKey", "iv"))
        .oaep_digest(OaepDigest::Sha1)
        .build()
        .unwrap();

    let err = decrypt_payload(&encrypted, &config).unwrap_err();
    assert!(err.is_crypto_error(), "expected DecryptionError, got {err:?}");
}

#[test]
fn test_embedded_digest_tag_overrides_configured() -> Result<(), FieldSealError> {
    let document = json!({"data": {"field1": "value1"}});

    // Default field names map the algorithm tag, so SHA-512 travels with
    // the envelope and wins over the decrypting side's SHA-256 default.
    let encrypt = EncryptionConfig::builder()
        .encryption_certificate(certificate())
        .encrypt_path("/data", "/encryptedData")
        .oaep_digest(OaepDigest::Sha512)
        .build()
        .unwrap();
    let decrypt = EncryptionConfig::builder()
        .decryption_key(private_key())
        .decrypt_path("/encryptedData", "/data")
        .build()
        .unwrap();

    let encrypted = encrypt_payload(&document, &encrypt)?;
    assert_eq!(
        encrypted["encryptedData"]["oaepHashingAlgorithm"],
        "SHA512"
    );

    let decrypted = decrypt_payload(&encrypted, &decrypt)?;
    assert_eq!(decrypted, document);
    Ok(())
}

#[test]
fn test_fingerprint_fields_are_populated() -> Result<(), FieldSealError> {
    let config = EncryptionConfig::builder()
        .encryption_certificate(certificate())
        .encrypt_path("/data", "/encryptedData")
        .build()
        .unwrap();

    let encrypted = encrypt_payload(&json!({"data": {"field1": "value1"}}), &config)?;
    let envelope = &encrypted["encryptedData"];

    assert_eq!(
        envelope["encryptionCertificateFingerprint"],
        CERT_FINGERPRINT
    );
    assert_eq!(envelope["encryptionKeyFingerprint"], KEY_FINGERPRINT);
    Ok(())
}

#[test]
fn test_fingerprint_verification_mismatch() {
    let document = json!({"data": {"field1": "value1"}});
    let encrypt = EncryptionConfig::builder()
        .encryption_certificate(certificate())
        .encrypt_path("/data", "/encryptedData")
        .build()
        .unwrap();
    let encrypted = encrypt_payload(&document, &encrypt).unwrap();

    let decrypt = EncryptionConfig::builder()
        .decryption_key(private_key())
        .decrypt_path("/encryptedData", "/data")
        .certificate_fingerprint("0000000000000000000000000000000000000000000000000000000000000000")
        .verify_fingerprints(true)
        .build()
        .unwrap();

    let err = decrypt_payload(&encrypted, &decrypt).unwrap_err();
    assert!(err.is_envelope_error(), "expected fingerprint mismatch, got {err:?}");
}

#[test]
fn test_malformed_envelope_missing_iv() {
    let payload = json!({
        "encryptedData": {
            "encryptedValue": "deadbeef",
            "encryptedKey": "deadbeef"
        }
    });

    let err = decrypt_payload(&payload, &decrypt_config(ValueEncoding::Hex)).unwrap_err();
    assert!(err.is_envelope_error(), "expected MalformedEnvelope, got {err:?}");
}

#[test]
fn test_required_field_missing() {
    let config = EncryptionConfig::builder()
        .encryption_certificate(certificate())
        .encrypt_mapping(FieldMapping::new("/data", "/encryptedData").required())
        .build()
        .unwrap();

    let err = encrypt_payload(&json!({"other": 1}), &config).unwrap_err();
    assert!(err.is_field_not_found(), "expected FieldNotFound, got {err:?}");
}

#[test]
fn test_optional_field_missing_is_skipped() -> Result<(), FieldSealError> {
    let config = encrypt_config(ValueEncoding::Hex);
    let document = json!({"other": 1});

    let encrypted = encrypt_payload(&document, &config)?;
    assert_eq!(encrypted, document);
    Ok(())
}

#[test]
fn test_encrypting_without_certificate_fails_fast() {
    let config = EncryptionConfig::builder()
        .decryption_key(private_key())
        .encrypt_path("/data", "/encryptedData")
        .build()
        .unwrap();

    let err = encrypt_payload(&json!({"data": {"field1": "value1"}}), &config).unwrap_err();
    assert!(err.is_config_error(), "expected ConfigurationError, got {err:?}");
}

#[test]
fn test_decrypting_without_key_fails_fast() {
    let encrypted =
        encrypt_payload(&json!({"data": {"x": 1}}), &encrypt_config(ValueEncoding::Hex)).unwrap();

    let config = EncryptionConfig::builder()
        .encryption_certificate(certificate())
        .decrypt_path("/encryptedData", "/data")
        .field_names(FieldNames::minimal("encryptedValue", "encryptedKey", "iv"))
        .build()
        .unwrap();

    let err = decrypt_payload(&encrypted, &config).unwrap_err();
    assert!(err.is_config_error(), "expected ConfigurationError, got {err:?}");
}

#[test]
fn test_in_place_encryption() -> Result<(), FieldSealError> {
    let config = EncryptionConfig::builder()
        .encryption_certificate(certificate())
        .decryption_key(private_key())
        .encrypt_path("/data", "/data")
        .decrypt_path("/data", "/data")
        .field_names(FieldNames::minimal("encryptedValue", "encryptedKey", "iv"))
        .build()
        .unwrap();

    let document = json!({"data": {"field1": "value1"}});
    let encrypted = encrypt_payload(&document, &config)?;
    assert!(encrypted["data"].get("encryptedValue").is_some());

    let decrypted = decrypt_payload(&encrypted, &config)?;
    assert_eq!(decrypted, document);
    Ok(())
}

#[test]
fn test_multiple_mappings_ordered() -> Result<(), FieldSealError> {
    let config = EncryptionConfig::builder()
        .encryption_certificate(certificate())
        .decryption_key(private_key())
        .encrypt_path("/a", "/ea")
        .encrypt_path("/b", "/eb")
        .decrypt_path("/ea", "/a")
        .decrypt_path("/eb", "/b")
        .field_names(FieldNames::minimal("encryptedValue", "encryptedKey", "iv"))
        .build()
        .unwrap();

    let document = json!({"a": {"x": 1}, "b": [1, 2, 3], "c": "clear"});
    let encrypted = encrypt_payload(&document, &config)?;
    assert!(encrypted.get("a").is_none());
    assert!(encrypted.get("b").is_none());
    assert_eq!(encrypted["c"], "clear");

    let decrypted = decrypt_payload(&encrypted, &config)?;
    assert_eq!(decrypted, document);
    Ok(())
}
