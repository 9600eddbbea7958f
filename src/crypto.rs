//! Hybrid cipher engine
//!
//! One fixed protocol: AES-128-CBC with PKCS#7 padding for the payload,
//! RSA-OAEP for wrapping the one-time symmetric key. The OAEP digest is
//! configurable and drives both the hash and the MGF1 mask function. The
//! symmetric key and IV are generated fresh from the OS CSPRNG on every
//! encryption call, so IV reuse under the same key cannot occur.

use crate::envelope::Envelope;
use aes::Aes128;
use cipher::block_padding::Pkcs7;
use cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::{rngs::OsRng, RngCore};
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use thiserror::Error;

/// AES-128 key length in bytes, fixed by the envelope protocol.
pub(crate) const AES_KEY_SIZE: usize = 16;
/// AES block and IV length in bytes.
pub(crate) const AES_BLOCK_SIZE: usize = 16;

/// Errors raised by the cipher engine
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key wrapping failed (e.g. the plaintext key does not fit the modulus)
    #[error("Encryption failed")]
    EncryptionFailed,

    /// Key unwrap or payload decryption failed.
    ///
    /// Deliberately opaque: unwrap faults, bad IV lengths, and padding
    /// faults all collapse into this variant so the error cannot be used
    /// as a padding oracle, and no key or plaintext material is carried.
    #[error("Decryption failed")]
    DecryptionFailed,
}

/// OAEP digest algorithm selection.
///
/// The same digest is used for the OAEP hash and the MGF1 mask function;
/// encrypting and decrypting parties must agree on it out-of-band unless
/// the envelope carries an algorithm tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OaepDigest {
    /// SHA-1, kept for interoperability with legacy envelopes
    Sha1,
    /// SHA-256 (default)
    #[default]
    Sha256,
    /// SHA-512
    Sha512,
}

impl OaepDigest {
    /// Parse a digest name, accepting both dashed (`"SHA-256"`) and
    /// dash-less (`"SHA256"`) spellings.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().replace('-', "").as_str() {
            "SHA1" => Some(OaepDigest::Sha1),
            "SHA256" => Some(OaepDigest::Sha256),
            "SHA512" => Some(OaepDigest::Sha512),
            _ => None,
        }
    }

    /// Canonical algorithm name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OaepDigest::Sha1 => "SHA-1",
            OaepDigest::Sha256 => "SHA-256",
            OaepDigest::Sha512 => "SHA-512",
        }
    }

    /// Dash-less spelling used for the envelope algorithm tag.
    pub fn wire_name(&self) -> &'static str {
        match self {
            OaepDigest::Sha1 => "SHA1",
            OaepDigest::Sha256 => "SHA256",
            OaepDigest::Sha512 => "SHA512",
        }
    }

    fn padding(&self) -> Oaep {
        match self {
            OaepDigest::Sha1 => Oaep::new::<sha1::Sha1>(),
            OaepDigest::Sha256 => Oaep::new::<sha2::Sha256>(),
            OaepDigest::Sha512 => Oaep::new::<sha2::Sha512>(),
        }
    }
}

impl std::fmt::Display for OaepDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encrypt plaintext bytes under a fresh AES-128 key and IV, wrapping the
/// key with the recipient's public key under RSA-OAEP.
///
/// Metadata fields (fingerprints, algorithm tag) are left unset; the
/// orchestrator attaches them from configuration.
pub(crate) fn encrypt_bytes(
    plaintext: &[u8],
    public_key: &RsaPublicKey,
    digest: OaepDigest,
) -> Result<Envelope, CryptoError> {
    let mut key = [0u8; AES_KEY_SIZE];
    let mut iv = [0u8; AES_BLOCK_SIZE];
    OsRng.fill_bytes(&mut key);
    OsRng.fill_bytes(&mut iv);

    let ciphertext = cbc::Encryptor::<Aes128>::new(&key.into(), &iv.into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let wrapped_key = public_key
        .encrypt(&mut OsRng, digest.padding(), &key)
        .map_err(|_| CryptoError::EncryptionFailed)?;

    Ok(Envelope {
        ciphertext,
        wrapped_key,
        iv: iv.to_vec(),
        oaep_digest: None,
        certificate_fingerprint: None,
        key_fingerprint: None,
    })
}

/// Unwrap the symmetric key with the holder's private key and decrypt the
/// envelope ciphertext with it and the envelope IV.
pub(crate) fn decrypt_bytes(
    envelope: &Envelope,
    private_key: &RsaPrivateKey,
    digest: OaepDigest,
) -> Result<Vec<u8>, CryptoError> {
    let key = private_key
        .decrypt(digest.padding(), &envelope.wrapped_key)
        .map_err(|_| CryptoError::DecryptionFailed)?;
    if key.len() != AES_KEY_SIZE || envelope.iv.len() != AES_BLOCK_SIZE {
        return Err(CryptoError::DecryptionFailed);
    }

    cbc::Decryptor::<Aes128>::new_from_slices(&key, &envelope.iv)
        .map_err(|_| CryptoError::DecryptionFailed)?
        .decrypt_padded_vec_mut::<Pkcs7>(&envelope.ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed)
}
