//! Field-level symmetric encryption for PII at rest.
//!
//! AES-256-GCM with a random 96-bit nonce per value. The ciphertext envelope
//! is `base64(nonce || ciphertext+tag)`. The key comes straight from
//! `ENCRYPTION_KEY` (base64, 32 bytes) — a missing or malformed key fails the
//! constructor, which `main` treats as fatal before serving any session.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

const NONCE_SIZE: usize = 12;
const KEY_SIZE: usize = 32;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("encryption key is not valid base64")]
    KeyEncoding,

    #[error("encryption key must decode to exactly {KEY_SIZE} bytes")]
    KeyLength,

    #[error("encryption failed")]
    Encrypt,

    #[error("decryption failed: wrong key or corrupted data")]
    Decrypt,

    #[error("ciphertext envelope is malformed")]
    Envelope,
}

/// Symmetric cipher for individual record fields.
#[derive(Clone)]
pub struct FieldCipher {
    cipher: Aes256Gcm,
}

impl FieldCipher {
    /// Builds a cipher from a base64-encoded 32-byte key.
    pub fn new(key_b64: &str) -> Result<Self, CryptoError> {
        let key_bytes = BASE64
            .decode(key_b64.trim())
            .map_err(|_| CryptoError::KeyEncoding)?;

        if key_bytes.len() != KEY_SIZE {
            return Err(CryptoError::KeyLength);
        }

        let key = Key::<Aes256Gcm>::from_slice(&key_bytes);
        Ok(Self {
            cipher: Aes256Gcm::new(key),
        })
    }

    /// Encrypts a field value. Each call draws a fresh nonce, so equal
    /// plaintexts produce distinct ciphertexts.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::Encrypt)?;

        let mut combined = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);

        Ok(BASE64.encode(combined))
    }

    /// Decrypts a value produced by [`encrypt`](Self::encrypt).
    pub fn decrypt(&self, encrypted: &str) -> Result<String, CryptoError> {
        let data = BASE64
            .decode(encrypted)
            .map_err(|_| CryptoError::Envelope)?;

        if data.len() < NONCE_SIZE + 1 {
            return Err(CryptoError::Envelope);
        }

        let nonce = Nonce::from_slice(&data[..NONCE_SIZE]);
        let ciphertext = &data[NONCE_SIZE..];

        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| CryptoError::Decrypt)?;

        String::from_utf8(plaintext).map_err(|_| CryptoError::Decrypt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> String {
        BASE64.encode([7u8; KEY_SIZE])
    }

    #[test]
    fn test_round_trip() {
        let cipher = FieldCipher::new(&test_key()).unwrap();
        for value in ["+15551234567", "jane.doe@example.com", "Berlin, Germany", ""] {
            let encrypted = cipher.encrypt(value).unwrap();
            assert_ne!(encrypted, value);
            assert_eq!(cipher.decrypt(&encrypted).unwrap(), value);
        }
    }

    #[test]
    fn test_equal_plaintexts_encrypt_differently() {
        let cipher = FieldCipher::new(&test_key()).unwrap();
        let a = cipher.encrypt("same value").unwrap();
        let b = cipher.encrypt("same value").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let cipher = FieldCipher::new(&test_key()).unwrap();
        let encrypted = cipher.encrypt("secret").unwrap();
        let mut bytes = BASE64.decode(&encrypted).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        let tampered = BASE64.encode(bytes);
        assert!(matches!(
            cipher.decrypt(&tampered),
            Err(CryptoError::Decrypt)
        ));
    }

    #[test]
    fn test_wrong_key_fails() {
        let cipher = FieldCipher::new(&test_key()).unwrap();
        let other = FieldCipher::new(&BASE64.encode([9u8; KEY_SIZE])).unwrap();
        let encrypted = cipher.encrypt("secret").unwrap();
        assert!(other.decrypt(&encrypted).is_err());
    }

    #[test]
    fn test_key_must_be_base64() {
        assert!(matches!(
            FieldCipher::new("not base64!!!"),
            Err(CryptoError::KeyEncoding)
        ));
    }

    #[test]
    fn test_key_must_be_32_bytes() {
        let short = BASE64.encode([1u8; 16]);
        assert!(matches!(
            FieldCipher::new(&short),
            Err(CryptoError::KeyLength)
        ));
    }

    #[test]
    fn test_garbage_envelope_fails() {
        let cipher = FieldCipher::new(&test_key()).unwrap();
        assert!(cipher.decrypt("????").is_err());
        assert!(matches!(
            cipher.decrypt(&BASE64.encode([0u8; 4])),
            Err(CryptoError::Envelope)
        ));
    }
}
