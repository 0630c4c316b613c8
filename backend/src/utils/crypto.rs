//! String encryption/decryption using AES-256-GCM with direct key support.
//!
//! Used to keep TOTP secrets encrypted at rest in the user store.

use aes_gcm::aead::rand_core::{OsRng, RngCore};
use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, KeyInit},
};
use base64::{Engine as _, engine::general_purpose};

#[derive(Debug)]
pub enum CryptoError {
    InvalidKey,
    EncryptionFailed,
    DecryptionFailed,
    InvalidData,
}

impl std::fmt::Display for CryptoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CryptoError::InvalidKey => write!(f, "Invalid encryption key"),
            CryptoError::EncryptionFailed => write!(f, "Encryption failed"),
            CryptoError::DecryptionFailed => write!(f, "Decryption failed"),
            CryptoError::InvalidData => write!(f, "Invalid data format"),
        }
    }
}

impl std::error::Error for CryptoError {}

/// AES-256-GCM encryption/decryption for short secrets.
pub struct SecretCipher {
    cipher: Aes256Gcm,
}

impl SecretCipher {
    /// Create a cipher from a configured key. A 44-character key is treated
    /// as base64; anything else is used as raw bytes padded or truncated to
    /// 32 bytes.
    pub fn new(key_str: &str) -> Result<Self, CryptoError> {
        let key_bytes = if key_str.len() == 44 {
            general_purpose::STANDARD
                .decode(key_str)
                .map_err(|_| CryptoError::InvalidKey)?
        } else {
            let mut bytes = vec![0u8; 32];
            let input_bytes = key_str.as_bytes();
            let copy_len = std::cmp::min(input_bytes.len(), 32);
            bytes[..copy_len].copy_from_slice(&input_bytes[..copy_len]);
            bytes
        };

        if key_bytes.len() != 32 {
            return Err(CryptoError::InvalidKey);
        }

        let key = Key::<Aes256Gcm>::from_slice(&key_bytes);
        Ok(SecretCipher {
            cipher: Aes256Gcm::new(key),
        })
    }

    /// Encrypt a string and return base64 encoded result.
    /// Each encryption uses a unique nonce.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let mut nonce_bytes = [0u8; 12];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::EncryptionFailed)?;

        let mut result = Vec::new();
        result.extend_from_slice(&nonce_bytes);
        result.extend_from_slice(&ciphertext);

        Ok(general_purpose::STANDARD.encode(result))
    }

    /// Decrypt a base64 encoded string that was encrypted with `encrypt()`.
    pub fn decrypt(&self, encrypted_data: &str) -> Result<String, CryptoError> {
        let data = general_purpose::STANDARD
            .decode(encrypted_data)
            .map_err(|_| CryptoError::InvalidData)?;

        if data.len() < 12 {
            return Err(CryptoError::InvalidData);
        }

        let (nonce_bytes, ciphertext) = data.split_at(12);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| CryptoError::DecryptionFailed)?;

        String::from_utf8(plaintext).map_err(|_| CryptoError::InvalidData)
    }
}

/// Generate a new base64-encoded 256-bit encryption key.
pub fn generate_key() -> String {
    let mut key = [0u8; 32];
    OsRng.fill_bytes(&mut key);
    general_purpose::STANDARD.encode(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt() {
        let cipher = SecretCipher::new("unit-test-key").unwrap();
        let original = "JBSWY3DPEHPK3PXP";

        let encrypted = cipher.encrypt(original).unwrap();
        let decrypted = cipher.decrypt(&encrypted).unwrap();

        assert_eq!(original, decrypted);
    }

    #[test]
    fn test_unique_nonces() {
        let cipher = SecretCipher::new("unit-test-key").unwrap();
        let msg = "Same message";
        let enc1 = cipher.encrypt(msg).unwrap();
        let enc2 = cipher.encrypt(msg).unwrap();

        // Same message should produce different ciphertext
        assert_ne!(enc1, enc2);

        // But both should decrypt correctly
        assert_eq!(cipher.decrypt(&enc1).unwrap(), msg);
        assert_eq!(cipher.decrypt(&enc2).unwrap(), msg);
    }

    #[test]
    fn test_generated_key_is_accepted() {
        let key = generate_key();
        assert_eq!(key.len(), 44);
        let cipher = SecretCipher::new(&key).unwrap();
        let encrypted = cipher.encrypt("payload").unwrap();
        assert_eq!(cipher.decrypt(&encrypted).unwrap(), "payload");
    }

    #[test]
    fn test_wrong_key_fails_to_decrypt() {
        let cipher = SecretCipher::new("key-one").unwrap();
        let other = SecretCipher::new("key-two").unwrap();
        let encrypted = cipher.encrypt("payload").unwrap();
        assert!(other.decrypt(&encrypted).is_err());
    }
}
