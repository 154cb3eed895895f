use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::RngCore;
use sha2::Sha256;

use crate::constants::{
    DEFAULT_APP_SECRET, KDF_ITERATIONS, NONCE_SIZE, PAIR_SEPARATOR, SYMMETRIC_KEY_SIZE,
};
use crate::error::CryptoError;

pub type SymmetricKey = [u8; SYMMETRIC_KEY_SIZE];

/// Application-wide secret every conversation key is derived from.
///
/// Anyone holding this value and two participant ids can rebuild that pair's
/// key. It is a master key for the whole deployment: injected per deployment,
/// never rotated.
#[derive(Clone)]
pub struct AppSecret {
    secret: String,
    iterations: u32,
}

impl AppSecret {
    pub fn new(secret: impl Into<String>, iterations: u32) -> Self {
        Self {
            secret: secret.into(),
            iterations: iterations.max(1),
        }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.secret.as_bytes()
    }
}

impl Default for AppSecret {
    fn default() -> Self {
        Self::new(DEFAULT_APP_SECRET, KDF_ITERATIONS)
    }
}

impl std::fmt::Debug for AppSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppSecret")
            .field("secret", &"<redacted>")
            .field("iterations", &self.iterations)
            .finish()
    }
}

/// Sorted ids joined by the pair separator. Identical for (a, b) and (b, a).
pub fn normalized_pair(a: &str, b: &str) -> String {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    format!("{lo}{PAIR_SEPARATOR}{hi}")
}

// PBKDF2-HMAC-SHA256(password = pair || secret, salt = secret)
pub fn derive_conversation_key(a: &str, b: &str, secret: &AppSecret) -> SymmetricKey {
    let mut material = normalized_pair(a, b).into_bytes();
    material.extend_from_slice(secret.as_bytes());

    let mut key = [0u8; SYMMETRIC_KEY_SIZE];
    pbkdf2::pbkdf2_hmac::<Sha256>(&material, secret.as_bytes(), secret.iterations(), &mut key);
    key
}

pub fn generate_nonce() -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut nonce);
    nonce
}

/// AES-256-GCM under a fresh random nonce. Returns (nonce, ciphertext || tag).
pub fn encrypt(
    key: &SymmetricKey,
    plaintext: &[u8],
) -> Result<([u8; NONCE_SIZE], Vec<u8>), CryptoError> {
    let cipher = Aes256Gcm::new(key.into());
    let nonce_bytes = generate_nonce();
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| CryptoError::EncryptionFailed)?;

    Ok((nonce_bytes, ciphertext))
}

pub fn decrypt(key: &SymmetricKey, nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if nonce.len() != NONCE_SIZE {
        return Err(CryptoError::InvalidNonceLength {
            expected: NONCE_SIZE,
            actual: nonce.len(),
        });
    }

    let cipher = Aes256Gcm::new(key.into());
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed)
}
