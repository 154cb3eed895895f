use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Decryption failed: invalid ciphertext or wrong key")]
    DecryptionFailed,

    #[error("Invalid nonce length: expected {expected}, got {actual}")]
    InvalidNonceLength { expected: usize, actual: usize },
}

/// Failures while turning a wire string back into plaintext (or the reverse).
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Invalid base64 envelope: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Malformed payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Plaintext is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
}
