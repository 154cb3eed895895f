/// Application name
pub const APP_NAME: &str = "Mugiwara Chat";

/// Prefix marking an encrypted message body. Bodies without it are legacy plaintext.
pub const ENC_PREFIX: &str = "enc::";

/// Shown in place of any body that fails to decrypt.
pub const UNREADABLE_MESSAGE: &str = "☠️ [Unreadable Message]";

/// Default application-wide secret mixed into every conversation key.
/// Also used as the PBKDF2 salt. Changing it orphans every existing ciphertext.
pub const DEFAULT_APP_SECRET: &str = "MUGIWARA_GRAND_LINE_SECRET_SALT_V1";

/// Separator placed between the two sorted participant ids
pub const PAIR_SEPARATOR: &str = "_";

/// PBKDF2-HMAC-SHA256 rounds
pub const KDF_ITERATIONS: u32 = 100_000;

/// AES-GCM nonce size in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Symmetric key size in bytes (AES-256)
pub const SYMMETRIC_KEY_SIZE: usize = 32;

/// Conversation preview labels for non-text messages
pub const PREVIEW_IMAGE: &str = "📷 Image";
pub const PREVIEW_VIDEO: &str = "🎥 Video";
pub const PREVIEW_AUDIO: &str = "🎤 Voice Message";
pub const PREVIEW_MEDIA: &str = "Shared Media";
