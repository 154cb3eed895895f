//! Fixed vectors written by the browser client (WebCrypto PBKDF2 + AES-GCM).
//!
//! Decoding these with the default secret pins the pair ordering, separator,
//! salt, round count, JSON field names and base64 alphabet to what existing
//! records use.

use mugiwara_shared::constants::UNREADABLE_MESSAGE;
use mugiwara_shared::crypto::derive_conversation_key;
use mugiwara_shared::{AppSecret, MessageCodec};

const LUFFY: &str = "+15550001";
const ZORO: &str = "+15550002";

/// `encryptMessage("Ahoy from JS ☠️", "+15550002", "+15550001")`
const BROWSER_WIRE: &str = "enc::eyJpdiI6WzExMCwxMzksMTUwLDEwMSw1NCwxOTEsOTgsMTIsMTE2LDE4Myw4OCwxNzFdLCJkYXRhIjpbODgsMjMwLDE5OSwxODAsMjMzLDIzMCwyMTAsMjM1LDEyMywxNDcsMTg5LDIxOCw3NSw2MywyMjMsMTA0LDQ4LDcxLDEzNywxMDIsMjUxLDY5LDIzOCw4OSwyMTIsMTkxLDEsNTgsMTAxLDE1OCw3NiwxODksMjA1LDgwLDEwXX0=";

const BROWSER_KEY: [u8; 32] = [
    28, 44, 42, 156, 73, 217, 82, 67, 217, 76, 109, 186, 89, 36, 174, 127, 213, 99, 183, 217, 95,
    0, 19, 36, 141, 7, 168, 5, 36, 191, 132, 174,
];

#[test]
fn default_secret_derives_browser_key() {
    let secret = AppSecret::default();
    assert_eq!(derive_conversation_key(LUFFY, ZORO, &secret), BROWSER_KEY);
    assert_eq!(derive_conversation_key(ZORO, LUFFY, &secret), BROWSER_KEY);
}

#[test]
fn browser_ciphertext_decodes_from_either_side() {
    let codec = MessageCodec::default();
    assert_eq!(codec.decode(BROWSER_WIRE, LUFFY, ZORO), "Ahoy from JS ☠\u{fe0f}");
    assert_eq!(codec.decode(BROWSER_WIRE, ZORO, LUFFY), "Ahoy from JS ☠\u{fe0f}");
}

#[test]
fn browser_ciphertext_is_unreadable_to_a_third_party() {
    let codec = MessageCodec::default();
    assert_eq!(codec.decode(BROWSER_WIRE, LUFFY, "+15550003"), UNREADABLE_MESSAGE);
}
