//! Message body codec.
//!
//! Wire format of an encrypted body:
//!
//! ```text
//! "enc::" + base64( {"iv": [12 bytes], "data": [ciphertext || 16-byte tag]} )
//! ```
//!
//! The byte arrays are JSON arrays of numbers. Any body without the `enc::`
//! prefix is a legacy plaintext record and decodes to itself.

use std::collections::HashMap;
use std::sync::Mutex;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::constants::{ENC_PREFIX, UNREADABLE_MESSAGE};
use crate::crypto::{self, AppSecret, SymmetricKey};
use crate::error::CodecError;

#[derive(Debug, Serialize, Deserialize)]
struct EncryptedPayload {
    iv: Vec<u8>,
    data: Vec<u8>,
}

pub fn is_encrypted(body: &str) -> bool {
    body.starts_with(ENC_PREFIX)
}

/// Encrypt `plaintext` under `key` into a prefixed wire string.
pub fn seal(key: &SymmetricKey, plaintext: &str) -> Result<String, CodecError> {
    let (nonce, ciphertext) = crypto::encrypt(key, plaintext.as_bytes())?;
    let payload = EncryptedPayload {
        iv: nonce.to_vec(),
        data: ciphertext,
    };
    let json = serde_json::to_vec(&payload)?;
    Ok(format!("{ENC_PREFIX}{}", STANDARD.encode(json)))
}

/// Inverse of [`seal`]. Unprefixed input is returned unchanged.
pub fn open(key: &SymmetricKey, wire: &str) -> Result<String, CodecError> {
    let Some(encoded) = wire.strip_prefix(ENC_PREFIX) else {
        return Ok(wire.to_string());
    };
    let json = STANDARD.decode(encoded.trim())?;
    let payload: EncryptedPayload = serde_json::from_slice(&json)?;
    let plaintext = crypto::decrypt(key, &payload.iv, &payload.data)?;
    Ok(String::from_utf8(plaintext)?)
}

/// Encodes and decodes bodies for one deployment secret.
///
/// Derived keys are cached per normalized pair for the lifetime of the codec;
/// the output is identical to deriving on every call.
pub struct MessageCodec {
    secret: AppSecret,
    keys: Mutex<HashMap<String, SymmetricKey>>,
}

impl MessageCodec {
    pub fn new(secret: AppSecret) -> Self {
        Self {
            secret,
            keys: Mutex::new(HashMap::new()),
        }
    }

    pub fn secret(&self) -> &AppSecret {
        &self.secret
    }

    pub fn conversation_key(&self, self_id: &str, peer_id: &str) -> SymmetricKey {
        let pair = crypto::normalized_pair(self_id, peer_id);
        if let Ok(keys) = self.keys.lock() {
            if let Some(key) = keys.get(&pair) {
                return *key;
            }
        }

        let key = crypto::derive_conversation_key(self_id, peer_id, &self.secret);
        if let Ok(mut keys) = self.keys.lock() {
            keys.insert(pair, key);
        }
        key
    }

    pub fn try_encode(&self, plaintext: &str, self_id: &str, peer_id: &str) -> Result<String, CodecError> {
        let key = self.conversation_key(self_id, peer_id);
        seal(&key, plaintext)
    }

    pub fn try_decode(&self, wire: &str, self_id: &str, peer_id: &str) -> Result<String, CodecError> {
        if !is_encrypted(wire) {
            return Ok(wire.to_string());
        }
        let key = self.conversation_key(self_id, peer_id);
        open(&key, wire)
    }

    /// Encrypt for the (self, peer) conversation. If encryption fails the
    /// plaintext is returned as-is so the send still goes through.
    pub fn encode(&self, plaintext: &str, self_id: &str, peer_id: &str) -> String {
        match self.try_encode(plaintext, self_id, peer_id) {
            Ok(wire) => wire,
            Err(e) => {
                tracing::warn!(error = %e, peer = %peer_id, "encryption failed, sending plaintext");
                plaintext.to_string()
            }
        }
    }

    /// Decrypt a stored body. Never fails: undecryptable bodies become
    /// [`UNREADABLE_MESSAGE`].
    pub fn decode(&self, wire: &str, self_id: &str, peer_id: &str) -> String {
        match self.try_decode(wire, self_id, peer_id) {
            Ok(plaintext) => plaintext,
            Err(e) => {
                tracing::warn!(error = %e, peer = %peer_id, "decryption failed");
                UNREADABLE_MESSAGE.to_string()
            }
        }
    }
}

impl Default for MessageCodec {
    fn default() -> Self {
        Self::new(AppSecret::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_APP_SECRET;

    fn codec() -> MessageCodec {
        MessageCodec::new(AppSecret::new(DEFAULT_APP_SECRET, 1_000))
    }

    #[test]
    fn test_roundtrip_either_direction() {
        let codec = codec();
        let wire = codec.encode("Yohohoho!", "alice", "bob");
        assert!(wire.starts_with(ENC_PREFIX));
        // Receiver decodes with the ids in its own order.
        assert_eq!(codec.decode(&wire, "bob", "alice"), "Yohohoho!");
        assert_eq!(codec.decode(&wire, "alice", "bob"), "Yohohoho!");
    }

    #[test]
    fn test_empty_plaintext_is_encrypted() {
        let codec = codec();
        let a = codec.encode("", "alice", "bob");
        let b = codec.encode("", "alice", "bob");
        assert!(is_encrypted(&a));
        assert_ne!(a, b);
        assert_eq!(codec.decode(&a, "alice", "bob"), "");
    }

    #[test]
    fn test_legacy_plaintext_passthrough() {
        let codec = codec();
        assert_eq!(codec.decode("Where is the booze?", "a", "b"), "Where is the booze?");
        assert_eq!(codec.decode("", "a", "b"), "");
        assert_eq!(codec.decode("ENC::shouting", "a", "b"), "ENC::shouting");
    }

    #[test]
    fn test_wrong_pair_yields_sentinel() {
        let codec = codec();
        let wire = codec.encode("secret", "alice", "bob");
        assert_eq!(codec.decode(&wire, "alice", "carol"), UNREADABLE_MESSAGE);
    }

    #[test]
    fn test_malformed_payloads_yield_sentinel() {
        let codec = codec();
        for bad in [
            "enc::",
            "enc::!!!not-base64!!!",
            // base64("not json")
            "enc::bm90IGpzb24=",
            // base64({"iv":[1,2,3],"data":[4,5,6]})
            "enc::eyJpdiI6WzEsMiwzXSwiZGF0YSI6WzQsNSw2XX0=",
        ] {
            assert_eq!(codec.decode(bad, "alice", "bob"), UNREADABLE_MESSAGE, "{bad}");
        }
    }

    #[test]
    fn test_wire_payload_shape() {
        let codec = codec();
        let wire = codec.encode("hi", "alice", "bob");
        let json = STANDARD.decode(&wire[ENC_PREFIX.len()..]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["iv"].as_array().unwrap().len(), 12);
        // 2 bytes of plaintext + 16-byte tag
        assert_eq!(value["data"].as_array().unwrap().len(), 18);
    }

    #[test]
    fn test_cached_key_matches_fresh_derivation() {
        let codec = codec();
        let cached = codec.conversation_key("alice", "bob");
        let again = codec.conversation_key("bob", "alice");
        let fresh = crypto::derive_conversation_key("alice", "bob", codec.secret());
        assert_eq!(cached, again);
        assert_eq!(cached, fresh);
    }

    #[test]
    fn test_data_uri_roundtrip() {
        let codec = codec();
        let uri = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk";
        let wire = codec.encode(uri, "alice", "bob");
        assert_eq!(codec.decode(&wire, "bob", "alice"), uri);
    }
}
