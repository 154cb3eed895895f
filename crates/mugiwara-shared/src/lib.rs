//! # mugiwara-shared
//!
//! Deterministic per-conversation encryption for Mugiwara Chat.
//!
//! A conversation key is derived from the two participant ids and the
//! deployment's [`AppSecret`](crypto::AppSecret); nothing is exchanged or
//! stored. Bodies are sealed with AES-256-GCM and framed so encrypted and
//! legacy plaintext records share one column.

pub mod codec;
pub mod constants;
pub mod crypto;
pub mod error;
pub mod types;

pub use codec::MessageCodec;
pub use crypto::{AppSecret, SymmetricKey};
pub use error::{CodecError, CryptoError};
pub use types::{DeliveryStatus, MessageKind, ParticipantId};
