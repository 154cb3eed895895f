//! Client-side conversation layer for Mugiwara Chat.
//!
//! [`ChatService`] is the single entry point: login and profile edits,
//! the conversation list, message threads, sending, and scheduled refresh.
//! Message bodies are end-to-end encrypted by [`mugiwara_shared::MessageCodec`]
//! before they reach the row store.

pub mod config;
pub mod conversations;
pub mod error;
pub mod profile;
pub mod refresh;
pub mod session;

pub use config::ClientConfig;
pub use conversations::{ChatService, Conversation, Message};
pub use error::{ClientError, Result};
pub use profile::ProfileUpdate;
pub use refresh::{PollHandle, Poller, ResponseGate};
pub use session::Session;

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global `fmt` subscriber.  `RUST_LOG` overrides the default
/// filter.  Calling it twice is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("mugiwara_client=debug,mugiwara_store=info,mugiwara_shared=info,warn")
    });

    let installed = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();

    match installed {
        Ok(()) => tracing::info!("Starting Mugiwara Chat client"),
        Err(_) => tracing::debug!("tracing subscriber already installed"),
    }
}
