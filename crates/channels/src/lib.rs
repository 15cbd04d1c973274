//! Chat transports.
//!
//! A channel owns everything user-facing: greeting commands, input
//! validation, sender allow-lists and per-message concurrency. The agent
//! loop behind it stays a plain text-in/text-out call.

use async_trait::async_trait;

pub mod telegram;

pub use telegram::TelegramChannel;

/// A chat transport
#[async_trait]
pub trait Channel: Send + Sync {
    fn name(&self) -> &str;

    /// Run the transport until the process exits.
    async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Empty allow-list means everyone is allowed.
pub fn is_allowed(allow_from: &[String], sender_id: &str) -> bool {
    allow_from.is_empty() || allow_from.iter().any(|id| id == sender_id)
}
