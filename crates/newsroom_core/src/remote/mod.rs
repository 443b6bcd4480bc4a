//! Card backend contract and implementations.
//!
//! # Responsibility
//! - Define the four calls the store makes against the card backend.
//! - Keep transport details (HTTP, in-process) out of the store.
//!
//! # Invariants
//! - Every call is attempted exactly once; there is no retry here.
//! - Non-success responses surface as errors, never as partial data.

pub mod http;
pub mod memory;

use crate::model::card::{Card, CardId, CardPatch};
use async_trait::async_trait;

pub use http::HttpCardBackend;
pub use memory::MemoryCardBackend;

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Transport and protocol failures talking to the card backend.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("card not found on backend: {0}")]
    NotFound(CardId),
    #[error("unexpected HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode backend response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid backend configuration: {0}")]
    Config(String),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Remote side of the board.
///
/// `GET /cards`, `POST /cards/generate`, `PATCH /cards/{id}`,
/// `DELETE /cards/{id}`.
#[async_trait]
pub trait CardBackend: Send + Sync {
    /// Ordered list of all cards.
    async fn list_cards(&self) -> RemoteResult<Vec<Card>>;
    /// Asks the generator for a batch of new `proposed` cards.
    async fn generate_cards(&self) -> RemoteResult<Vec<Card>>;
    /// Merges `patch` into the stored card and returns the merged card.
    async fn patch_card(&self, id: &str, patch: &CardPatch) -> RemoteResult<Card>;
    async fn delete_card(&self, id: &str) -> RemoteResult<()>;
}
