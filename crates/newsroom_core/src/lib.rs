//! Core board logic for the Newsroom editorial planner.
//! This crate is the single source of truth for board invariants.

pub mod board;
pub mod config;
pub mod logging;
pub mod model;
pub mod remote;
pub mod store;

pub use board::collection::{AppendReport, BoardSnapshot, CardCollection};
pub use board::policy::{board_columns, BoardColumn, TransitionPolicy};
pub use board::session::{
    ConfirmedMove, DragController, DragError, DragOutcome, DragState, DropTarget, HoverIgnored,
    HoverOutcome, PendingMove,
};
pub use board::BoardSurface;
pub use config::{BackendConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::card::{
    Card, CardId, CardPatch, CardStatus, CardType, CardValidationError, ResearchStatus,
};
pub use remote::{CardBackend, HttpCardBackend, MemoryCardBackend, RemoteError, RemoteResult};
pub use store::{CardStore, StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
