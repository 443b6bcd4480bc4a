//! Domain model for the editorial board.
//!
//! # Responsibility
//! - Define canonical data structures used by core board logic.
//! - Keep the wire shape of cards identical to the backend contract.
//!
//! # Invariants
//! - Every card is identified by a stable `CardId`.
//! - Column membership is derived from `status`; it is never stored.

pub mod card;
