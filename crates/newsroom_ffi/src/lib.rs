//! Flutter-facing bindings for the Newsroom board.

pub mod api;
