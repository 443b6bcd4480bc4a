//! Kanban board mechanics.
//!
//! # Responsibility
//! - Keep the ordered card list and its column projections.
//! - Gatekeep drop targets and cross-column confirmation.
//! - Run drag gestures as an explicit `Idle/Dragging/PendingConfirm` machine.
//!
//! # Invariants
//! - Board mutation during a gesture goes through [`BoardSurface`] only.
//! - Moves never add or drop cards.

pub mod collection;
pub mod policy;
pub mod session;

use crate::model::card::{Card, CardStatus};
use collection::BoardSnapshot;

/// Write surface the drag controller needs from whatever owns the cards.
///
/// Implemented by the bare [`collection::CardCollection`] and by the shared
/// [`crate::store::CardStore`] handle.
pub trait BoardSurface {
    fn card(&self, id: &str) -> Option<Card>;
    fn move_card(&mut self, id: &str, status: CardStatus, target_rank: usize) -> bool;
    fn reorder(&mut self, active_id: &str, over_id: &str) -> bool;
    fn snapshot(&self) -> BoardSnapshot;
    fn restore(&mut self, snapshot: BoardSnapshot);
}
