//! Drag session controller.
//!
//! # Responsibility
//! - Drive one drag gesture through `Idle -> Dragging -> (PendingConfirm) -> Idle`.
//! - Apply optimistic moves to the board while the gesture is in flight.
//! - Hold the gesture-start snapshot for rollback on a declined confirmation.
//!
//! # Invariants
//! - A snapshot lives only inside `Dragging` / `PendingConfirm` state.
//! - At most one confirmation is pending; no gesture starts while it is.
//! - Hover events resolving to a locked column never touch the board.
//! - Cancelling a pending move restores the snapshot exactly, offline.

use crate::board::collection::BoardSnapshot;
use crate::board::policy::TransitionPolicy;
use crate::board::BoardSurface;
use crate::model::card::{CardId, CardStatus};
use log::{debug, info, warn};

/// What the pointer is currently over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// Another card; its status is the target column.
    Card(CardId),
    /// A column body, typically an empty one.
    Column(CardStatus),
}

/// Captured at gesture start and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    pub card_id: CardId,
    pub origin_status: CardStatus,
    pub snapshot: BoardSnapshot,
}

/// A finished cross-column gesture waiting for the user's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMove {
    pub card_id: CardId,
    pub from: CardStatus,
    pub to: CardStatus,
    pub snapshot: BoardSnapshot,
}

/// A cross-column move the user accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedMove {
    pub card_id: CardId,
    pub from: CardStatus,
    pub to: CardStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
    PendingConfirm(PendingMove),
}

/// Why a hover event did not change the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverIgnored {
    NotDragging,
    OverSelf,
    UnknownCard,
    LockedTarget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoverOutcome {
    Ignored(HoverIgnored),
    /// Active card changed column and now sits at the end of it.
    Moved { from: CardStatus, to: CardStatus },
    /// Active card changed position within its column.
    Reordered,
    /// Target resolved to the card's current slot.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    NoChange,
    /// Same-column reorder, committed without confirmation.
    Reordered,
    AwaitingConfirmation {
        card_id: CardId,
        from: CardStatus,
        to: CardStatus,
    },
    /// The active card vanished mid-gesture; nothing to roll back to.
    Abandoned,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DragError {
    #[error("a move is waiting for confirmation")]
    ConfirmationPending,
    #[error("a drag gesture is already in progress")]
    AlreadyDragging,
    #[error("card not found: {0}")]
    CardNotFound(CardId),
    #[error("no move is waiting for confirmation")]
    NothingPending,
}

/// Explicit state machine for one board's drag gestures.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
    policy: TransitionPolicy,
}

impl DragController {
    pub fn new(policy: TransitionPolicy) -> Self {
        Self {
            state: DragState::Idle,
            policy,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn policy(&self) -> &TransitionPolicy {
        &self.policy
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, DragState::Idle)
    }

    /// False while a confirmation is outstanding; the UI disables dragging.
    pub fn accepts_gestures(&self) -> bool {
        !matches!(self.state, DragState::PendingConfirm(_))
    }

    pub fn active_card(&self) -> Option<&str> {
        match &self.state {
            DragState::Dragging(session) => Some(session.card_id.as_str()),
            _ => None,
        }
    }

    pub fn pending(&self) -> Option<&PendingMove> {
        match &self.state {
            DragState::PendingConfirm(pending) => Some(pending),
            _ => None,
        }
    }

    /// Idle -> Dragging. Captures origin status and a full board snapshot.
    pub fn begin<S: BoardSurface + ?Sized>(
        &mut self,
        board: &S,
        card_id: &str,
    ) -> Result<(), DragError> {
        match self.state {
            DragState::Idle => {}
            DragState::Dragging(_) => return Err(DragError::AlreadyDragging),
            DragState::PendingConfirm(_) => return Err(DragError::ConfirmationPending),
        }

        let card = board
            .card(card_id)
            .ok_or_else(|| DragError::CardNotFound(card_id.to_string()))?;
        debug!(
            "event=drag_start module=board status=ok card_id={} origin={}",
            card.id,
            card.status.as_str()
        );
        self.state = DragState::Dragging(DragSession {
            card_id: card.id,
            origin_status: card.status,
            snapshot: board.snapshot(),
        });
        Ok(())
    }

    /// Applies one drag-over event optimistically.
    pub fn hover<S: BoardSurface + ?Sized>(
        &mut self,
        board: &mut S,
        target: &DropTarget,
    ) -> HoverOutcome {
        let DragState::Dragging(session) = &self.state else {
            return HoverOutcome::Ignored(HoverIgnored::NotDragging);
        };
        let active_id = session.card_id.as_str();

        let target_status = match target {
            DropTarget::Card(over_id) if over_id == active_id => {
                return HoverOutcome::Ignored(HoverIgnored::OverSelf);
            }
            DropTarget::Card(over_id) => match board.card(over_id) {
                Some(over) => over.status,
                None => return HoverOutcome::Ignored(HoverIgnored::UnknownCard),
            },
            DropTarget::Column(status) => *status,
        };

        if !self.policy.admits_target(target_status) {
            return HoverOutcome::Ignored(HoverIgnored::LockedTarget);
        }

        let Some(active) = board.card(active_id) else {
            return HoverOutcome::Ignored(HoverIgnored::UnknownCard);
        };

        if active.status != target_status {
            if !board.move_card(active_id, target_status, usize::MAX) {
                return HoverOutcome::Ignored(HoverIgnored::UnknownCard);
            }
            return HoverOutcome::Moved {
                from: active.status,
                to: target_status,
            };
        }

        if let DropTarget::Card(over_id) = target {
            if board.reorder(active_id, over_id) {
                return HoverOutcome::Reordered;
            }
        }
        HoverOutcome::Unchanged
    }

    /// Ends the gesture (drop or pointer cancel).
    ///
    /// Dragging -> PendingConfirm when the card left its origin column,
    /// Dragging -> Idle otherwise.
    pub fn end<S: BoardSurface + ?Sized>(&mut self, board: &S) -> DragOutcome {
        let session = match std::mem::take(&mut self.state) {
            DragState::Dragging(session) => session,
            other => {
                self.state = other;
                return DragOutcome::NoChange;
            }
        };

        let Some(card) = board.card(&session.card_id) else {
            warn!(
                "event=drag_end module=board status=error card_id={} reason=card_missing",
                session.card_id
            );
            return DragOutcome::Abandoned;
        };

        if self
            .policy
            .requires_confirmation(session.origin_status, card.status)
        {
            let outcome = DragOutcome::AwaitingConfirmation {
                card_id: session.card_id.clone(),
                from: session.origin_status,
                to: card.status,
            };
            self.state = DragState::PendingConfirm(PendingMove {
                card_id: session.card_id,
                from: session.origin_status,
                to: card.status,
                snapshot: session.snapshot,
            });
            return outcome;
        }

        if board.snapshot() == session.snapshot {
            DragOutcome::NoChange
        } else {
            DragOutcome::Reordered
        }
    }

    /// PendingConfirm -> Idle, keeping the optimistic board.
    pub fn confirm(&mut self) -> Result<ConfirmedMove, DragError> {
        match std::mem::take(&mut self.state) {
            DragState::PendingConfirm(pending) => {
                info!(
                    "event=move_confirm module=board status=ok card_id={} from={} to={}",
                    pending.card_id,
                    pending.from.as_str(),
                    pending.to.as_str()
                );
                Ok(ConfirmedMove {
                    card_id: pending.card_id,
                    from: pending.from,
                    to: pending.to,
                })
            }
            other => {
                self.state = other;
                Err(DragError::NothingPending)
            }
        }
    }

    /// PendingConfirm -> Idle, restoring the gesture-start snapshot.
    pub fn cancel<S: BoardSurface + ?Sized>(&mut self, board: &mut S) -> Result<(), DragError> {
        match std::mem::take(&mut self.state) {
            DragState::PendingConfirm(pending) => {
                info!(
                    "event=move_cancel module=board status=ok card_id={} restored={}",
                    pending.card_id,
                    pending.snapshot.len()
                );
                board.restore(pending.snapshot);
                Ok(())
            }
            other => {
                self.state = other;
                Err(DragError::NothingPending)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DragController, DragError, DragOutcome, DragState, DropTarget, HoverIgnored,
        HoverOutcome,
    };
    use crate::board::collection::{BoardSnapshot, CardCollection};
    use crate::board::BoardSurface;
    use crate::model::card::{Card, CardStatus, CardType};

    fn two_proposed() -> CardCollection {
        CardCollection::try_from_cards(vec![
            Card::new("k1", "Advanced RAG", CardType::Link, CardStatus::Proposed),
            Card::new("k2", "Vector DBs", CardType::Forum, CardStatus::Proposed),
        ])
        .unwrap()
    }

    /// Surface whose cards can be read but never moved.
    struct FrozenBoard(CardCollection);

    impl BoardSurface for FrozenBoard {
        fn card(&self, id: &str) -> Option<Card> {
            self.0.card(id)
        }

        fn move_card(&mut self, _id: &str, _status: CardStatus, _target_rank: usize) -> bool {
            false
        }

        fn reorder(&mut self, active_id: &str, over_id: &str) -> bool {
            self.0.reorder(active_id, over_id)
        }

        fn snapshot(&self) -> BoardSnapshot {
            self.0.snapshot()
        }

        fn restore(&mut self, snapshot: BoardSnapshot) {
            self.0.restore(snapshot)
        }
    }

    #[test]
    fn hover_reports_unknown_card_when_move_is_refused() {
        let mut board = FrozenBoard(two_proposed());
        let mut controller = DragController::default();
        controller.begin(&board, "k1").unwrap();

        let outcome = controller.hover(&mut board, &DropTarget::Column(CardStatus::Selected));

        assert_eq!(outcome, HoverOutcome::Ignored(HoverIgnored::UnknownCard));
        assert_eq!(board.0.card("k1").unwrap().status, CardStatus::Proposed);
        assert_eq!(controller.end(&board), DragOutcome::NoChange);
    }

    #[test]
    fn begin_rejects_unknown_card() {
        let board = two_proposed();
        let mut controller = DragController::default();
        let err = controller.begin(&board, "nope").unwrap_err();
        assert_eq!(err, DragError::CardNotFound("nope".to_string()));
        assert!(controller.is_idle());
    }

    #[test]
    fn begin_twice_is_rejected() {
        let board = two_proposed();
        let mut controller = DragController::default();
        controller.begin(&board, "k1").unwrap();
        assert_eq!(
            controller.begin(&board, "k2").unwrap_err(),
            DragError::AlreadyDragging
        );
        assert_eq!(controller.active_card(), Some("k1"));
    }

    #[test]
    fn hover_without_gesture_is_ignored() {
        let mut board = two_proposed();
        let mut controller = DragController::default();
        let outcome = controller.hover(&mut board, &DropTarget::Column(CardStatus::Selected));
        assert_eq!(outcome, HoverOutcome::Ignored(HoverIgnored::NotDragging));
    }

    #[test]
    fn hover_over_self_and_release_is_a_no_op() {
        let mut board = two_proposed();
        let before = board.clone();
        let mut controller = DragController::default();
        controller.begin(&board, "k1").unwrap();

        let outcome = controller.hover(&mut board, &DropTarget::Card("k1".to_string()));
        assert_eq!(outcome, HoverOutcome::Ignored(HoverIgnored::OverSelf));
        assert_eq!(controller.end(&board), DragOutcome::NoChange);
        assert_eq!(board, before);
        assert!(controller.is_idle());
    }

    #[test]
    fn hover_resolves_status_from_hovered_card() {
        let mut board = CardCollection::try_from_cards(vec![
            Card::new("k1", "a", CardType::Link, CardStatus::Proposed),
            Card::new("k7", "b", CardType::Link, CardStatus::Selected),
        ])
        .unwrap();
        let mut controller = DragController::default();
        controller.begin(&board, "k1").unwrap();

        let outcome = controller.hover(&mut board, &DropTarget::Card("k7".to_string()));
        assert_eq!(
            outcome,
            HoverOutcome::Moved {
                from: CardStatus::Proposed,
                to: CardStatus::Selected
            }
        );
        assert_eq!(board.get("k1").unwrap().status, CardStatus::Selected);
    }

    #[test]
    fn second_gesture_blocked_while_confirmation_pending() {
        let mut board = two_proposed();
        let mut controller = DragController::default();
        controller.begin(&board, "k1").unwrap();
        controller.hover(&mut board, &DropTarget::Column(CardStatus::InDraft));
        assert!(matches!(
            controller.end(&board),
            DragOutcome::AwaitingConfirmation { .. }
        ));

        assert!(!controller.accepts_gestures());
        assert_eq!(
            controller.begin(&board, "k2").unwrap_err(),
            DragError::ConfirmationPending
        );
        assert!(matches!(controller.state(), DragState::PendingConfirm(_)));
    }

    #[test]
    fn confirm_and_cancel_require_a_pending_move() {
        let mut board = two_proposed();
        let mut controller = DragController::default();
        assert_eq!(controller.confirm().unwrap_err(), DragError::NothingPending);
        assert_eq!(
            controller.cancel(&mut board).unwrap_err(),
            DragError::NothingPending
        );

        controller.begin(&board, "k1").unwrap();
        assert_eq!(controller.confirm().unwrap_err(), DragError::NothingPending);
        assert_eq!(controller.active_card(), Some("k1"));
    }

    #[test]
    fn card_removed_mid_drag_abandons_without_rollback() {
        let mut board = two_proposed();
        let mut controller = DragController::default();
        controller.begin(&board, "k1").unwrap();
        board.remove("k1");

        assert_eq!(controller.end(&board), DragOutcome::Abandoned);
        assert!(controller.is_idle());
        assert_eq!(board.len(), 1);
    }
}
