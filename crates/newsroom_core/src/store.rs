//! Card store: canonical board state synced with the card backend.
//!
//! # Responsibility
//! - Own the ordered card list and the loading indicator.
//! - Run remote operations and mirror their results locally.
//! - Expose the synchronous move primitive used by drag gestures.
//!
//! # Invariants
//! - Remote operations are attempt-once; failures are logged and returned,
//!   never applied partially. Local state changes only after the backend
//!   confirms.
//! - The state lock is never held across an `.await`; concurrent operations
//!   apply their own mutation when they resolve (last resolved wins).
//! - The methods on this type are the only write surface for board state.

use crate::board::collection::{AppendReport, BoardSnapshot, CardCollection};
use crate::board::session::ConfirmedMove;
use crate::board::BoardSurface;
use crate::model::card::{Card, CardId, CardPatch, CardStatus, CardValidationError};
use crate::remote::{CardBackend, RemoteError};
use log::{error, info, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub type StoreResult<T> = Result<T, StoreError>;

/// Why a store operation left local state unchanged.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("backend returned invalid cards: {0}")]
    InvalidCard(#[from] CardValidationError),
    #[error("backend answered for card `{actual}` instead of `{expected}`")]
    MismatchedCard { expected: CardId, actual: CardId },
}

#[derive(Debug, Default)]
struct StoreState {
    cards: CardCollection,
    loading: usize,
}

/// Shared handle to one board's state. Clones observe the same cards.
pub struct CardStore<B: CardBackend> {
    backend: Arc<B>,
    state: Arc<Mutex<StoreState>>,
}

impl<B: CardBackend> Clone for CardStore<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            state: Arc::clone(&self.state),
        }
    }
}

/// Keeps the loading counter raised for one remote call, even if the call's
/// future is dropped before completion.
struct LoadingGuard<'a> {
    state: &'a Mutex<StoreState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.loading = state.loading.saturating_sub(1);
    }
}

impl<B: CardBackend> CardStore<B> {
    /// Creates an empty store; call [`CardStore::fetch`] to load it.
    pub fn new(backend: B) -> Self {
        Self::with_cards(backend, CardCollection::new())
    }

    pub fn with_cards(backend: B, cards: CardCollection) -> Self {
        Self {
            backend: Arc::new(backend),
            state: Arc::new(Mutex::new(StoreState { cards, loading: 0 })),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Copy of all cards in board order.
    pub fn cards(&self) -> Vec<Card> {
        self.lock().cards.cards().to_vec()
    }

    pub fn card(&self, id: &str) -> Option<Card> {
        self.lock().cards.get(id).cloned()
    }

    /// Members of one column in rank order.
    pub fn column(&self, status: CardStatus) -> Vec<Card> {
        self.lock()
            .cards
            .column(status)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().cards.is_empty()
    }

    /// True while a fetch or generate call is in flight.
    pub fn is_loading(&self) -> bool {
        self.lock().loading > 0
    }

    /// In-memory move; never persisted by itself.
    pub fn move_card(&self, id: &str, status: CardStatus, target_rank: usize) -> bool {
        self.lock().cards.move_card(id, status, target_rank)
    }

    /// Replaces the whole board with the backend's list.
    ///
    /// On failure the last known board stays in place.
    pub async fn fetch(&self) -> StoreResult<usize> {
        let _loading = self.begin_loading();
        let result = match self.backend.list_cards().await {
            Ok(cards) => CardCollection::try_from_cards(cards).map_err(StoreError::from),
            Err(err) => Err(err.into()),
        };

        match result {
            Ok(collection) => {
                let count = collection.len();
                self.lock().cards.replace_all(collection);
                info!("event=cards_fetch module=store status=ok count={count}");
                Ok(count)
            }
            Err(err) => {
                error!("event=cards_fetch module=store status=error error={err}");
                Err(err)
            }
        }
    }

    /// Appends a freshly generated batch at `proposed`.
    pub async fn generate_cycle(&self) -> StoreResult<AppendReport> {
        let _loading = self.begin_loading();
        let incoming = match self.backend.generate_cards().await {
            Ok(cards) => cards,
            Err(err) => {
                error!("event=cards_generate module=store status=error error={err}");
                return Err(err.into());
            }
        };
        if let Some(err) = incoming.iter().find_map(|card| card.validate().err()) {
            error!("event=cards_generate module=store status=error error={err}");
            return Err(err.into());
        }

        let report = self.lock().cards.append_proposed(incoming);
        if !report.skipped.is_empty() {
            warn!(
                "event=cards_generate module=store status=warn skipped_duplicates={:?}",
                report.skipped
            );
        }
        if !report.normalized.is_empty() {
            warn!(
                "event=cards_generate module=store status=warn normalized_to_proposed={:?}",
                report.normalized
            );
        }
        info!(
            "event=cards_generate module=store status=ok appended={}",
            report.appended.len()
        );
        Ok(report)
    }

    /// Persists `inDraft`, then mirrors it locally.
    pub async fn approve(&self, id: &str) -> StoreResult<()> {
        if let Err(err) = self
            .backend
            .patch_card(id, &CardPatch::status(CardStatus::InDraft))
            .await
        {
            error!("event=card_approve module=store status=error card_id={id} error={err}");
            return Err(err.into());
        }

        if !self.lock().cards.set_status(id, CardStatus::InDraft) {
            warn!("event=card_approve module=store status=warn card_id={id} reason=missing_locally");
        }
        info!("event=card_approve module=store status=ok card_id={id}");
        Ok(())
    }

    /// Deletes on the backend, then removes locally.
    pub async fn discard(&self, id: &str) -> StoreResult<()> {
        if let Err(err) = self.backend.delete_card(id).await {
            error!("event=card_discard module=store status=error card_id={id} error={err}");
            return Err(err.into());
        }

        if self.lock().cards.remove(id).is_none() {
            warn!("event=card_discard module=store status=warn card_id={id} reason=missing_locally");
        }
        info!("event=card_discard module=store status=ok card_id={id}");
        Ok(())
    }

    /// Persists a partial patch and adopts the backend's merged card.
    pub async fn update_details(&self, id: &str, patch: &CardPatch) -> StoreResult<Card> {
        let result = match self.backend.patch_card(id, patch).await {
            Ok(card) => check_answer(id, card),
            Err(err) => Err(err.into()),
        };
        let card = match result {
            Ok(card) => card,
            Err(err) => {
                error!("event=card_update module=store status=error card_id={id} error={err}");
                return Err(err);
            }
        };

        if !self.lock().cards.replace_card(card.clone()) {
            warn!("event=card_update module=store status=warn card_id={id} reason=missing_locally");
        }
        info!("event=card_update module=store status=ok card_id={id}");
        Ok(card)
    }

    /// Saves the editor's title and angle, then approves the card.
    ///
    /// Stops at the first failure; an approval never follows a failed save.
    pub async fn review_and_approve(
        &self,
        id: &str,
        title: impl Into<String>,
        angle: Option<String>,
    ) -> StoreResult<()> {
        let mut patch = CardPatch::default().with_title(title);
        patch.angle = angle;
        self.update_details(id, &patch).await?;
        self.approve(id).await
    }

    /// Persists the status of a confirmed cross-column move.
    pub async fn persist_move(&self, confirmed: &ConfirmedMove) -> StoreResult<Card> {
        self.update_details(&confirmed.card_id, &CardPatch::status(confirmed.to))
            .await
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin_loading(&self) -> LoadingGuard<'_> {
        self.lock().loading += 1;
        LoadingGuard { state: &self.state }
    }
}

fn check_answer(expected: &str, card: Card) -> StoreResult<Card> {
    card.validate()?;
    if card.id != expected {
        return Err(StoreError::MismatchedCard {
            expected: expected.to_string(),
            actual: card.id,
        });
    }
    Ok(card)
}

impl<B: CardBackend> BoardSurface for CardStore<B> {
    fn card(&self, id: &str) -> Option<Card> {
        CardStore::card(self, id)
    }

    fn move_card(&mut self, id: &str, status: CardStatus, target_rank: usize) -> bool {
        CardStore::move_card(self, id, status, target_rank)
    }

    fn reorder(&mut self, active_id: &str, over_id: &str) -> bool {
        self.lock().cards.reorder(active_id, over_id)
    }

    fn snapshot(&self) -> BoardSnapshot {
        self.lock().cards.snapshot()
    }

    fn restore(&mut self, snapshot: BoardSnapshot) {
        self.lock().cards.restore(snapshot);
    }
}
