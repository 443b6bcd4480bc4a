//! In-process card backend.
//!
//! Behaves like the studio's mock API routes: shallow merge on PATCH, 404 for
//! unknown ids, and a generator that returns two `proposed` cards. With the
//! `test-util` feature, failure injection lets callers exercise the store's
//! silent-failure paths.

use crate::model::card::{Card, CardPatch, CardStatus, CardType, ResearchStatus};
use crate::remote::{CardBackend, RemoteError, RemoteResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

#[derive(Debug, Default)]
struct MemoryState {
    cards: Vec<Card>,
    generated_batches: u32,
    #[cfg(any(test, feature = "test-util"))]
    faults: Faults,
}

#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Default)]
struct Faults {
    unavailable: bool,
    fail_next: usize,
    calls: u32,
}

#[cfg(any(test, feature = "test-util"))]
impl Faults {
    fn check(&mut self, operation: &str) -> RemoteResult<()> {
        self.calls += 1;
        if self.unavailable {
            return Err(RemoteError::Unavailable(format!("{operation}: backend offline")));
        }
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(RemoteError::Status {
                status: 500,
                body: format!("{operation}: injected failure"),
            });
        }
        Ok(())
    }
}

/// Thread-safe in-memory implementation of [`CardBackend`].
#[derive(Debug, Default)]
pub struct MemoryCardBackend {
    state: Mutex<MemoryState>,
}

impl MemoryCardBackend {
    pub fn new(cards: Vec<Card>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                cards,
                ..MemoryState::default()
            }),
        }
    }

    /// Backend preloaded with the demo board (`k1`..`k12`).
    pub fn with_seed_cards() -> Self {
        Self::new(seed_cards())
    }

    /// Current backend-side cards, in order.
    pub fn cards(&self) -> Vec<Card> {
        self.lock().cards.clone()
    }

    /// Makes every call fail until switched back.
    #[cfg(any(test, feature = "test-util"))]
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().faults.unavailable = unavailable;
    }

    /// Makes the next `count` calls fail.
    #[cfg(any(test, feature = "test-util"))]
    pub fn fail_next(&self, count: usize) {
        self.lock().faults.fail_next = count;
    }

    /// Number of calls received, failed ones included.
    #[cfg(any(test, feature = "test-util"))]
    pub fn call_count(&self) -> u32 {
        self.lock().faults.calls
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg_attr(not(any(test, feature = "test-util")), allow(unused_variables, unused_mut))]
    fn begin_call(&self, operation: &str) -> RemoteResult<MutexGuard<'_, MemoryState>> {
        let mut state = self.lock();
        #[cfg(any(test, feature = "test-util"))]
        state.faults.check(operation)?;
        Ok(state)
    }
}

#[async_trait]
impl CardBackend for MemoryCardBackend {
    async fn list_cards(&self) -> RemoteResult<Vec<Card>> {
        let state = self.begin_call("list_cards")?;
        Ok(state.cards.clone())
    }

    async fn generate_cards(&self) -> RemoteResult<Vec<Card>> {
        let mut state = self.begin_call("generate_cards")?;
        state.generated_batches += 1;
        let batch = state.generated_batches;
        let cards = vec![
            Card::new(
                generated_id(),
                format!("New AI Insight {batch}"),
                CardType::Link,
                CardStatus::Proposed,
            ),
            Card::new(
                generated_id(),
                "Community Discussion Topic",
                CardType::Forum,
                CardStatus::Proposed,
            ),
        ];
        state.cards.extend(cards.iter().cloned());
        Ok(cards)
    }

    async fn patch_card(&self, id: &str, patch: &CardPatch) -> RemoteResult<Card> {
        let mut state = self.begin_call("patch_card")?;
        let index = state
            .cards
            .iter()
            .position(|card| card.id == id)
            .ok_or_else(|| RemoteError::NotFound(id.to_string()))?;
        let merged = patch.apply_to(&state.cards[index]);
        state.cards[index] = merged.clone();
        Ok(merged)
    }

    async fn delete_card(&self, id: &str) -> RemoteResult<()> {
        let mut state = self.begin_call("delete_card")?;
        let before = state.cards.len();
        state.cards.retain(|card| card.id != id);
        if state.cards.len() == before {
            return Err(RemoteError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

fn generated_id() -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("gen-{}", &raw[..9])
}

/// Demo board matching the studio's mock data.
pub fn seed_cards() -> Vec<Card> {
    let mut cards = vec![
        Card::new("k1", "Advanced RAG Techniques", CardType::Link, CardStatus::Proposed),
        Card::new("k2", "Intro to Vector Databases", CardType::Forum, CardStatus::Proposed),
        Card::new("k3", "Evaluating LLM Responses", CardType::Article, CardStatus::Proposed),
        Card::new("k4", "The Role of Context Windows", CardType::Link, CardStatus::Proposed),
        Card::new("k5", "Fine-Tuning vs. RAG", CardType::Article, CardStatus::Proposed),
        Card::new("k6", "Production-Ready RAG Systems", CardType::Forum, CardStatus::Proposed),
        Card::new("k7", "Chunking Strategies for RAG", CardType::Link, CardStatus::Selected),
        Card::new("k8", "Re-ranking Models Explained", CardType::Article, CardStatus::Selected),
        Card::new("k9", "Hybrid Search Methods", CardType::Forum, CardStatus::InDraft),
        Card::new("k10", "Core RAG Architecture", CardType::Article, CardStatus::Scheduled),
        Card::new("k11", "Understanding Embeddings", CardType::Article, CardStatus::Scheduled),
        Card::new("k12", "Why RAG is the Future", CardType::Article, CardStatus::Scheduled),
    ];

    let mut guidance = BTreeMap::new();
    guidance.insert(
        "Contrarian".to_string(),
        "Stop obsessing over vector search. Start focusing on intelligent document chunking and re-ranking models.".to_string(),
    );
    guidance.insert(
        "Educational".to_string(),
        "A step-by-step guide to chunking strategies that go beyond fixed-size splitting.".to_string(),
    );
    guidance.insert(
        "Case Study".to_string(),
        "How semantic chunking improved retrieval accuracy in a production RAG system.".to_string(),
    );

    let researched = &mut cards[6];
    researched.research_status = Some(ResearchStatus::Complete);
    researched.angle = Some("Contrarian".to_string());
    researched.angle_guidance = Some(guidance);
    researched.read_time = Some("Est. 5 min read".to_string());
    researched.description = Some(
        "Actionable insights for teams already running RAG, focused on scaling pitfalls."
            .to_string(),
    );
    researched.data_points = Some(vec![
        "Re-ranking improved retrieval accuracy by 40% over plain vector similarity.".to_string(),
        "Hybrid search outperformed pure vector search by 25% on multi-faceted queries."
            .to_string(),
    ]);
    researched.tags = Some(vec![
        "RAG".to_string(),
        "Vector Search".to_string(),
        "LLM".to_string(),
    ]);
    researched.audience = Some("Senior Data Scientists".to_string());
    researched.source_url = Some("https://example.com/rag-chunking".to_string());

    cards[7].research_status = Some(ResearchStatus::Researching);
    cards
}

#[cfg(test)]
mod tests {
    use super::MemoryCardBackend;
    use crate::model::card::CardPatch;
    use crate::remote::{CardBackend, RemoteError};

    #[tokio::test]
    async fn injected_failures_are_consumed_in_order() {
        let backend = MemoryCardBackend::with_seed_cards();
        backend.fail_next(1);

        let first = backend.patch_card("k1", &CardPatch::default().with_title("x")).await;
        assert!(matches!(first, Err(RemoteError::Status { status: 500, .. })));
        assert_eq!(backend.cards()[0].title, "Advanced RAG Techniques");

        let second = backend.patch_card("k1", &CardPatch::default().with_title("x")).await;
        assert_eq!(second.unwrap().title, "x");
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn unavailable_backend_rejects_until_restored() {
        let backend = MemoryCardBackend::with_seed_cards();
        backend.set_unavailable(true);
        assert!(matches!(
            backend.delete_card("k2").await,
            Err(RemoteError::Unavailable(_))
        ));
        assert_eq!(backend.cards().len(), 12);

        backend.set_unavailable(false);
        backend.delete_card("k2").await.unwrap();
        assert_eq!(backend.cards().len(), 11);
    }
}
