//! Card domain model.
//!
//! # Responsibility
//! - Define the canonical editorial work item tracked on the board.
//! - Define the closed workflow stage and content type sets.
//! - Define the partial patch shape used for remote updates.
//!
//! # Invariants
//! - `id` is stable, unique within a board and never empty.
//! - `status` is always one of the four workflow stages.
//! - Board machinery never mutates a card in place; status changes produce a
//!   replacement value via [`Card::with_status`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stable identifier assigned by the card backend (`k1`, `gen-...`).
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type CardId = String;

/// Angles offered when a card carries no research guidance of its own.
pub const DEFAULT_ANGLES: [&str; 5] = [
    "Contrarian",
    "Educational",
    "Personal Story",
    "Case Study",
    "Trend Analysis",
];

/// Content source category of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Link,
    Forum,
    Article,
}

/// Workflow stage of a card, in board order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CardStatus {
    /// Freshly generated idea waiting in the pool.
    Proposed,
    /// Picked by an editor for research.
    Selected,
    /// Approved and being written.
    InDraft,
    /// Terminal stage; placed by the publishing flow, never by dragging.
    Scheduled,
}

impl CardStatus {
    /// All stages in workflow order.
    pub const ALL: [CardStatus; 4] = [
        CardStatus::Proposed,
        CardStatus::Selected,
        CardStatus::InDraft,
        CardStatus::Scheduled,
    ];

    /// Wire label, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Proposed => "proposed",
            Self::Selected => "selected",
            Self::InDraft => "inDraft",
            Self::Scheduled => "scheduled",
        }
    }

    /// Parses a wire label. Case-sensitive, like the JSON contract.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
    }

    /// Human-readable column heading.
    pub fn column_title(self) -> &'static str {
        match self {
            Self::Proposed => "Proposed Pool",
            Self::Selected => "Selected",
            Self::InDraft => "In Draft",
            Self::Scheduled => "Scheduled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Scheduled)
    }
}

/// Progress of the background research job attached to a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResearchStatus {
    Queued,
    Researching,
    Complete,
}

/// Validation failures for card values received from outside the core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CardValidationError {
    #[error("card id must not be empty")]
    EmptyId,
    #[error("card `{0}` appears more than once")]
    DuplicateId(CardId),
}

/// Canonical board record.
///
/// Research metadata is optional and omitted from the wire form when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub title: String,
    /// Serialized as `type` to match the backend schema.
    #[serde(rename = "type")]
    pub kind: CardType,
    pub status: CardStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research_status: Option<ResearchStatus>,
    /// Angle chosen by the editor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<String>,
    /// Guidance text keyed by angle name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle_guidance: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_points: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl Card {
    /// Creates a card without research metadata.
    pub fn new(
        id: impl Into<CardId>,
        title: impl Into<String>,
        kind: CardType,
        status: CardStatus,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            status,
            research_status: None,
            angle: None,
            angle_guidance: None,
            read_time: None,
            description: None,
            data_points: None,
            tags: None,
            audience: None,
            source_url: None,
        }
    }

    /// Returns a copy of this card at another stage.
    pub fn with_status(&self, status: CardStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<(), CardValidationError> {
        if self.id.trim().is_empty() {
            return Err(CardValidationError::EmptyId);
        }
        Ok(())
    }

    pub fn is_research_complete(&self) -> bool {
        self.research_status == Some(ResearchStatus::Complete)
    }

    /// Angles an editor may pick for this card.
    ///
    /// Falls back to [`DEFAULT_ANGLES`] when research produced no guidance.
    pub fn available_angles(&self) -> Vec<String> {
        match &self.angle_guidance {
            Some(guidance) if !guidance.is_empty() => guidance.keys().cloned().collect(),
            _ => DEFAULT_ANGLES.iter().map(|angle| angle.to_string()).collect(),
        }
    }

    pub fn guidance_for(&self, angle: &str) -> Option<&str> {
        self.angle_guidance
            .as_ref()
            .and_then(|guidance| guidance.get(angle))
            .map(String::as_str)
    }
}

/// Partial update sent with `PATCH /cards/{id}`.
///
/// Only `Some` fields are serialized; the backend merges them into its copy
/// and answers with the full card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<CardType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CardStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research_status: Option<ResearchStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle_guidance: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_points: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl CardPatch {
    /// Status-only patch, as sent by approvals and confirmed moves.
    pub fn status(status: CardStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_angle(mut self, angle: impl Into<String>) -> Self {
        self.angle = Some(angle.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merges this patch over `card`, returning the merged value.
    ///
    /// Mirrors the backend's shallow merge; used by the in-memory backend.
    pub fn apply_to(&self, card: &Card) -> Card {
        let mut merged = card.clone();
        if let Some(title) = &self.title {
            merged.title = title.clone();
        }
        if let Some(kind) = self.kind {
            merged.kind = kind;
        }
        if let Some(status) = self.status {
            merged.status = status;
        }
        if let Some(research_status) = self.research_status {
            merged.research_status = Some(research_status);
        }
        if let Some(angle) = &self.angle {
            merged.angle = Some(angle.clone());
        }
        if let Some(guidance) = &self.angle_guidance {
            merged.angle_guidance = Some(guidance.clone());
        }
        if let Some(read_time) = &self.read_time {
            merged.read_time = Some(read_time.clone());
        }
        if let Some(description) = &self.description {
            merged.description = Some(description.clone());
        }
        if let Some(data_points) = &self.data_points {
            merged.data_points = Some(data_points.clone());
        }
        if let Some(tags) = &self.tags {
            merged.tags = Some(tags.clone());
        }
        if let Some(audience) = &self.audience {
            merged.audience = Some(audience.clone());
        }
        if let Some(source_url) = &self.source_url {
            merged.source_url = Some(source_url.clone());
        }
        merged
    }
}
