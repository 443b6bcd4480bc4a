//! Column transition policy.
//!
//! # Invariants
//! - A locked column is never a drop target, whatever the origin.
//! - Only status-changing moves need explicit confirmation.

use crate::model::card::CardStatus;

/// Decides which drop targets are legal and which moves need confirming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPolicy {
    locked_targets: Vec<CardStatus>,
}

impl Default for TransitionPolicy {
    fn default() -> Self {
        Self {
            locked_targets: CardStatus::ALL
                .into_iter()
                .filter(|status| status.is_terminal())
                .collect(),
        }
    }
}

impl TransitionPolicy {
    /// Policy with an explicit set of columns that refuse drops.
    pub fn with_locked_targets(locked_targets: impl IntoIterator<Item = CardStatus>) -> Self {
        let mut locked: Vec<CardStatus> = locked_targets.into_iter().collect();
        locked.sort();
        locked.dedup();
        Self {
            locked_targets: locked,
        }
    }

    pub fn locked_targets(&self) -> &[CardStatus] {
        &self.locked_targets
    }

    pub fn admits_target(&self, target: CardStatus) -> bool {
        !self.locked_targets.contains(&target)
    }

    pub fn requires_confirmation(&self, origin: CardStatus, current: CardStatus) -> bool {
        origin != current
    }
}

/// One board column as presented to the UI shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardColumn {
    pub status: CardStatus,
    pub title: &'static str,
    pub accepts_drops: bool,
}

/// The four columns in workflow order.
pub fn board_columns(policy: &TransitionPolicy) -> Vec<BoardColumn> {
    CardStatus::ALL
        .into_iter()
        .map(|status| BoardColumn {
            status,
            title: status.column_title(),
            accepts_drops: policy.admits_target(status),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{board_columns, TransitionPolicy};
    use crate::model::card::CardStatus;

    #[test]
    fn default_policy_locks_only_scheduled() {
        let policy = TransitionPolicy::default();
        assert_eq!(policy.locked_targets(), &[CardStatus::Scheduled]);
        assert!(!policy.admits_target(CardStatus::Scheduled));
        assert!(policy.admits_target(CardStatus::Proposed));
        assert!(policy.admits_target(CardStatus::InDraft));
    }

    #[test]
    fn confirmation_needed_only_across_columns() {
        let policy = TransitionPolicy::default();
        assert!(!policy.requires_confirmation(CardStatus::Selected, CardStatus::Selected));
        assert!(policy.requires_confirmation(CardStatus::Proposed, CardStatus::Selected));
    }

    #[test]
    fn columns_follow_workflow_order() {
        let columns = board_columns(&TransitionPolicy::default());
        let titles: Vec<_> = columns.iter().map(|column| column.title).collect();
        assert_eq!(
            titles,
            vec!["Proposed Pool", "Selected", "In Draft", "Scheduled"]
        );
        assert!(!columns[3].accepts_drops);
    }
}
