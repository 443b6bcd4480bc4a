use newsroom_core::{
    Card, CardCollection, CardStatus, CardType, DragController, DragOutcome,
    DropTarget, HoverOutcome,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Target {
    Card(usize),
    Column(CardStatus),
}

fn status_strategy() -> impl Strategy<Value = CardStatus> {
    prop_oneof![
        Just(CardStatus::Proposed),
        Just(CardStatus::Selected),
        Just(CardStatus::InDraft),
        Just(CardStatus::Scheduled),
    ]
}

fn target_strategy() -> impl Strategy<Value = Target> {
    prop_oneof![
        (0usize..16).prop_map(Target::Card),
        status_strategy().prop_map(Target::Column),
    ]
}

fn board_from(statuses: &[CardStatus]) -> CardCollection {
    let cards = statuses
        .iter()
        .enumerate()
        .map(|(index, status)| {
            Card::new(format!("c{index}"), format!("Card {index}"), CardType::Article, *status)
        })
        .collect();
    CardCollection::try_from_cards(cards).unwrap()
}

fn resolve(target: &Target, board: &CardCollection) -> DropTarget {
    match target {
        Target::Card(index) => DropTarget::Card(format!("c{}", index % board.len())),
        Target::Column(status) => DropTarget::Column(*status),
    }
}

fn sorted_ids(board: &CardCollection) -> Vec<String> {
    let mut ids: Vec<String> = board.cards().iter().map(|card| card.id.clone()).collect();
    ids.sort();
    ids
}

proptest! {
    #[test]
    fn moves_preserve_cardinality_and_ids(
        statuses in prop::collection::vec(status_strategy(), 1..10),
        moves in prop::collection::vec((0usize..16, status_strategy(), 0usize..12), 0..20),
    ) {
        let mut board = board_from(&statuses);
        let ids_before = sorted_ids(&board);

        for (index, status, rank) in moves {
            let id = format!("c{}", index % board.len());
            prop_assert!(board.move_card(&id, status, rank));
            prop_assert_eq!(board.len(), statuses.len());
        }
        prop_assert_eq!(sorted_ids(&board), ids_before);
    }

    #[test]
    fn cross_column_move_changes_only_the_moved_status(
        statuses in prop::collection::vec(status_strategy(), 1..10),
        index in 0usize..16,
        target in status_strategy(),
        rank in 0usize..12,
    ) {
        let mut board = board_from(&statuses);
        let moved_id = format!("c{}", index % board.len());
        let before = board.clone();

        board.move_card(&moved_id, target, rank);

        for card in board.cards() {
            let original = before.get(&card.id).unwrap();
            if card.id == moved_id {
                prop_assert_eq!(card.status, target);
            } else {
                prop_assert_eq!(card, original);
            }
        }
    }

    #[test]
    fn same_column_reorder_never_changes_statuses(
        statuses in prop::collection::vec(status_strategy(), 2..10),
        pairs in prop::collection::vec((0usize..16, 0usize..16), 0..20),
    ) {
        let mut board = board_from(&statuses);
        let ids_before = sorted_ids(&board);

        for (active, over) in pairs {
            let active_id = format!("c{}", active % board.len());
            let over_id = format!("c{}", over % board.len());
            board.reorder(&active_id, &over_id);
        }

        prop_assert_eq!(sorted_ids(&board), ids_before);
        for (index, status) in statuses.iter().enumerate() {
            prop_assert_eq!(board.get(&format!("c{index}")).unwrap().status, *status);
        }
    }

    #[test]
    fn cancelled_gesture_restores_board_exactly(
        statuses in prop::collection::vec(status_strategy(), 1..10),
        active in 0usize..16,
        hovers in prop::collection::vec(target_strategy(), 0..16),
    ) {
        let mut board = board_from(&statuses);
        let original = board.clone();
        let active_id = format!("c{}", active % board.len());
        let origin_status = board.get(&active_id).unwrap().status;
        let mut controller = DragController::default();

        controller.begin(&board, &active_id).unwrap();
        for hover in &hovers {
            let target = resolve(hover, &board);
            controller.hover(&mut board, &target);
            prop_assert_eq!(board.len(), original.len());
        }

        match controller.end(&board) {
            DragOutcome::AwaitingConfirmation { from, to, .. } => {
                prop_assert_eq!(from, origin_status);
                prop_assert_ne!(from, to);
                prop_assert!(!controller.accepts_gestures());
                controller.cancel(&mut board).unwrap();
                prop_assert_eq!(&board, &original);
            }
            DragOutcome::NoChange | DragOutcome::Reordered => {
                prop_assert_eq!(board.get(&active_id).unwrap().status, origin_status);
                for (index, status) in statuses.iter().enumerate() {
                    prop_assert_eq!(board.get(&format!("c{index}")).unwrap().status, *status);
                }
            }
            DragOutcome::Abandoned => prop_assert!(false, "active card never leaves the board"),
        }
        prop_assert!(controller.is_idle());
    }

    #[test]
    fn hovers_resolving_to_scheduled_never_mutate(
        statuses in prop::collection::vec(status_strategy(), 1..10),
        active in 0usize..16,
        hovers in prop::collection::vec(target_strategy(), 1..16),
    ) {
        let mut board = board_from(&statuses);
        let active_id = format!("c{}", active % board.len());
        let mut controller = DragController::default();
        controller.begin(&board, &active_id).unwrap();

        for hover in &hovers {
            let target = resolve(hover, &board);
            let resolved = match &target {
                DropTarget::Card(id) => board.get(id).map(|card| card.status),
                DropTarget::Column(status) => Some(*status),
            };
            let before = board.snapshot();
            let outcome = controller.hover(&mut board, &target);
            if resolved == Some(CardStatus::Scheduled) {
                prop_assert!(matches!(outcome, HoverOutcome::Ignored(_)));
                prop_assert_eq!(board.snapshot(), before);
            }
        }
    }
}
