//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the board's use cases to Dart via FRB as flat functions.
//! - Own the process-global board (card store + drag controller).
//! - Flatten core errors into simple response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - No lock is held across an `.await`.
//! - Drag calls are sync and offline; only `drag_confirm` talks to the backend.
//! - No gesture starts while a confirmed move is being saved.

use log::{info, warn};
use newsroom_core::{
    board_columns as board_columns_inner, core_version as core_version_inner,
    init_logging as init_logging_inner, ping as ping_inner, BackendConfig, Card, CardId,
    CardPatch, CardStatus, CardStore, CardType, DragController, DragOutcome, DragState, DropTarget,
    HoverOutcome, HttpCardBackend, ResearchStatus,
};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

const NOT_CONNECTED: &str = "board is not connected; call board_connect first";

static BOARD: OnceLock<BoardSlot> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl BoardActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Flattened card for list and detail rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub id: String,
    pub title: String,
    /// `link|forum|article`.
    pub kind: String,
    /// Wire status tag (`proposed|selected|inDraft|scheduled`).
    pub status: String,
    /// `queued|researching|complete`, when research was requested.
    pub research_status: Option<String>,
    pub angle: Option<String>,
    /// Angles the editor may pick; falls back to the default set.
    pub available_angles: Vec<String>,
    pub read_time: Option<String>,
    pub description: Option<String>,
    pub data_points: Vec<String>,
    pub tags: Vec<String>,
    pub audience: Option<String>,
    pub source_url: Option<String>,
}

/// One board column with its members in rank order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnView {
    pub status: String,
    pub title: String,
    /// False for columns that refuse drops; the shell dims them while dragging.
    pub accepts_drops: bool,
    pub card_ids: Vec<String>,
}

/// Drag controller state after a gesture call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragResponse {
    pub ok: bool,
    pub message: String,
    /// `idle|dragging|pending_confirm|saving`.
    pub phase: String,
    /// Set while a cross-column move waits for the user's answer or is saving.
    pub pending_card_id: Option<String>,
    pub pending_from: Option<String>,
    pub pending_to: Option<String>,
}

/// Connects the global board to the card backend at `base_url`.
///
/// Replaces any previous connection; cards load on the next `board_fetch`.
/// `auth_token` is sent as a bearer token when present.
#[flutter_rust_bridge::frb(sync)]
pub fn board_connect(
    base_url: String,
    timeout_ms: Option<u64>,
    auth_token: Option<String>,
) -> BoardActionResponse {
    let mut config = BackendConfig::new(base_url.trim());
    if let Some(timeout_ms) = timeout_ms {
        config.request_timeout_ms = timeout_ms;
    }
    config.auth_token = auth_token;
    board().connect(config)
}

/// Connects using a TOML backend config file at `path`.
///
/// Unknown keys and invalid values are rejected before any connection is made.
#[flutter_rust_bridge::frb(sync)]
pub fn board_connect_from_config(path: String) -> BoardActionResponse {
    board().connect_from_config(path.trim())
}

/// All cards in board order.
#[flutter_rust_bridge::frb(sync)]
pub fn board_cards() -> Vec<CardView> {
    board().cards()
}

/// The four columns in workflow order.
#[flutter_rust_bridge::frb(sync)]
pub fn board_columns() -> Vec<ColumnView> {
    board().columns()
}

/// True while a fetch or generate call is in flight.
#[flutter_rust_bridge::frb(sync)]
pub fn board_is_loading() -> bool {
    board().is_loading()
}

/// Reloads the board from the backend.
///
/// # FFI contract
/// - Async call, network-backed.
/// - On failure the last known board stays in place.
pub async fn board_fetch() -> BoardActionResponse {
    board().fetch().await
}

/// Asks the generator for new `proposed` cards and appends them.
pub async fn board_generate() -> BoardActionResponse {
    board().generate().await
}

/// Moves a card to `inDraft` after the backend accepts it.
pub async fn board_approve(id: String) -> BoardActionResponse {
    board().approve(id.trim()).await
}

/// Deletes a card on the backend, then removes it locally.
pub async fn board_discard(id: String) -> BoardActionResponse {
    board().discard(id.trim()).await
}

/// Saves an edited title and/or angle.
pub async fn board_update_details(
    id: String,
    title: Option<String>,
    angle: Option<String>,
) -> BoardActionResponse {
    board().update_details(id.trim(), title, angle).await
}

/// Starts dragging `id`.
#[flutter_rust_bridge::frb(sync)]
pub fn drag_start(id: String) -> DragResponse {
    board().drag_start(id.trim())
}

/// Pointer moved over another card.
#[flutter_rust_bridge::frb(sync)]
pub fn drag_over_card(id: String) -> DragResponse {
    board().drag_over(DropTarget::Card(id.trim().to_string()))
}

/// Pointer moved over a column body; `status` is the wire status tag.
#[flutter_rust_bridge::frb(sync)]
pub fn drag_over_column(status: String) -> DragResponse {
    match CardStatus::parse(status.trim()) {
        Some(status) => board().drag_over(DropTarget::Column(status)),
        None => board().drag_failure(format!("unknown column status `{status}`")),
    }
}

/// Drop or pointer cancel.
#[flutter_rust_bridge::frb(sync)]
pub fn drag_end() -> DragResponse {
    board().drag_end()
}

/// Accepts the pending cross-column move and saves it.
///
/// # FFI contract
/// - Async call, network-backed.
/// - The confirmed move stays on the board even when the save fails; the
///   failure is reported and the next `board_fetch` reconciles.
/// - `drag_start` is refused until the save resolves.
pub async fn drag_confirm() -> DragResponse {
    board().drag_confirm().await
}

/// Declines the pending move and restores the gesture-start board.
#[flutter_rust_bridge::frb(sync)]
pub fn drag_cancel() -> DragResponse {
    board().drag_cancel()
}

fn board() -> &'static BoardSlot {
    BOARD.get_or_init(BoardSlot::default)
}

struct ConnectedBoard {
    store: CardStore<HttpCardBackend>,
    drag: DragController,
    /// Card whose confirmed move is being saved.
    saving: Option<CardId>,
}

#[derive(Default)]
struct BoardSlot {
    inner: Mutex<Option<ConnectedBoard>>,
}

/// Clears the saving gate when the save resolves or its future is dropped.
struct SavingGuard<'a> {
    slot: &'a BoardSlot,
}

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        if let Some(board) = self.slot.lock().as_mut() {
            board.saving = None;
        }
    }
}

impl BoardSlot {
    fn lock(&self) -> MutexGuard<'_, Option<ConnectedBoard>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn store(&self) -> Option<CardStore<HttpCardBackend>> {
        self.lock().as_ref().map(|board| board.store.clone())
    }

    fn connect(&self, config: BackendConfig) -> BoardActionResponse {
        let backend = match HttpCardBackend::new(&config) {
            Ok(backend) => backend,
            Err(err) => {
                warn!("event=board_connect module=ffi status=error error={err}");
                return BoardActionResponse::failure(format!("board_connect failed: {err}"));
            }
        };

        *self.lock() = Some(ConnectedBoard {
            store: CardStore::new(backend),
            drag: DragController::default(),
            saving: None,
        });
        info!(
            "event=board_connect module=ffi status=ok base_url={} auth={}",
            config.normalized_base_url(),
            config.auth_token.is_some()
        );
        BoardActionResponse::success("Board connected.")
    }

    fn connect_from_config(&self, path: &str) -> BoardActionResponse {
        match BackendConfig::from_path(Path::new(path)) {
            Ok(config) => self.connect(config),
            Err(err) => {
                warn!("event=board_connect module=ffi status=error source=config error={err}");
                BoardActionResponse::failure(format!("board_connect_from_config failed: {err}"))
            }
        }
    }

    fn cards(&self) -> Vec<CardView> {
        self.store()
            .map(|store| store.cards().iter().map(to_card_view).collect())
            .unwrap_or_default()
    }

    fn columns(&self) -> Vec<ColumnView> {
        let guard = self.lock();
        let Some(board) = guard.as_ref() else {
            return Vec::new();
        };
        board_columns_inner(board.drag.policy())
            .into_iter()
            .map(|column| ColumnView {
                status: column.status.as_str().to_string(),
                title: column.title.to_string(),
                accepts_drops: column.accepts_drops,
                card_ids: board
                    .store
                    .column(column.status)
                    .into_iter()
                    .map(|card| card.id)
                    .collect(),
            })
            .collect()
    }

    fn is_loading(&self) -> bool {
        self.store().is_some_and(|store| store.is_loading())
    }

    async fn fetch(&self) -> BoardActionResponse {
        let Some(store) = self.store() else {
            return BoardActionResponse::failure(NOT_CONNECTED);
        };
        match store.fetch().await {
            Ok(count) => BoardActionResponse::success(format!("Loaded {count} card(s).")),
            Err(err) => BoardActionResponse::failure(format!("board_fetch failed: {err}")),
        }
    }

    async fn generate(&self) -> BoardActionResponse {
        let Some(store) = self.store() else {
            return BoardActionResponse::failure(NOT_CONNECTED);
        };
        match store.generate_cycle().await {
            Ok(report) => BoardActionResponse::success(format!(
                "Generated {} card(s).",
                report.appended.len()
            )),
            Err(err) => BoardActionResponse::failure(format!("board_generate failed: {err}")),
        }
    }

    async fn approve(&self, id: &str) -> BoardActionResponse {
        let Some(store) = self.store() else {
            return BoardActionResponse::failure(NOT_CONNECTED);
        };
        match store.approve(id).await {
            Ok(()) => BoardActionResponse::success("Card approved."),
            Err(err) => BoardActionResponse::failure(format!("board_approve failed: {err}")),
        }
    }

    async fn discard(&self, id: &str) -> BoardActionResponse {
        let Some(store) = self.store() else {
            return BoardActionResponse::failure(NOT_CONNECTED);
        };
        match store.discard(id).await {
            Ok(()) => BoardActionResponse::success("Card discarded."),
            Err(err) => BoardActionResponse::failure(format!("board_discard failed: {err}")),
        }
    }

    async fn update_details(
        &self,
        id: &str,
        title: Option<String>,
        angle: Option<String>,
    ) -> BoardActionResponse {
        let Some(store) = self.store() else {
            return BoardActionResponse::failure(NOT_CONNECTED);
        };
        let patch = CardPatch {
            title: title.map(|title| title.trim().to_string()),
            angle,
            ..CardPatch::default()
        };
        if patch.is_empty() {
            return BoardActionResponse::failure("board_update_details failed: nothing to update");
        }
        match store.update_details(id, &patch).await {
            Ok(_) => BoardActionResponse::success("Card updated."),
            Err(err) => {
                BoardActionResponse::failure(format!("board_update_details failed: {err}"))
            }
        }
    }

    fn drag_start(&self, id: &str) -> DragResponse {
        let mut guard = self.lock();
        let Some(board) = guard.as_mut() else {
            return drag_response_idle(false, NOT_CONNECTED);
        };
        if board.saving.is_some() {
            return drag_response(board, false, "drag_start failed: a move is being saved");
        }
        match board.drag.begin(&board.store, id) {
            Ok(()) => drag_response(board, true, "Dragging."),
            Err(err) => drag_response(board, false, format!("drag_start failed: {err}")),
        }
    }

    fn drag_over(&self, target: DropTarget) -> DragResponse {
        let mut guard = self.lock();
        let Some(board) = guard.as_mut() else {
            return drag_response_idle(false, NOT_CONNECTED);
        };
        let message = match board.drag.hover(&mut board.store, &target) {
            HoverOutcome::Ignored(reason) => format!("Ignored ({reason:?})."),
            HoverOutcome::Moved { from, to } => {
                format!("Moved from {} to {}.", from.as_str(), to.as_str())
            }
            HoverOutcome::Reordered => "Reordered.".to_string(),
            HoverOutcome::Unchanged => "Unchanged.".to_string(),
        };
        drag_response(board, true, message)
    }

    fn drag_end(&self) -> DragResponse {
        let mut guard = self.lock();
        let Some(board) = guard.as_mut() else {
            return drag_response_idle(false, NOT_CONNECTED);
        };
        let (ok, message) = match board.drag.end(&board.store) {
            DragOutcome::NoChange => (true, "No change."),
            DragOutcome::Reordered => (true, "Order updated."),
            DragOutcome::AwaitingConfirmation { .. } => (true, "Confirm the move."),
            DragOutcome::Abandoned => (false, "Card disappeared during the drag."),
        };
        drag_response(board, ok, message)
    }

    async fn drag_confirm(&self) -> DragResponse {
        let (store, confirmed) = {
            let mut guard = self.lock();
            let Some(board) = guard.as_mut() else {
                return drag_response_idle(false, NOT_CONNECTED);
            };
            match board.drag.confirm() {
                Ok(confirmed) => {
                    board.saving = Some(confirmed.card_id.clone());
                    (board.store.clone(), confirmed)
                }
                Err(err) => {
                    return drag_response(board, false, format!("drag_confirm failed: {err}"))
                }
            }
        };
        let saving = SavingGuard { slot: self };

        let result = store.persist_move(&confirmed).await;
        drop(saving);
        match result {
            Ok(_) => drag_response_idle(true, "Move saved."),
            Err(err) => {
                warn!(
                    "event=move_persist module=ffi status=warn card_id={} kept_local=true",
                    confirmed.card_id
                );
                drag_response_idle(false, format!("drag_confirm failed: {err}"))
            }
        }
    }

    fn drag_cancel(&self) -> DragResponse {
        let mut guard = self.lock();
        let Some(board) = guard.as_mut() else {
            return drag_response_idle(false, NOT_CONNECTED);
        };
        match board.drag.cancel(&mut board.store) {
            Ok(()) => drag_response(board, true, "Move cancelled."),
            Err(err) => drag_response(board, false, format!("drag_cancel failed: {err}")),
        }
    }

    fn drag_failure(&self, message: String) -> DragResponse {
        match self.lock().as_ref() {
            Some(board) => drag_response(board, false, message),
            None => drag_response_idle(false, message),
        }
    }
}

fn drag_response(board: &ConnectedBoard, ok: bool, message: impl Into<String>) -> DragResponse {
    if let Some(card_id) = &board.saving {
        return DragResponse {
            ok,
            message: message.into(),
            phase: "saving".to_string(),
            pending_card_id: Some(card_id.clone()),
            pending_from: None,
            pending_to: None,
        };
    }
    let (phase, pending) = match board.drag.state() {
        DragState::Idle => ("idle", None),
        DragState::Dragging(_) => ("dragging", None),
        DragState::PendingConfirm(pending) => ("pending_confirm", Some(pending)),
    };
    DragResponse {
        ok,
        message: message.into(),
        phase: phase.to_string(),
        pending_card_id: pending.map(|pending| pending.card_id.clone()),
        pending_from: pending.map(|pending| pending.from.as_str().to_string()),
        pending_to: pending.map(|pending| pending.to.as_str().to_string()),
    }
}

fn drag_response_idle(ok: bool, message: impl Into<String>) -> DragResponse {
    DragResponse {
        ok,
        message: message.into(),
        phase: "idle".to_string(),
        pending_card_id: None,
        pending_from: None,
        pending_to: None,
    }
}

fn to_card_view(card: &Card) -> CardView {
    CardView {
        id: card.id.clone(),
        title: card.title.clone(),
        kind: card_type_label(card.kind).to_string(),
        status: card.status.as_str().to_string(),
        research_status: card
            .research_status
            .map(|status| research_status_label(status).to_string()),
        angle: card.angle.clone(),
        available_angles: card.available_angles(),
        read_time: card.read_time.clone(),
        description: card.description.clone(),
        data_points: card.data_points.clone().unwrap_or_default(),
        tags: card.tags.clone().unwrap_or_default(),
        audience: card.audience.clone(),
        source_url: card.source_url.clone(),
    }
}

fn card_type_label(kind: CardType) -> &'static str {
    match kind {
        CardType::Link => "link",
        CardType::Forum => "forum",
        CardType::Article => "article",
    }
}

fn research_status_label(status: ResearchStatus) -> &'static str {
    match status {
        ResearchStatus::Queued => "queued",
        ResearchStatus::Researching => "researching",
        ResearchStatus::Complete => "complete",
    }
}

#[cfg(test)]
mod tests {
    use super::{core_version, init_logging, ping, BoardSlot, NOT_CONNECTED};
    use newsroom_core::{BackendConfig, CardStatus, DropTarget};
    use serde_json::json;
    use std::io::Write;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[tokio::test]
    async fn calls_before_connect_fail_softly() {
        let slot = BoardSlot::default();

        assert!(slot.cards().is_empty());
        assert!(slot.columns().is_empty());
        assert!(!slot.is_loading());
        let fetched = slot.fetch().await;
        assert!(!fetched.ok);
        assert_eq!(fetched.message, NOT_CONNECTED);
        let drag = slot.drag_start("k1");
        assert!(!drag.ok);
        assert_eq!(drag.phase, "idle");
    }

    #[test]
    fn connect_rejects_invalid_url() {
        let slot = BoardSlot::default();
        let response = slot.connect(BackendConfig::new("ftp://nowhere"));
        assert!(!response.ok);
        assert!(response.message.contains("base_url"));
    }

    async fn two_proposed_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cards"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "k1", "title": "Advanced RAG", "type": "link", "status": "proposed" },
                { "id": "k2", "title": "Vector DBs", "type": "forum", "status": "proposed" }
            ])))
            .mount(&server)
            .await;
        server
    }

    async fn connected_slot(server: &MockServer) -> BoardSlot {
        let slot = BoardSlot::default();
        assert!(slot.connect(BackendConfig::new(server.uri())).ok);
        assert!(slot.fetch().await.ok);
        slot
    }

    #[tokio::test]
    async fn drag_flow_confirms_and_saves_move() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cards"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "k1", "title": "Advanced RAG", "type": "link", "status": "proposed" },
                { "id": "k2", "title": "Vector DBs", "type": "forum", "status": "proposed" },
                { "id": "k10", "title": "Core RAG", "type": "article", "status": "scheduled" }
            ])))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/cards/k1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(
                { "id": "k1", "title": "Advanced RAG", "type": "link", "status": "selected" }
            )))
            .expect(1)
            .mount(&server)
            .await;

        let slot = connected_slot(&server).await;
        assert_eq!(slot.cards().len(), 3);

        assert!(slot.drag_start("k1").ok);
        let over_scheduled = slot.drag_over(DropTarget::Card("k10".to_string()));
        assert!(over_scheduled.message.starts_with("Ignored"));
        slot.drag_over(DropTarget::Column(CardStatus::Selected));
        let ended = slot.drag_end();
        assert_eq!(ended.phase, "pending_confirm");
        assert_eq!(ended.pending_card_id.as_deref(), Some("k1"));
        assert_eq!(ended.pending_to.as_deref(), Some("selected"));
        assert!(!slot.drag_start("k2").ok);

        let confirmed = slot.drag_confirm().await;
        assert!(confirmed.ok, "{}", confirmed.message);
        assert_eq!(confirmed.phase, "idle");

        let columns = slot.columns();
        assert_eq!(columns[1].card_ids, vec!["k1".to_string()]);
        assert!(!columns[3].accepts_drops);
    }

    #[tokio::test]
    async fn failed_save_keeps_confirmed_move_and_reports_error() {
        let server = two_proposed_server().await;
        Mock::given(method("PATCH"))
            .and(path("/cards/k1"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let slot = connected_slot(&server).await;

        slot.drag_start("k1");
        slot.drag_over(DropTarget::Column(CardStatus::InDraft));
        slot.drag_end();
        let confirmed = slot.drag_confirm().await;

        assert!(!confirmed.ok);
        assert!(confirmed.message.contains("500"));
        assert_eq!(confirmed.phase, "idle");
        let cards = slot.cards();
        assert_eq!(cards.len(), 2);
        let k1 = cards.iter().find(|card| card.id == "k1").unwrap();
        assert_eq!(k1.status, "inDraft");
        assert!(slot.drag_start("k2").ok);
    }

    #[tokio::test]
    async fn discard_during_save_stays_applied_and_gestures_wait() {
        let server = two_proposed_server().await;
        Mock::given(method("PATCH"))
            .and(path("/cards/k1"))
            .respond_with(ResponseTemplate::new(500).set_delay(Duration::from_millis(300)))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/cards/k2"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        let slot = connected_slot(&server).await;

        slot.drag_start("k1");
        slot.drag_over(DropTarget::Column(CardStatus::Selected));
        slot.drag_end();

        let (confirmed, (discarded, second_drag)) = tokio::join!(slot.drag_confirm(), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let discarded = slot.discard("k2").await;
            (discarded, slot.drag_start("k1"))
        });

        assert!(!confirmed.ok);
        assert!(discarded.ok, "{}", discarded.message);
        assert!(!second_drag.ok);
        assert_eq!(second_drag.phase, "saving");
        assert_eq!(second_drag.pending_card_id.as_deref(), Some("k1"));

        let ids: Vec<String> = slot.cards().into_iter().map(|card| card.id).collect();
        assert_eq!(ids, vec!["k1".to_string()]);
        assert_eq!(slot.cards()[0].status, "selected");
        assert!(slot.drag_start("k1").ok);
    }

    #[tokio::test]
    async fn cancel_restores_board_without_network() {
        let server = two_proposed_server().await;
        let slot = connected_slot(&server).await;
        let before = slot.cards();

        slot.drag_start("k2");
        slot.drag_over(DropTarget::Column(CardStatus::Selected));
        slot.drag_end();
        let cancelled = slot.drag_cancel();

        assert!(cancelled.ok);
        assert_eq!(cancelled.phase, "idle");
        assert_eq!(slot.cards(), before);
    }

    #[tokio::test]
    async fn connect_from_config_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cards"))
            .and(header("authorization", "Bearer studio-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "base_url = \"{}\"\nrequest_timeout_ms = 2000\nauth_token = \"studio-token\"",
            server.uri()
        )
        .expect("write config");
        let path = file.path().to_str().expect("utf-8 temp path");

        let slot = BoardSlot::default();
        let connected = slot.connect_from_config(path);
        assert!(connected.ok, "{}", connected.message);
        let fetched = slot.fetch().await;
        assert!(fetched.ok, "{}", fetched.message);
    }

    #[test]
    fn connect_from_config_rejects_unknown_keys() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "base_url = \"http://localhost:3000\"\nretries = 3").expect("write config");
        let path = file.path().to_str().expect("utf-8 temp path");

        let slot = BoardSlot::default();
        let response = slot.connect_from_config(path);
        assert!(!response.ok);
        assert!(response.message.contains("board_connect_from_config failed"));
        assert!(slot.cards().is_empty());
    }
}
