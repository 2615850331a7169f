//! Shared application state: store handle, rooms, sessions and config.

pub mod leaderboard;
pub mod phase;
pub mod rooms;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{RwLock, watch};
use uuid::Uuid;

use crate::{
    config::AppConfig, dao::game_store::GameStore, error::ServiceError, questions::QuestionBank,
    state::rooms::RoomHub,
};

pub use self::phase::GamePhase;

/// Cheaply clonable handle to the shared application state.
pub type SharedState = Arc<AppState>;

/// Central application state shared by every request handler and task.
pub struct AppState {
    game_store: RwLock<Option<Arc<dyn GameStore>>>,
    rooms: RoomHub,
    /// Maps each participant to the game they most recently created or joined.
    sessions: DashMap<String, Uuid>,
    degraded: watch::Sender<bool>,
    config: AppConfig,
    questions: QuestionBank,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig, questions: QuestionBank) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        let rooms = RoomHub::new(config.room_capacity);
        Arc::new(Self {
            game_store: RwLock::new(None),
            rooms,
            sessions: DashMap::new(),
            degraded: degraded_tx,
            config,
            questions,
        })
    }

    /// Obtain a handle to the current game store, if one is installed.
    pub async fn game_store(&self) -> Option<Arc<dyn GameStore>> {
        let guard = self.game_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the game store or fail with [`ServiceError::Degraded`].
    pub async fn require_game_store(&self) -> Result<Arc<dyn GameStore>, ServiceError> {
        self.game_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a storage backend and leave degraded mode.
    pub async fn set_game_store(&self, store: Arc<dyn GameStore>) {
        {
            let mut guard = self.game_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current storage backend and enter degraded mode.
    pub async fn clear_game_store(&self) {
        {
            let mut guard = self.game_store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            let changed = *current != value;
            *current = value;
            changed
        });
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Per-game broadcast rooms.
    pub fn rooms(&self) -> &RoomHub {
        &self.rooms
    }

    /// Point a participant's session at a game.
    pub fn set_current_game(&self, participant_id: &str, game_id: Uuid) {
        self.sessions.insert(participant_id.to_owned(), game_id);
    }

    /// Game the participant most recently created or joined, if any.
    pub fn current_game_of(&self, participant_id: &str) -> Option<Uuid> {
        self.sessions.get(participant_id).map(|entry| *entry)
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Question bank serving per-(tile, difficulty) questions.
    pub fn questions(&self) -> &QuestionBank {
        &self.questions
    }
}
