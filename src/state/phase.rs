use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle phase of a game session.
///
/// Phases only ever move forward: `Lobby → Active → Ended`. The store-level
/// compare-and-set in [`crate::dao::game_store::GameStore::advance_phase`]
/// enforces this ordering against concurrent writers; this enum owns the
/// rule table the services consult before attempting the swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    /// Players are gathering; the host has not started the game yet.
    Lobby,
    /// The game is running and answers are being accepted.
    Active,
    /// Terminal phase; no further mutations are accepted.
    Ended,
}

impl GamePhase {
    /// Stable string form used by the storage backends.
    pub fn as_str(self) -> &'static str {
        match self {
            GamePhase::Lobby => "lobby",
            GamePhase::Active => "active",
            GamePhase::Ended => "ended",
        }
    }

    /// Whether a direct transition from `self` to `to` is permitted.
    ///
    /// Backward transitions and self-transitions are rejected, as is skipping
    /// straight past a terminal phase: `Ended` admits nothing.
    pub fn can_advance(self, to: GamePhase) -> bool {
        matches!(
            (self, to),
            (GamePhase::Lobby, GamePhase::Active)
                | (GamePhase::Lobby, GamePhase::Ended)
                | (GamePhase::Active, GamePhase::Ended)
        )
    }

    /// True unless the phase is terminal.
    pub fn is_open(self) -> bool {
        !matches!(self, GamePhase::Ended)
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_are_monotonic() {
        assert!(GamePhase::Lobby.can_advance(GamePhase::Active));
        assert!(GamePhase::Lobby.can_advance(GamePhase::Ended));
        assert!(GamePhase::Active.can_advance(GamePhase::Ended));

        assert!(!GamePhase::Active.can_advance(GamePhase::Lobby));
        assert!(!GamePhase::Ended.can_advance(GamePhase::Lobby));
        assert!(!GamePhase::Ended.can_advance(GamePhase::Active));
        assert!(!GamePhase::Ended.can_advance(GamePhase::Ended));
    }

    #[test]
    fn no_self_transitions() {
        for phase in [GamePhase::Lobby, GamePhase::Active, GamePhase::Ended] {
            assert!(!phase.can_advance(phase));
        }
    }

    #[test]
    fn serde_and_storage_forms_agree() {
        for phase in [GamePhase::Lobby, GamePhase::Active, GamePhase::Ended] {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{}\"", phase.as_str()));
            let back: GamePhase = serde_json::from_str(&json).unwrap();
            assert_eq!(back, phase);
        }
        assert!(serde_json::from_str::<GamePhase>("\"paused\"").is_err());
    }

    #[test]
    fn only_ended_is_closed() {
        assert!(GamePhase::Lobby.is_open());
        assert!(GamePhase::Active.is_open());
        assert!(!GamePhase::Ended.is_open());
    }
}
