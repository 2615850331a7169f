//! In-memory [`GameStore`] backend.
//!
//! Backs tests and storeless deployments. Atomicity relies on DashMap's
//! per-shard locking: conditional inserts go through the entry API and
//! counter updates mutate the row while its shard lock is held, which gives
//! the same winner-takes-once semantics the MongoDB backend gets from unique
//! indexes and server-side update operators.

use std::sync::Arc;

use dashmap::{DashMap, mapref::entry::Entry};
use futures::future::BoxFuture;
use uuid::Uuid;

use crate::{
    dao::{
        game_store::GameStore,
        models::{AnswerLockEntity, GameEntity, MembershipEntity},
        storage::StorageResult,
    },
    questions::Difficulty,
    state::phase::GamePhase,
};

type MembershipKey = (Uuid, String);
type LockKey = (Uuid, u32, Difficulty);

/// DashMap-backed store holding every entity in process memory.
#[derive(Clone, Default)]
pub struct MemoryGameStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    games: DashMap<Uuid, GameEntity>,
    memberships: DashMap<MembershipKey, MembershipEntity>,
    locks: DashMap<LockKey, AnswerLockEntity>,
}

impl MemoryGameStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameStore for MemoryGameStore {
    fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.games.insert(game.id, game);
            Ok(())
        })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.games.get(&id).map(|entry| entry.clone())) })
    }

    fn advance_phase(
        &self,
        id: Uuid,
        from: GamePhase,
        to: GamePhase,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            match store.inner.games.get_mut(&id) {
                Some(mut entry) if entry.phase == from => {
                    entry.phase = to;
                    entry.updated_at = std::time::SystemTime::now();
                    Ok(true)
                }
                _ => Ok(false),
            }
        })
    }

    fn insert_membership_if_absent(
        &self,
        membership: MembershipEntity,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let key = (membership.game_id, membership.participant_id.clone());
            match store.inner.memberships.entry(key) {
                Entry::Occupied(_) => Ok(false),
                Entry::Vacant(slot) => {
                    slot.insert(membership);
                    Ok(true)
                }
            }
        })
    }

    fn find_membership(
        &self,
        game_id: Uuid,
        participant_id: &str,
    ) -> BoxFuture<'static, StorageResult<Option<MembershipEntity>>> {
        let store = self.clone();
        let key = (game_id, participant_id.to_owned());
        Box::pin(async move { Ok(store.inner.memberships.get(&key).map(|entry| entry.clone())) })
    }

    fn list_memberships(
        &self,
        game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<MembershipEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut rows: Vec<MembershipEntity> = store
                .inner
                .memberships
                .iter()
                .filter(|entry| entry.key().0 == game_id)
                .map(|entry| entry.clone())
                .collect();
            rows.sort_by(|a, b| {
                a.joined_at
                    .cmp(&b.joined_at)
                    .then_with(|| a.participant_id.cmp(&b.participant_id))
            });
            Ok(rows)
        })
    }

    fn credit_membership(
        &self,
        game_id: Uuid,
        participant_id: &str,
        amount: i64,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        let key = (game_id, participant_id.to_owned());
        Box::pin(async move {
            match store.inner.memberships.get_mut(&key) {
                Some(mut entry) => {
                    entry.credits = entry.credits.saturating_add(amount);
                    entry.available_credits = entry.available_credits.saturating_add(amount);
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }

    fn debit_membership(
        &self,
        game_id: Uuid,
        participant_id: &str,
        amount: i64,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        let key = (game_id, participant_id.to_owned());
        Box::pin(async move {
            match store.inner.memberships.get_mut(&key) {
                Some(mut entry) => {
                    entry.available_credits = entry.available_credits.saturating_sub(amount).max(0);
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }

    fn set_current_tile(
        &self,
        game_id: Uuid,
        participant_id: &str,
        tile: u32,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        let key = (game_id, participant_id.to_owned());
        Box::pin(async move {
            match store.inner.memberships.get_mut(&key) {
                Some(mut entry) => {
                    entry.current_tile = tile;
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }

    fn insert_answer_lock_if_absent(
        &self,
        lock: AnswerLockEntity,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let key = (lock.game_id, lock.tile_id, lock.difficulty);
            match store.inner.locks.entry(key) {
                Entry::Occupied(_) => Ok(false),
                Entry::Vacant(slot) => {
                    slot.insert(lock);
                    Ok(true)
                }
            }
        })
    }

    fn list_answer_locks(
        &self,
        game_id: Uuid,
        tile_id: u32,
    ) -> BoxFuture<'static, StorageResult<Vec<AnswerLockEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut rows: Vec<AnswerLockEntity> = store
                .inner
                .locks
                .iter()
                .filter(|entry| {
                    let (game, tile, _) = entry.key();
                    *game == game_id && *tile == tile_id
                })
                .map(|entry| entry.clone())
                .collect();
            rows.sort_by_key(|lock| lock.locked_at);
            Ok(rows)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> GameEntity {
        GameEntity::new("host".into())
    }

    fn membership(game_id: Uuid, participant: &str) -> MembershipEntity {
        MembershipEntity::new(game_id, participant.into(), 50)
    }

    fn lock(game_id: Uuid, tile: u32, difficulty: Difficulty, by: &str) -> AnswerLockEntity {
        AnswerLockEntity {
            game_id,
            tile_id: tile,
            difficulty,
            answered_by: by.into(),
            reward: 10,
            locked_at: std::time::SystemTime::now(),
        }
    }

    #[tokio::test]
    async fn phase_cas_only_succeeds_from_expected_phase() {
        let store = MemoryGameStore::new();
        let g = game();
        let id = g.id;
        store.insert_game(g).await.unwrap();

        assert!(
            store
                .advance_phase(id, GamePhase::Lobby, GamePhase::Active)
                .await
                .unwrap()
        );
        // Second start loses the CAS.
        assert!(
            !store
                .advance_phase(id, GamePhase::Lobby, GamePhase::Active)
                .await
                .unwrap()
        );
        assert!(
            store
                .advance_phase(id, GamePhase::Active, GamePhase::Ended)
                .await
                .unwrap()
        );
        assert_eq!(
            store.find_game(id).await.unwrap().unwrap().phase,
            GamePhase::Ended
        );
    }

    #[tokio::test]
    async fn concurrent_duplicate_joins_create_one_row() {
        let store = MemoryGameStore::new();
        let game_id = Uuid::new_v4();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .insert_membership_if_absent(membership(game_id, "alice"))
                    .await
                    .unwrap()
            }));
        }

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap() {
                created += 1;
            }
        }
        assert_eq!(created, 1);

        let rows = store.list_memberships(game_id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].credits, 50);
        assert_eq!(rows[0].available_credits, 50);
    }

    #[tokio::test]
    async fn concurrent_lock_inserts_yield_exactly_one_winner() {
        let store = MemoryGameStore::new();
        let game_id = Uuid::new_v4();

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .insert_answer_lock_if_absent(lock(
                        game_id,
                        3,
                        Difficulty::Easy,
                        &format!("p{i}"),
                    ))
                    .await
                    .unwrap()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
        assert_eq!(store.list_answer_locks(game_id, 3).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn debit_is_clamped_under_concurrent_overdraft() {
        let store = MemoryGameStore::new();
        let game_id = Uuid::new_v4();
        store
            .insert_membership_if_absent(membership(game_id, "bob"))
            .await
            .unwrap();

        // 10 debits of 20 against a balance of 50.
        let mut handles = Vec::new();
        for _ in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.debit_membership(game_id, "bob", 20).await.unwrap()
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap());
        }

        let row = store.find_membership(game_id, "bob").await.unwrap().unwrap();
        assert_eq!(row.available_credits, 0);
        // The cumulative score is untouched by debits.
        assert_eq!(row.credits, 50);
    }

    #[tokio::test]
    async fn credit_updates_both_balances() {
        let store = MemoryGameStore::new();
        let game_id = Uuid::new_v4();
        store
            .insert_membership_if_absent(membership(game_id, "carol"))
            .await
            .unwrap();

        assert!(store.credit_membership(game_id, "carol", 10).await.unwrap());
        let row = store
            .find_membership(game_id, "carol")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.credits, 60);
        assert_eq!(row.available_credits, 60);

        // Missing rows report false rather than erroring.
        assert!(!store.credit_membership(game_id, "ghost", 10).await.unwrap());
        assert!(!store.debit_membership(game_id, "ghost", 10).await.unwrap());
    }

    #[tokio::test]
    async fn extreme_amounts_saturate_rather_than_wrap() {
        let store = MemoryGameStore::new();
        let game_id = Uuid::new_v4();
        store
            .insert_membership_if_absent(membership(game_id, "dave"))
            .await
            .unwrap();

        assert!(
            store
                .credit_membership(game_id, "dave", i64::MAX)
                .await
                .unwrap()
        );
        let row = store
            .find_membership(game_id, "dave")
            .await
            .unwrap()
            .unwrap();
        // Balances pin at the top instead of wrapping negative.
        assert_eq!(row.credits, i64::MAX);
        assert_eq!(row.available_credits, i64::MAX);

        assert!(
            store
                .debit_membership(game_id, "dave", i64::MAX)
                .await
                .unwrap()
        );
        let row = store
            .find_membership(game_id, "dave")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.available_credits, 0);
        assert_eq!(row.credits, i64::MAX);
    }

    #[tokio::test]
    async fn roster_is_ordered_by_join_time() {
        let store = MemoryGameStore::new();
        let game_id = Uuid::new_v4();

        for name in ["zoe", "adam", "mia"] {
            store
                .insert_membership_if_absent(membership(game_id, name))
                .await
                .unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let names: Vec<String> = store
            .list_memberships(game_id)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.participant_id)
            .collect();
        assert_eq!(names, vec!["zoe", "adam", "mia"]);
    }
}
