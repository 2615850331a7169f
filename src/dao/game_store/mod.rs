pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::{
    dao::{
        models::{AnswerLockEntity, GameEntity, MembershipEntity},
        storage::StorageResult,
    },
    questions::Difficulty,
    state::phase::GamePhase,
};

/// Abstraction over the persistence layer for games, memberships and answer
/// locks.
///
/// The store is the sole arbiter of concurrency: every operation with a
/// correctness requirement is expressed as a single atomic primitive here
/// (conditional insert, compare-and-set, clamped increment). Callers must
/// never split one of these into a read followed by a write.
///
/// Boolean returns report the domain outcome of an atomic operation: `false`
/// means the row already existed (conditional inserts), the precondition did
/// not hold (compare-and-set) or the targeted row is missing (updates). Only
/// transport failures surface as errors.
pub trait GameStore: Send + Sync {
    /// Persist a freshly created game row.
    fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>>;

    /// Fetch a game row by id.
    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;

    /// Compare-and-set the lifecycle phase: succeeds only when the stored
    /// phase still equals `from`, making phase order total per game.
    fn advance_phase(
        &self,
        id: Uuid,
        from: GamePhase,
        to: GamePhase,
    ) -> BoxFuture<'static, StorageResult<bool>>;

    /// Insert a membership row unless the (game, participant) pair already
    /// exists. `true` when this call created the row.
    fn insert_membership_if_absent(
        &self,
        membership: MembershipEntity,
    ) -> BoxFuture<'static, StorageResult<bool>>;

    /// Fetch one membership row.
    fn find_membership(
        &self,
        game_id: Uuid,
        participant_id: &str,
    ) -> BoxFuture<'static, StorageResult<Option<MembershipEntity>>>;

    /// All memberships of a game, ordered by join time.
    fn list_memberships(
        &self,
        game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<MembershipEntity>>>;

    /// Atomically add `amount` to both `credits` and `available_credits`.
    fn credit_membership(
        &self,
        game_id: Uuid,
        participant_id: &str,
        amount: i64,
    ) -> BoxFuture<'static, StorageResult<bool>>;

    /// Atomically subtract `amount` from `available_credits`, clamped at
    /// zero inside the store operation. `credits` is untouched.
    fn debit_membership(
        &self,
        game_id: Uuid,
        participant_id: &str,
        amount: i64,
    ) -> BoxFuture<'static, StorageResult<bool>>;

    /// Move a participant's board position marker.
    fn set_current_tile(
        &self,
        game_id: Uuid,
        participant_id: &str,
        tile: u32,
    ) -> BoxFuture<'static, StorageResult<bool>>;

    /// Insert an answer lock unless the (game, tile, difficulty) triple is
    /// already taken. Under concurrent correct submissions exactly one
    /// caller observes `true`.
    fn insert_answer_lock_if_absent(
        &self,
        lock: AnswerLockEntity,
    ) -> BoxFuture<'static, StorageResult<bool>>;

    /// All locks recorded for one tile of a game.
    fn list_answer_locks(
        &self,
        game_id: Uuid,
        tile_id: u32,
    ) -> BoxFuture<'static, StorageResult<Vec<AnswerLockEntity>>>;

    /// Cheap connectivity probe used by the storage supervisor.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;

    /// Attempt to re-establish the backend connection after a failed probe.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
