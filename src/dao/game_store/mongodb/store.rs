//! MongoDB-backed [`GameStore`].
//!
//! Concurrency-critical operations map onto server-side primitives: the
//! conditional inserts ride on unique indexes (a lost race surfaces as a
//! duplicate-key error), credits use `$inc`, the debit clamp is an
//! aggregation-pipeline update evaluated atomically on the server, and the
//! phase change is an `update_one` filtered on the expected current phase.

use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Collection, Database,
    bson::{DateTime, doc},
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{
        MongoGameDocument, MongoLockDocument, MongoMembershipDocument, doc_id, membership_filter,
        uuid_as_binary,
    },
};
use crate::{
    dao::{
        game_store::GameStore,
        models::{AnswerLockEntity, GameEntity, MembershipEntity},
        storage::StorageResult,
    },
    state::phase::GamePhase,
};

const GAME_COLLECTION: &str = "games";
const MEMBERSHIP_COLLECTION: &str = "memberships";
const LOCK_COLLECTION: &str = "answer_locks";

/// Handle to the MongoDB backend; clones share one connection.
#[derive(Clone)]
pub struct MongoGameStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let database =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.database = database;
        Ok(())
    }
}

/// Whether a driver error reports a lost conditional insert (E11000).
fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        &*err.kind,
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == 11000
    )
}

impl MongoGameStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let database = establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    /// Create the unique indexes the conditional inserts depend on.
    async fn ensure_indexes(&self) -> MongoResult<()> {
        let membership_index = mongodb::IndexModel::builder()
            .keys(doc! {"game_id": 1, "participant_id": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("membership_unique_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            )
            .build();

        self.membership_collection()
            .await
            .create_index(membership_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: MEMBERSHIP_COLLECTION,
                index: "game_id,participant_id",
                source,
            })?;

        let lock_index = mongodb::IndexModel::builder()
            .keys(doc! {"game_id": 1, "tile_id": 1, "difficulty": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("answer_lock_unique_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            )
            .build();

        self.lock_collection()
            .await
            .create_index(lock_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: LOCK_COLLECTION,
                index: "game_id,tile_id,difficulty",
                source,
            })?;

        Ok(())
    }

    async fn game_collection(&self) -> Collection<MongoGameDocument> {
        let guard = self.inner.state.read().await;
        guard.database.collection(GAME_COLLECTION)
    }

    async fn membership_collection(&self) -> Collection<MongoMembershipDocument> {
        let guard = self.inner.state.read().await;
        guard.database.collection(MEMBERSHIP_COLLECTION)
    }

    async fn lock_collection(&self) -> Collection<MongoLockDocument> {
        let guard = self.inner.state.read().await;
        guard.database.collection(LOCK_COLLECTION)
    }

    async fn insert_game(&self, game: GameEntity) -> MongoResult<()> {
        let game_id = game.id;
        let document: MongoGameDocument = game.into();
        self.game_collection()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::Insert {
                collection: GAME_COLLECTION,
                game_id,
                source,
            })?;
        Ok(())
    }

    async fn find_game(&self, id: Uuid) -> MongoResult<Option<GameEntity>> {
        let document = self
            .game_collection()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Query {
                collection: GAME_COLLECTION,
                game_id: id,
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn advance_phase(&self, id: Uuid, from: GamePhase, to: GamePhase) -> MongoResult<bool> {
        let filter = doc! {
            "_id": uuid_as_binary(id),
            "phase": from.as_str(),
        };
        let update = doc! {
            "$set": { "phase": to.as_str(), "updated_at": DateTime::now() }
        };

        let result = self
            .game_collection()
            .await
            .update_one(filter, update)
            .await
            .map_err(|source| MongoDaoError::Update {
                collection: GAME_COLLECTION,
                game_id: id,
                source,
            })?;
        Ok(result.matched_count > 0)
    }

    async fn insert_membership_if_absent(
        &self,
        membership: MembershipEntity,
    ) -> MongoResult<bool> {
        let game_id = membership.game_id;
        let document: MongoMembershipDocument = membership.into();
        match self.membership_collection().await.insert_one(&document).await {
            Ok(_) => Ok(true),
            Err(err) if is_duplicate_key(&err) => Ok(false),
            Err(source) => Err(MongoDaoError::Insert {
                collection: MEMBERSHIP_COLLECTION,
                game_id,
                source,
            }),
        }
    }

    async fn find_membership(
        &self,
        game_id: Uuid,
        participant_id: &str,
    ) -> MongoResult<Option<MembershipEntity>> {
        let document = self
            .membership_collection()
            .await
            .find_one(membership_filter(game_id, participant_id))
            .await
            .map_err(|source| MongoDaoError::Query {
                collection: MEMBERSHIP_COLLECTION,
                game_id,
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn list_memberships(&self, game_id: Uuid) -> MongoResult<Vec<MembershipEntity>> {
        let documents: Vec<MongoMembershipDocument> = self
            .membership_collection()
            .await
            .find(doc! {"game_id": uuid_as_binary(game_id)})
            .sort(doc! {"joined_at": 1})
            .await
            .map_err(|source| MongoDaoError::Query {
                collection: MEMBERSHIP_COLLECTION,
                game_id,
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::Query {
                collection: MEMBERSHIP_COLLECTION,
                game_id,
                source,
            })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn credit_membership(
        &self,
        game_id: Uuid,
        participant_id: &str,
        amount: i64,
    ) -> MongoResult<bool> {
        let update = doc! {
            "$inc": { "credits": amount, "available_credits": amount }
        };
        let result = self
            .membership_collection()
            .await
            .update_one(membership_filter(game_id, participant_id), update)
            .await
            .map_err(|source| MongoDaoError::Update {
                collection: MEMBERSHIP_COLLECTION,
                game_id,
                source,
            })?;
        Ok(result.matched_count > 0)
    }

    async fn debit_membership(
        &self,
        game_id: Uuid,
        participant_id: &str,
        amount: i64,
    ) -> MongoResult<bool> {
        // Pipeline update so the zero floor is applied inside the server-side
        // atomic step; a `$inc` plus a separate guard would reintroduce the
        // overdraft race.
        let update = vec![doc! {
            "$set": {
                "available_credits": {
                    "$max": [0, { "$subtract": ["$available_credits", amount] }]
                }
            }
        }];
        let result = self
            .membership_collection()
            .await
            .update_one(membership_filter(game_id, participant_id), update)
            .await
            .map_err(|source| MongoDaoError::Update {
                collection: MEMBERSHIP_COLLECTION,
                game_id,
                source,
            })?;
        Ok(result.matched_count > 0)
    }

    async fn set_current_tile(
        &self,
        game_id: Uuid,
        participant_id: &str,
        tile: u32,
    ) -> MongoResult<bool> {
        let result = self
            .membership_collection()
            .await
            .update_one(
                membership_filter(game_id, participant_id),
                doc! {"$set": {"current_tile": tile}},
            )
            .await
            .map_err(|source| MongoDaoError::Update {
                collection: MEMBERSHIP_COLLECTION,
                game_id,
                source,
            })?;
        Ok(result.matched_count > 0)
    }

    async fn insert_answer_lock_if_absent(&self, lock: AnswerLockEntity) -> MongoResult<bool> {
        let game_id = lock.game_id;
        let document: MongoLockDocument = lock.into();
        match self.lock_collection().await.insert_one(&document).await {
            Ok(_) => Ok(true),
            Err(err) if is_duplicate_key(&err) => Ok(false),
            Err(source) => Err(MongoDaoError::Insert {
                collection: LOCK_COLLECTION,
                game_id,
                source,
            }),
        }
    }

    async fn list_answer_locks(
        &self,
        game_id: Uuid,
        tile_id: u32,
    ) -> MongoResult<Vec<AnswerLockEntity>> {
        let documents: Vec<MongoLockDocument> = self
            .lock_collection()
            .await
            .find(doc! {"game_id": uuid_as_binary(game_id), "tile_id": tile_id})
            .sort(doc! {"locked_at": 1})
            .await
            .map_err(|source| MongoDaoError::Query {
                collection: LOCK_COLLECTION,
                game_id,
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::Query {
                collection: LOCK_COLLECTION,
                game_id,
                source,
            })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }
}

impl GameStore for MongoGameStore {
    fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_game(game).await.map_err(Into::into) })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_game(id).await.map_err(Into::into) })
    }

    fn advance_phase(
        &self,
        id: Uuid,
        from: GamePhase,
        to: GamePhase,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.advance_phase(id, from, to).await.map_err(Into::into) })
    }

    fn insert_membership_if_absent(
        &self,
        membership: MembershipEntity,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .insert_membership_if_absent(membership)
                .await
                .map_err(Into::into)
        })
    }

    fn find_membership(
        &self,
        game_id: Uuid,
        participant_id: &str,
    ) -> BoxFuture<'static, StorageResult<Option<MembershipEntity>>> {
        let store = self.clone();
        let participant = participant_id.to_owned();
        Box::pin(async move {
            store
                .find_membership(game_id, &participant)
                .await
                .map_err(Into::into)
        })
    }

    fn list_memberships(
        &self,
        game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<MembershipEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_memberships(game_id).await.map_err(Into::into) })
    }

    fn credit_membership(
        &self,
        game_id: Uuid,
        participant_id: &str,
        amount: i64,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        let participant = participant_id.to_owned();
        Box::pin(async move {
            store
                .credit_membership(game_id, &participant, amount)
                .await
                .map_err(Into::into)
        })
    }

    fn debit_membership(
        &self,
        game_id: Uuid,
        participant_id: &str,
        amount: i64,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        let participant = participant_id.to_owned();
        Box::pin(async move {
            store
                .debit_membership(game_id, &participant, amount)
                .await
                .map_err(Into::into)
        })
    }

    fn set_current_tile(
        &self,
        game_id: Uuid,
        participant_id: &str,
        tile: u32,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        let participant = participant_id.to_owned();
        Box::pin(async move {
            store
                .set_current_tile(game_id, &participant, tile)
                .await
                .map_err(Into::into)
        })
    }

    fn insert_answer_lock_if_absent(
        &self,
        lock: AnswerLockEntity,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .insert_answer_lock_if_absent(lock)
                .await
                .map_err(Into::into)
        })
    }

    fn list_answer_locks(
        &self,
        game_id: Uuid,
        tile_id: u32,
    ) -> BoxFuture<'static, StorageResult<Vec<AnswerLockEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_answer_locks(game_id, tile_id)
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
