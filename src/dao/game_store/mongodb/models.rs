use mongodb::bson::{Binary, DateTime, Document, doc, spec::BinarySubtype};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    dao::models::{AnswerLockEntity, GameEntity, MembershipEntity},
    questions::Difficulty,
    state::phase::GamePhase,
};

/// Game document as stored in the `games` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    host_id: String,
    phase: GamePhase,
    created_at: DateTime,
    updated_at: DateTime,
}

impl From<GameEntity> for MongoGameDocument {
    fn from(value: GameEntity) -> Self {
        Self {
            id: value.id,
            host_id: value.host_id,
            phase: value.phase,
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl From<MongoGameDocument> for GameEntity {
    fn from(value: MongoGameDocument) -> Self {
        Self {
            id: value.id,
            host_id: value.host_id,
            phase: value.phase,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        }
    }
}

/// Membership document as stored in the `memberships` collection.
///
/// The `(game_id, participant_id)` pair carries a unique index so the
/// conditional join insert is decided server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMembershipDocument {
    pub(super) game_id: Uuid,
    pub(super) participant_id: String,
    credits: i64,
    available_credits: i64,
    current_tile: u32,
    joined_at: DateTime,
}

impl From<MembershipEntity> for MongoMembershipDocument {
    fn from(value: MembershipEntity) -> Self {
        Self {
            game_id: value.game_id,
            participant_id: value.participant_id,
            credits: value.credits,
            available_credits: value.available_credits,
            current_tile: value.current_tile,
            joined_at: DateTime::from_system_time(value.joined_at),
        }
    }
}

impl From<MongoMembershipDocument> for MembershipEntity {
    fn from(value: MongoMembershipDocument) -> Self {
        Self {
            game_id: value.game_id,
            participant_id: value.participant_id,
            credits: value.credits,
            available_credits: value.available_credits,
            current_tile: value.current_tile,
            joined_at: value.joined_at.to_system_time(),
        }
    }
}

/// Answer lock document as stored in the `answer_locks` collection.
///
/// The `(game_id, tile_id, difficulty)` triple carries a unique index; the
/// duplicate-key error on insert is what loses the first-correct-wins race.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoLockDocument {
    pub(super) game_id: Uuid,
    pub(super) tile_id: u32,
    pub(super) difficulty: Difficulty,
    answered_by: String,
    reward: i64,
    locked_at: DateTime,
}

impl From<AnswerLockEntity> for MongoLockDocument {
    fn from(value: AnswerLockEntity) -> Self {
        Self {
            game_id: value.game_id,
            tile_id: value.tile_id,
            difficulty: value.difficulty,
            answered_by: value.answered_by,
            reward: value.reward,
            locked_at: DateTime::from_system_time(value.locked_at),
        }
    }
}

impl From<MongoLockDocument> for AnswerLockEntity {
    fn from(value: MongoLockDocument) -> Self {
        Self {
            game_id: value.game_id,
            tile_id: value.tile_id,
            difficulty: value.difficulty,
            answered_by: value.answered_by,
            reward: value.reward,
            locked_at: value.locked_at.to_system_time(),
        }
    }
}

pub fn uuid_as_binary(id: Uuid) -> Binary {
    Binary {
        subtype: BinarySubtype::Uuid,
        bytes: id.into_bytes().to_vec(),
    }
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": uuid_as_binary(id)}
}

pub fn membership_filter(game_id: Uuid, participant_id: &str) -> Document {
    doc! {
        "game_id": uuid_as_binary(game_id),
        "participant_id": participant_id,
    }
}
