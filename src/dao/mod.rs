//! Persistence layer: storage trait, entities and backends.

pub mod game_store;
pub mod models;
pub mod storage;
