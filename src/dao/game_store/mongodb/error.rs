//! Error types for the MongoDB storage implementation.

use mongodb::error::Error as MongoError;
use thiserror::Error;
use uuid::Uuid;

/// Convenient result alias returning [`MongoDaoError`] failures.
pub type MongoResult<T> = Result<T, MongoDaoError>;

/// Failures that can occur while interacting with MongoDB.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// The connection URI could not be parsed.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        /// The offending URI.
        uri: String,
        /// Driver-level failure.
        #[source]
        source: MongoError,
    },
    /// The client could not be constructed from the parsed options.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        /// Driver-level failure.
        #[source]
        source: MongoError,
    },
    /// The initial connection ping never succeeded.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        /// Number of attempts made before giving up.
        attempts: u32,
        /// Driver-level failure from the last attempt.
        #[source]
        source: MongoError,
    },
    /// A health-check ping failed on an established connection.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        /// Driver-level failure.
        #[source]
        source: MongoError,
    },
    /// Creating one of the required indexes failed.
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        /// Target collection.
        collection: &'static str,
        /// Index key description.
        index: &'static str,
        /// Driver-level failure.
        #[source]
        source: MongoError,
    },
    /// An insert against a collection failed for a non-duplicate reason.
    #[error("failed to insert into `{collection}` for game `{game_id}`")]
    Insert {
        /// Target collection.
        collection: &'static str,
        /// Game the document belongs to.
        game_id: Uuid,
        /// Driver-level failure.
        #[source]
        source: MongoError,
    },
    /// A query against a collection failed.
    #[error("failed to query `{collection}` for game `{game_id}`")]
    Query {
        /// Target collection.
        collection: &'static str,
        /// Game the query is scoped to.
        game_id: Uuid,
        /// Driver-level failure.
        #[source]
        source: MongoError,
    },
    /// An update against a collection failed.
    #[error("failed to update `{collection}` for game `{game_id}`")]
    Update {
        /// Target collection.
        collection: &'static str,
        /// Game the update is scoped to.
        game_id: Uuid,
        /// Driver-level failure.
        #[source]
        source: MongoError,
    },
}
