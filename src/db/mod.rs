use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Account, Rating},
};

pub mod memory;
pub mod postgres;
pub mod redis;

pub use memory::MemoryStore;
pub use postgres::{create_pool, PostgresStore};
pub use redis::create_redis_client;
pub use redis::Cache;
pub use redis::CacheKey;

/// Persistence behind the API: accounts, sessions, ratings, invites, friends.
///
/// Backed by PostgreSQL in production and by an in-memory map in tests.
#[async_trait]
pub trait Store: Send + Sync {
    /// Creates an account; fails with Conflict if the username is taken
    async fn create_account(&self, account: Account) -> AppResult<()>;

    /// Looks up an account by username
    async fn find_account(&self, username: &str) -> AppResult<Option<Account>>;

    /// Issues a new session token for the user
    async fn create_session(&self, username: &str) -> AppResult<String>;

    /// Resolves a session token to its username, if the session exists
    async fn resolve_session(&self, token: &str) -> AppResult<Option<String>>;

    /// Revokes a session token; revoking an unknown token is a no-op
    async fn revoke_session(&self, token: &str) -> AppResult<()>;

    /// Persists a new rating
    async fn insert_rating(&self, rating: Rating) -> AppResult<Rating>;

    /// Most recent ratings across all users, newest first
    async fn recent_ratings(&self, limit: i64) -> AppResult<Vec<Rating>>;

    /// All ratings owned by `owner`, newest first
    async fn ratings_for(&self, owner: &str) -> AppResult<Vec<Rating>>;

    /// Looks up a rating by id
    async fn find_rating(&self, id: Uuid) -> AppResult<Option<Rating>>;

    /// Replaces the comment on a rating
    async fn update_comment(&self, id: Uuid, comment: &str) -> AppResult<()>;

    /// Deletes a rating
    async fn delete_rating(&self, id: Uuid) -> AppResult<()>;

    /// Creates a single-use invite code owned by `owner`
    async fn create_invite(&self, owner: &str) -> AppResult<String>;

    /// Consumes an unused invite code, returning its owner
    async fn take_invite(&self, code: &str) -> AppResult<Option<String>>;

    /// Records a symmetric friend edge between two users
    async fn add_friend_edge(&self, a: &str, b: &str) -> AppResult<()>;

    /// Friend usernames connected to `username`
    async fn friends_of(&self, username: &str) -> AppResult<Vec<String>>;
}
