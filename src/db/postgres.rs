use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Account, MediaType, Rating},
};

use super::Store;

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies pending migrations
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Row shape for the ratings table; media_type is stored as its display label
#[derive(Debug, FromRow)]
struct RatingRow {
    id: Uuid,
    owner: String,
    title: String,
    media_type: String,
    score: f64,
    comment: String,
    external_id: Option<i64>,
    poster_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl RatingRow {
    fn into_rating(self) -> AppResult<Rating> {
        let media_type = MediaType::parse(&self.media_type).ok_or_else(|| {
            AppError::Internal(format!("Unknown media type in database: {}", self.media_type))
        })?;

        Ok(Rating {
            id: self.id,
            owner: self.owner,
            title: self.title,
            media_type,
            score: self.score,
            comment: self.comment,
            external_id: self.external_id,
            poster_url: self.poster_url,
            created_at: self.created_at,
        })
    }
}

fn rows_to_ratings(rows: Vec<RatingRow>) -> AppResult<Vec<Rating>> {
    rows.into_iter().map(RatingRow::into_rating).collect()
}

#[derive(Debug, FromRow)]
struct AccountRow {
    username: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl Store for PostgresStore {
    async fn create_account(&self, account: Account) -> AppResult<()> {
        let existing: Option<(String,)> =
            sqlx::query_as("SELECT username FROM accounts WHERE username = $1")
                .bind(&account.username)
                .fetch_optional(&self.pool)
                .await?;

        if existing.is_some() {
            return Err(AppError::Conflict(
                "Username already exists. Try logging in.".to_string(),
            ));
        }

        sqlx::query("INSERT INTO accounts (username, password_hash, created_at) VALUES ($1, $2, $3)")
            .bind(&account.username)
            .bind(&account.password_hash)
            .bind(account.created_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_account(&self, username: &str) -> AppResult<Option<Account>> {
        let row: Option<AccountRow> = sqlx::query_as(
            "SELECT username, password_hash, created_at FROM accounts WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Account {
            username: r.username,
            password_hash: r.password_hash,
            created_at: r.created_at,
        }))
    }

    async fn create_session(&self, username: &str) -> AppResult<String> {
        let token = Uuid::new_v4().to_string();

        sqlx::query("INSERT INTO sessions (token, username) VALUES ($1, $2)")
            .bind(&token)
            .bind(username)
            .execute(&self.pool)
            .await?;

        Ok(token)
    }

    async fn resolve_session(&self, token: &str) -> AppResult<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT username FROM sessions WHERE token = $1")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(username,)| username))
    }

    async fn revoke_session(&self, token: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn insert_rating(&self, rating: Rating) -> AppResult<Rating> {
        sqlx::query(
            r#"
            INSERT INTO ratings
                (id, owner, title, media_type, score, comment, external_id, poster_url, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(rating.id)
        .bind(&rating.owner)
        .bind(&rating.title)
        .bind(rating.media_type.to_string())
        .bind(rating.score)
        .bind(&rating.comment)
        .bind(rating.external_id)
        .bind(&rating.poster_url)
        .bind(rating.created_at)
        .execute(&self.pool)
        .await?;

        Ok(rating)
    }

    async fn recent_ratings(&self, limit: i64) -> AppResult<Vec<Rating>> {
        let rows: Vec<RatingRow> = sqlx::query_as(
            r#"
            SELECT id, owner, title, media_type, score, comment, external_id, poster_url, created_at
            FROM ratings
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows_to_ratings(rows)
    }

    async fn ratings_for(&self, owner: &str) -> AppResult<Vec<Rating>> {
        let rows: Vec<RatingRow> = sqlx::query_as(
            r#"
            SELECT id, owner, title, media_type, score, comment, external_id, poster_url, created_at
            FROM ratings
            WHERE owner = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        rows_to_ratings(rows)
    }

    async fn find_rating(&self, id: Uuid) -> AppResult<Option<Rating>> {
        let row: Option<RatingRow> = sqlx::query_as(
            r#"
            SELECT id, owner, title, media_type, score, comment, external_id, poster_url, created_at
            FROM ratings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(RatingRow::into_rating).transpose()
    }

    async fn update_comment(&self, id: Uuid, comment: &str) -> AppResult<()> {
        sqlx::query("UPDATE ratings SET comment = $2 WHERE id = $1")
            .bind(id)
            .bind(comment)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_rating(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM ratings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn create_invite(&self, owner: &str) -> AppResult<String> {
        let code = Uuid::new_v4().simple().to_string()[..8].to_string();

        sqlx::query("INSERT INTO invites (code, owner) VALUES ($1, $2)")
            .bind(&code)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        Ok(code)
    }

    async fn take_invite(&self, code: &str) -> AppResult<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as(
            "UPDATE invites SET used = TRUE WHERE code = $1 AND used = FALSE RETURNING owner",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(owner,)| owner))
    }

    async fn add_friend_edge(&self, a: &str, b: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO friends (username, friend)
            VALUES ($1, $2), ($2, $1)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(a)
        .bind(b)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn friends_of(&self, username: &str) -> AppResult<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT friend FROM friends WHERE username = $1 ORDER BY friend")
                .bind(username)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(friend,)| friend).collect())
    }
}
