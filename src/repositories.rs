use crate::{
    domain::WishRepository,
    errors::RepoError,
    models::{NewWish, WishRecord},
};
use anyhow::Context;
use async_trait::async_trait;
use sqlx::{mysql::MySqlPoolOptions, postgres::PgPoolOptions, MySqlPool, PgPool};
use tracing::{self, info};

/// Which relational backend a `DATABASE_URL` points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseKind {
    Postgres,
    MySql,
}

impl DatabaseKind {
    /// Picks the backend from the URL scheme.
    pub fn from_url(url: &str) -> Option<Self> {
        let scheme = url.split_once("://")?.0.to_ascii_lowercase();
        match scheme.as_str() {
            "postgres" | "postgresql" => Some(DatabaseKind::Postgres),
            "mysql" | "mariadb" => Some(DatabaseKind::MySql),
            _ => None,
        }
    }
}

// --- Postgres ---

#[derive(Debug, Clone)]
pub struct PgWishRepository {
    pool: PgPool,
}

impl PgWishRepository {
    pub fn new(pool: PgPool) -> Self {
        info!("Initializing PgWishRepository");
        Self { pool }
    }

    /// Builds a pool against `database_url`; connections open on first use.
    /// TLS follows the `sslmode` in the URL.
    pub fn connect_lazy(database_url: &str, max_connections: u32) -> Result<Self, RepoError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_lazy(database_url)
            .context("Postgres: Invalid connection options")?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl WishRepository for PgWishRepository {
    async fn get_by_id(&self, id: &str) -> Result<Option<WishRecord>, RepoError> {
        // The cast happens server side, so a non-numeric id is a query error.
        let wish = sqlx::query_as::<_, WishRecord>(
            "SELECT id::BIGINT AS id, name, message, image FROM users WHERE id = CAST($1 AS BIGINT)",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context(format!("Postgres: Failed to fetch wish (id: {})", id))?;
        Ok(wish)
    }

    async fn create(&self, wish: &NewWish) -> Result<i64, RepoError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO users (name, message, image) VALUES ($1, $2, $3) RETURNING id::BIGINT",
        )
        .bind(wish.name.as_deref())
        .bind(wish.message.as_deref())
        .bind(&wish.image)
        .fetch_one(&self.pool)
        .await
        .context("Postgres: Failed to insert wish")?;

        tracing::debug!(wish_id = id, "Postgres: Wish inserted");
        Ok(id)
    }

    async fn ping(&self) -> Result<(), RepoError> {
        let now: String = sqlx::query_scalar("SELECT NOW()::TEXT")
            .fetch_one(&self.pool)
            .await
            .context("Postgres: Connectivity check failed")?;
        info!(server_time = %now, "Connected to PostgreSQL");
        Ok(())
    }
}

// --- MySQL ---

#[derive(Debug, Clone)]
pub struct MySqlWishRepository {
    pool: MySqlPool,
}

impl MySqlWishRepository {
    pub fn new(pool: MySqlPool) -> Self {
        info!("Initializing MySqlWishRepository");
        Self { pool }
    }

    pub fn connect_lazy(database_url: &str, max_connections: u32) -> Result<Self, RepoError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .connect_lazy(database_url)
            .context("MySQL: Invalid connection options")?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl WishRepository for MySqlWishRepository {
    async fn get_by_id(&self, id: &str) -> Result<Option<WishRecord>, RepoError> {
        // MySQL coerces the string parameter to the column type itself.
        let wish = sqlx::query_as::<_, WishRecord>(
            "SELECT CAST(id AS SIGNED) AS id, name, message, image FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context(format!("MySQL: Failed to fetch wish (id: {})", id))?;
        Ok(wish)
    }

    async fn create(&self, wish: &NewWish) -> Result<i64, RepoError> {
        let result = sqlx::query("INSERT INTO users (name, message, image) VALUES (?, ?, ?)")
            .bind(wish.name.as_deref())
            .bind(wish.message.as_deref())
            .bind(&wish.image)
            .execute(&self.pool)
            .await
            .context("MySQL: Failed to insert wish")?;

        let id = i64::try_from(result.last_insert_id())
            .context("MySQL: Inserted id does not fit in i64")?;
        tracing::debug!(wish_id = id, "MySQL: Wish inserted");
        Ok(id)
    }

    async fn ping(&self) -> Result<(), RepoError> {
        let now: String = sqlx::query_scalar("SELECT CAST(NOW() AS CHAR)")
            .fetch_one(&self.pool)
            .await
            .context("MySQL: Connectivity check failed")?;
        info!(server_time = %now, "Connected to MySQL");
        Ok(())
    }
}
