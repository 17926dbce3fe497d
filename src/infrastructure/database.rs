// Database - SQLite connection pool and schema bootstrap

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::error::{db_error, AppError, AppResult};

const SCHEMA: &[(&str, &str)] = &[
    (
        "users table",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            nick_name TEXT NOT NULL COLLATE NOCASE,
            email TEXT NOT NULL COLLATE NOCASE,
            password_hash TEXT,
            is_federated INTEGER NOT NULL DEFAULT 0,
            is_verified INTEGER NOT NULL DEFAULT 0,
            name TEXT,
            last_name TEXT,
            gender TEXT,
            profile_image TEXT,
            cover_image TEXT,
            description TEXT,
            gamification_level INTEGER NOT NULL DEFAULT 1,
            number_of_followers INTEGER NOT NULL DEFAULT 0 CHECK (number_of_followers >= 0),
            number_of_following INTEGER NOT NULL DEFAULT 0 CHECK (number_of_following >= 0),
            token_version INTEGER NOT NULL DEFAULT 0,
            deleted_at INTEGER,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    ),
    (
        "live email index",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email_live ON users(email) WHERE deleted_at IS NULL",
    ),
    (
        "live nickname index",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_users_nick_live ON users(nick_name) WHERE deleted_at IS NULL",
    ),
    (
        "posts table",
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES users(id),
            description TEXT,
            multimedia TEXT NOT NULL,
            latitude REAL,
            longitude REAL,
            city TEXT,
            likes INTEGER NOT NULL DEFAULT 0 CHECK (likes >= 0),
            total_comments INTEGER NOT NULL DEFAULT 0 CHECK (total_comments >= 0),
            last_comment_id INTEGER,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    ),
    (
        "posts created index",
        "CREATE INDEX IF NOT EXISTS idx_posts_created ON posts(created_at DESC, id DESC)",
    ),
    (
        "posts author index",
        "CREATE INDEX IF NOT EXISTS idx_posts_user_created ON posts(user_id, created_at DESC)",
    ),
    (
        "comments table",
        r#"
        CREATE TABLE IF NOT EXISTS comments (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES users(id),
            post_id INTEGER NOT NULL REFERENCES posts(id),
            comment TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    ),
    (
        "comments post index",
        "CREATE INDEX IF NOT EXISTS idx_comments_post_created ON comments(post_id, created_at DESC, id DESC)",
    ),
    (
        "likes table",
        r#"
        CREATE TABLE IF NOT EXISTS likes (
            user_id INTEGER NOT NULL REFERENCES users(id),
            post_id INTEGER NOT NULL REFERENCES posts(id),
            created_at INTEGER NOT NULL,
            PRIMARY KEY (user_id, post_id)
        )
        "#,
    ),
    (
        "likes post index",
        "CREATE INDEX IF NOT EXISTS idx_likes_post ON likes(post_id)",
    ),
    (
        "bookmarks table",
        r#"
        CREATE TABLE IF NOT EXISTS bookmarks (
            user_id INTEGER NOT NULL REFERENCES users(id),
            post_id INTEGER NOT NULL REFERENCES posts(id),
            created_at INTEGER NOT NULL,
            PRIMARY KEY (user_id, post_id)
        )
        "#,
    ),
    (
        "bookmarks user index",
        "CREATE INDEX IF NOT EXISTS idx_bookmarks_user_created ON bookmarks(user_id, created_at DESC)",
    ),
    (
        "follows table",
        r#"
        CREATE TABLE IF NOT EXISTS follows (
            follower_id INTEGER NOT NULL REFERENCES users(id),
            followee_id INTEGER NOT NULL REFERENCES users(id),
            created_at INTEGER NOT NULL,
            PRIMARY KEY (follower_id, followee_id),
            CHECK (follower_id <> followee_id)
        )
        "#,
    ),
    (
        "follows followee index",
        "CREATE INDEX IF NOT EXISTS idx_follows_followee ON follows(followee_id, created_at DESC)",
    ),
    (
        "verification codes table",
        r#"
        CREATE TABLE IF NOT EXISTS verification_codes (
            email TEXT PRIMARY KEY COLLATE NOCASE,
            code TEXT NOT NULL,
            attempts INTEGER NOT NULL DEFAULT 0,
            expires_at INTEGER NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    ),
];

/// Shared handle to the SQLite pool.
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// File-backed pool in WAL mode, so readers never block the writer.
    ///
    /// Write transactions must open with a write statement (an insert, or one of the
    /// `lock_*` updates on the entities). SQLite will not wait on the busy timeout for a
    /// transaction that already holds a read lock and then asks to write.
    pub async fn connect(url: &str, max_connections: u32) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| AppError::DatabaseError(format!("Invalid database url {}: {}", url, e)))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect to {}: {}", url, e)))?;

        let db = Self { pool };
        db.initialize().await?;
        Ok(db)
    }

    /// In-memory database for tests. A single connection, since every SQLite
    /// `:memory:` connection is its own database.
    pub async fn new_in_memory() -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| AppError::DatabaseError(format!("Invalid in-memory url: {}", e)))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to connect to in-memory SQLite: {}", e))
            })?;

        let db = Self { pool };
        db.initialize().await?;
        Ok(db)
    }

    /// Create tables and indexes. Safe to run against an existing database.
    pub async fn initialize(&self) -> AppResult<()> {
        for (name, statement) in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Failed to create {}: {}", name, e)))?;
        }
        info!("Database schema ready ({} statements)", SCHEMA.len());
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_error("Database health check failed"))?;
        Ok(())
    }
}
