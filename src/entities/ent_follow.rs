// EntFollow - one row per directed follow edge

use sqlx::{FromRow, SqliteExecutor};

use crate::core::{Page, Timestamp, UserId};
use crate::entities::EntUser;
use crate::error::{db_error, AppResult};

#[derive(Debug, Clone, FromRow)]
pub struct EntFollow {
    pub follower_id: UserId,
    pub followee_id: UserId,
    pub created_at: Timestamp,
}

impl EntFollow {
    /// Returns true only when the edge is new.
    pub async fn insert<'e, E>(
        executor: E,
        follower: UserId,
        followee: UserId,
        now: Timestamp,
    ) -> AppResult<bool>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO follows (follower_id, followee_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(follower)
        .bind(followee)
        .bind(now)
        .execute(executor)
        .await
        .map_err(db_error("Failed to follow"))?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn delete<'e, E>(executor: E, follower: UserId, followee: UserId) -> AppResult<bool>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM follows WHERE follower_id = ? AND followee_id = ?")
            .bind(follower)
            .bind(followee)
            .execute(executor)
            .await
            .map_err(db_error("Failed to unfollow"))?;
        Ok(result.rows_affected() == 1)
    }

    /// Live accounts following `user`, newest edge first.
    pub async fn gen_followers<'e, E>(executor: E, user: UserId, page: Page) -> AppResult<Vec<EntUser>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, EntUser>(
            "SELECT u.* FROM follows f JOIN users u ON u.id = f.follower_id \
             WHERE f.followee_id = ? AND u.deleted_at IS NULL \
             ORDER BY f.created_at DESC, u.id DESC LIMIT ? OFFSET ?",
        )
        .bind(user)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(executor)
        .await
        .map_err(db_error("Failed to list followers"))
    }

    /// Live accounts `user` follows, newest edge first.
    pub async fn gen_following<'e, E>(executor: E, user: UserId, page: Page) -> AppResult<Vec<EntUser>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, EntUser>(
            "SELECT u.* FROM follows f JOIN users u ON u.id = f.followee_id \
             WHERE f.follower_id = ? AND u.deleted_at IS NULL \
             ORDER BY f.created_at DESC, u.id DESC LIMIT ? OFFSET ?",
        )
        .bind(user)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(executor)
        .await
        .map_err(db_error("Failed to list following"))
    }

    /// Every account on the other end of an edge touching `user`.
    pub async fn gen_neighbours<'e, E>(executor: E, user: UserId) -> AppResult<Vec<UserId>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_scalar(
            "SELECT followee_id FROM follows WHERE follower_id = ? \
             UNION SELECT follower_id FROM follows WHERE followee_id = ?",
        )
        .bind(user)
        .bind(user)
        .fetch_all(executor)
        .await
        .map_err(db_error("Failed to load follow edges"))
    }

    pub async fn delete_all_for<'e, E>(executor: E, user: UserId) -> AppResult<u64>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM follows WHERE follower_id = ? OR followee_id = ?")
            .bind(user)
            .bind(user)
            .execute(executor)
            .await
            .map_err(db_error("Failed to remove follow edges"))?;
        Ok(result.rows_affected())
    }
}
