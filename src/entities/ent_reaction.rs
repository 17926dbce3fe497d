// Likes and bookmarks - (user, post) join rows

use sqlx::{QueryBuilder, Sqlite, SqliteExecutor};
use std::collections::HashSet;

use crate::core::{PostId, Timestamp, UserId};
use crate::error::{db_error, AppResult};

/// A viewer's mark on a post. Both kinds share one table shape keyed by `(user_id, post_id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Like,
    Bookmark,
}

impl Reaction {
    fn table(self) -> &'static str {
        match self {
            Reaction::Like => "likes",
            Reaction::Bookmark => "bookmarks",
        }
    }

    /// Returns true only when a new row was written; a repeat is a no-op.
    pub async fn insert<'e, E>(
        self,
        executor: E,
        user_id: UserId,
        post_id: PostId,
        now: Timestamp,
    ) -> AppResult<bool>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query(&format!(
            "INSERT OR IGNORE INTO {} (user_id, post_id, created_at) VALUES (?, ?, ?)",
            self.table()
        ))
        .bind(user_id)
        .bind(post_id)
        .bind(now)
        .execute(executor)
        .await
        .map_err(db_error("Failed to save reaction"))?;
        Ok(result.rows_affected() == 1)
    }

    /// Returns true only when a row was actually removed.
    pub async fn delete<'e, E>(self, executor: E, user_id: UserId, post_id: PostId) -> AppResult<bool>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE user_id = ? AND post_id = ?",
            self.table()
        ))
        .bind(user_id)
        .bind(post_id)
        .execute(executor)
        .await
        .map_err(db_error("Failed to remove reaction"))?;
        Ok(result.rows_affected() == 1)
    }

    /// The subset of `post_ids` the user has reacted to, in one round trip.
    pub async fn gen_viewer_set<'e, E>(
        self,
        executor: E,
        user_id: UserId,
        post_ids: &[PostId],
    ) -> AppResult<HashSet<PostId>>
    where
        E: SqliteExecutor<'e>,
    {
        if post_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT post_id FROM {} WHERE user_id = ",
            self.table()
        ));
        qb.push_bind(user_id);
        qb.push(" AND post_id IN (");
        let mut separated = qb.separated(",");
        for id in post_ids {
            separated.push_bind(*id);
        }
        qb.push(")");

        let ids: Vec<PostId> = qb
            .build_query_scalar()
            .fetch_all(executor)
            .await
            .map_err(db_error("Failed to load reactions"))?;
        Ok(ids.into_iter().collect())
    }

    /// Reactions left on any post written by `author`.
    pub async fn count_received<'e, E>(self, executor: E, author: UserId) -> AppResult<i64>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {} r JOIN posts p ON p.id = r.post_id WHERE p.user_id = ?",
            self.table()
        ))
        .bind(author)
        .fetch_one(executor)
        .await
        .map_err(db_error("Failed to count reactions"))
    }
}
