// EntComment - comment rows

use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteExecutor};

use crate::core::{CommentId, Page, PostId, Timestamp, UserId};
use crate::error::{db_error, AppResult};

#[derive(Debug, Clone, FromRow)]
pub struct EntComment {
    pub id: CommentId,
    pub user_id: UserId,
    pub post_id: PostId,
    pub comment: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, FromRow)]
pub struct CommentWithAuthor {
    #[sqlx(flatten)]
    pub comment: EntComment,
    pub author_nick_name: String,
    pub author_profile_image: Option<String>,
}

const WITH_AUTHOR: &str = "SELECT c.id, c.user_id, c.post_id, c.comment, c.created_at, c.updated_at, \
     u.nick_name AS author_nick_name, u.profile_image AS author_profile_image \
     FROM comments c JOIN users u ON u.id = c.user_id";

impl EntComment {
    pub async fn insert<'e, E>(executor: E, comment: &EntComment) -> AppResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query(
            "INSERT INTO comments (id, user_id, post_id, comment, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(comment.id)
        .bind(comment.user_id)
        .bind(comment.post_id)
        .bind(&comment.comment)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .execute(executor)
        .await
        .map_err(db_error("Failed to create comment"))?;
        Ok(())
    }

    /// Comments by live authors among `ids`, in no particular order.
    pub async fn gen_multi_with_author<'e, E>(
        executor: E,
        ids: &[CommentId],
    ) -> AppResult<Vec<CommentWithAuthor>>
    where
        E: SqliteExecutor<'e>,
    {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Sqlite>::new(WITH_AUTHOR);
        qb.push(" WHERE u.deleted_at IS NULL AND c.id IN (");
        let mut separated = qb.separated(",");
        for id in ids {
            separated.push_bind(*id);
        }
        qb.push(")");

        qb.build_query_as::<CommentWithAuthor>()
            .fetch_all(executor)
            .await
            .map_err(db_error("Failed to load comments"))
    }

    /// Newest first. Comments by deleted users are left out.
    pub async fn gen_page_for_post<'e, E>(
        executor: E,
        post_id: PostId,
        page: Page,
    ) -> AppResult<Vec<CommentWithAuthor>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, CommentWithAuthor>(&format!(
            "{} WHERE c.post_id = ? AND u.deleted_at IS NULL \
             ORDER BY c.created_at DESC, c.id DESC LIMIT ? OFFSET ?",
            WITH_AUTHOR
        ))
        .bind(post_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(executor)
        .await
        .map_err(db_error("Failed to list comments"))
    }

    pub async fn count_by_author<'e, E>(executor: E, author: UserId) -> AppResult<i64>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE user_id = ?")
            .bind(author)
            .fetch_one(executor)
            .await
            .map_err(db_error("Failed to count comments"))
    }
}
