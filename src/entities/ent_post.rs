// EntPost - post rows, the feed query and the denormalized counters

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteExecutor};

use crate::core::{CommentId, Page, PostId, SortField, SortOrder, Timestamp, UserId};
use crate::error::{db_error, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

#[derive(Debug, Clone, FromRow)]
pub struct EntPost {
    pub id: PostId,
    pub user_id: UserId,
    pub description: Option<String>,
    pub multimedia: Json<Vec<Media>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city: Option<String>,
    pub likes: i64,
    pub total_comments: i64,
    pub last_comment_id: Option<CommentId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A post joined with the public part of its author.
#[derive(Debug, Clone, FromRow)]
pub struct PostWithAuthor {
    #[sqlx(flatten)]
    pub post: EntPost,
    pub author_nick_name: String,
    pub author_profile_image: Option<String>,
}

/// Which posts a page is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostScope {
    /// Every post by a live author.
    All,
    /// Posts by the accounts the viewer follows, plus the viewer's own.
    Following(UserId),
    Author(UserId),
    BookmarkedBy(UserId),
    Single(PostId),
}

#[derive(Debug, Clone, Copy)]
pub struct PostQuery {
    pub scope: PostScope,
    pub page: Page,
    pub sort: SortField,
    pub order: SortOrder,
}

impl PostQuery {
    pub fn single(id: PostId) -> Self {
        Self {
            scope: PostScope::Single(id),
            page: Page::new(0, 1),
            sort: SortField::default(),
            order: SortOrder::default(),
        }
    }
}

impl EntPost {
    pub async fn insert<'e, E>(executor: E, post: &EntPost) -> AppResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query(
            "INSERT INTO posts (id, user_id, description, multimedia, latitude, longitude, city, \
             likes, total_comments, last_comment_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, 0, 0, NULL, ?, ?)",
        )
        .bind(post.id)
        .bind(post.user_id)
        .bind(post.description.as_deref())
        .bind(&post.multimedia)
        .bind(post.latitude)
        .bind(post.longitude)
        .bind(post.city.as_deref())
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(executor)
        .await
        .map_err(db_error("Failed to create post"))?;
        Ok(())
    }

    pub async fn gen_nullable<'e, E>(executor: E, id: PostId) -> AppResult<Option<Self>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, EntPost>(
            "SELECT p.* FROM posts p JOIN users u ON u.id = p.user_id \
             WHERE p.id = ? AND u.deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(db_error("Failed to load post"))
    }

    /// Opening write of a transaction on a visible post: takes SQLite's write lock before
    /// anything is read, so concurrent writers queue on the busy timeout instead of failing
    /// a lock upgrade. Returns whether the post exists with a live author.
    pub async fn lock_for_update<'e, E>(executor: E, id: PostId) -> AppResult<bool>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE posts SET likes = likes WHERE id = ? \
             AND user_id IN (SELECT id FROM users WHERE deleted_at IS NULL)",
        )
        .bind(id)
        .execute(executor)
        .await
        .map_err(db_error("Failed to lock post"))?;
        Ok(result.rows_affected() == 1)
    }

    /// One page of posts with their authors, in the requested order. Posts whose author has
    /// been deleted never appear. Ties on the sort key break on id in the same direction.
    pub async fn gen_page<'e, E>(executor: E, query: &PostQuery) -> AppResult<Vec<PostWithAuthor>>
    where
        E: SqliteExecutor<'e>,
    {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT p.id, p.user_id, p.description, p.multimedia, p.latitude, p.longitude, p.city, \
             p.likes, p.total_comments, p.last_comment_id, p.created_at, p.updated_at, \
             u.nick_name AS author_nick_name, u.profile_image AS author_profile_image \
             FROM posts p JOIN users u ON u.id = p.user_id",
        );

        if let PostScope::BookmarkedBy(viewer) = query.scope {
            qb.push(" JOIN bookmarks b ON b.post_id = p.id AND b.user_id = ");
            qb.push_bind(viewer);
        }

        qb.push(" WHERE u.deleted_at IS NULL");

        match query.scope {
            PostScope::All | PostScope::BookmarkedBy(_) => {}
            PostScope::Following(viewer) => {
                qb.push(" AND (p.user_id = ");
                qb.push_bind(viewer);
                qb.push(" OR p.user_id IN (SELECT followee_id FROM follows WHERE follower_id = ");
                qb.push_bind(viewer);
                qb.push("))");
            }
            PostScope::Author(author) => {
                qb.push(" AND p.user_id = ");
                qb.push_bind(author);
            }
            PostScope::Single(id) => {
                qb.push(" AND p.id = ");
                qb.push_bind(id);
            }
        }

        let direction = query.order.keyword();
        qb.push(format!(
            " ORDER BY {} {}, p.id {} LIMIT ",
            query.sort.column(),
            direction,
            direction
        ));
        qb.push_bind(query.page.limit);
        qb.push(" OFFSET ");
        qb.push_bind(query.page.offset);

        qb.build_query_as::<PostWithAuthor>()
            .fetch_all(executor)
            .await
            .map_err(db_error("Failed to load posts"))
    }

    pub async fn increment_likes<'e, E>(executor: E, id: PostId, now: Timestamp) -> AppResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query("UPDATE posts SET likes = likes + 1, updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(id)
            .execute(executor)
            .await
            .map_err(db_error("Failed to increment likes"))?;
        Ok(())
    }

    /// Decrement clamped at zero.
    pub async fn decrement_likes<'e, E>(executor: E, id: PostId, now: Timestamp) -> AppResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query("UPDATE posts SET likes = MAX(likes - 1, 0), updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(id)
            .execute(executor)
            .await
            .map_err(db_error("Failed to decrement likes"))?;
        Ok(())
    }

    pub async fn record_comment<'e, E>(
        executor: E,
        id: PostId,
        comment_id: CommentId,
        now: Timestamp,
    ) -> AppResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query(
            "UPDATE posts SET total_comments = total_comments + 1, last_comment_id = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(comment_id)
        .bind(now)
        .bind(id)
        .execute(executor)
        .await
        .map_err(db_error("Failed to update comment counters"))?;
        Ok(())
    }

    pub async fn count_by_author<'e, E>(executor: E, author: UserId) -> AppResult<i64>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE user_id = ?")
            .bind(author)
            .fetch_one(executor)
            .await
            .map_err(db_error("Failed to count posts"))
    }
}
