// EngagementService - comments, likes and bookmarks, and the post counters they drive
//
// Every mutation runs in one transaction: the join row (or comment) and the counter on the
// post change together or not at all. Each transaction opens by locking the post row. Likes and bookmarks are idempotent; the counter only
// moves when a row was actually inserted or removed.

use std::sync::Arc;
use tracing::{debug, instrument};

use crate::core::{CommentId, Page, PostId, UserId};
use crate::entities::{CommentWithAuthor, EntComment, EntPost, EntUser, Reaction};
use crate::error::{AppError, AppResult};
use crate::infrastructure::{Clock, Database, IdGenerator};
use crate::models::CommentView;

pub struct EngagementService {
    db: Database,
    ids: Arc<IdGenerator>,
    clock: Arc<dyn Clock>,
}

fn post_not_found(post_id: PostId) -> AppError {
    AppError::NotFound(format!("Post {} not found", post_id))
}

impl EngagementService {
    pub fn new(db: Database, ids: Arc<IdGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self { db, ids, clock }
    }

    #[instrument(skip(self, content))]
    pub async fn add_comment(
        &self,
        viewer: UserId,
        post_id: PostId,
        content: &str,
    ) -> AppResult<CommentView> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::Validation("Comment cannot be empty".to_string()));
        }

        let now = self.clock.now_timestamp();
        let mut tx = self.db.pool().begin().await?;

        if !EntPost::lock_for_update(&mut *tx, post_id).await? {
            return Err(post_not_found(post_id));
        }
        let author = EntUser::gen_live(&mut *tx, viewer)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))?;

        let comment = EntComment {
            id: CommentId::new(self.ids.next_id()),
            user_id: viewer,
            post_id,
            comment: content.to_string(),
            created_at: now,
            updated_at: now,
        };
        EntComment::insert(&mut *tx, &comment).await?;
        EntPost::record_comment(&mut *tx, post_id, comment.id, now).await?;
        tx.commit().await?;

        debug!(comment_id = %comment.id, "Comment added");
        Ok(CommentView::from(CommentWithAuthor {
            comment,
            author_nick_name: author.nick_name,
            author_profile_image: author.profile_image,
        }))
    }

    pub async fn list_comments(&self, post_id: PostId, page: Page) -> AppResult<Vec<CommentView>> {
        let pool = self.db.pool();
        if EntPost::gen_nullable(pool, post_id).await?.is_none() {
            return Err(post_not_found(post_id));
        }

        Ok(EntComment::gen_page_for_post(pool, post_id, page)
            .await?
            .into_iter()
            .map(CommentView::from)
            .collect())
    }

    /// Returns whether a new like was recorded.
    #[instrument(skip(self))]
    pub async fn like(&self, viewer: UserId, post_id: PostId) -> AppResult<bool> {
        let now = self.clock.now_timestamp();
        let mut tx = self.db.pool().begin().await?;
        if !EntPost::lock_for_update(&mut *tx, post_id).await? {
            return Err(post_not_found(post_id));
        }

        let inserted = Reaction::Like.insert(&mut *tx, viewer, post_id, now).await?;
        if inserted {
            EntPost::increment_likes(&mut *tx, post_id, now).await?;
        }
        tx.commit().await?;
        Ok(inserted)
    }

    /// Unliking a post that was never liked changes nothing.
    #[instrument(skip(self))]
    pub async fn unlike(&self, viewer: UserId, post_id: PostId) -> AppResult<bool> {
        let now = self.clock.now_timestamp();
        let mut tx = self.db.pool().begin().await?;
        if !EntPost::lock_for_update(&mut *tx, post_id).await? {
            return Err(post_not_found(post_id));
        }

        let removed = Reaction::Like.delete(&mut *tx, viewer, post_id).await?;
        if removed {
            EntPost::decrement_likes(&mut *tx, post_id, now).await?;
        }
        tx.commit().await?;
        Ok(removed)
    }

    #[instrument(skip(self))]
    pub async fn bookmark(&self, viewer: UserId, post_id: PostId) -> AppResult<bool> {
        let pool = self.db.pool();
        if EntPost::gen_nullable(pool, post_id).await?.is_none() {
            return Err(post_not_found(post_id));
        }
        Reaction::Bookmark
            .insert(pool, viewer, post_id, self.clock.now_timestamp())
            .await
    }

    #[instrument(skip(self))]
    pub async fn unbookmark(&self, viewer: UserId, post_id: PostId) -> AppResult<bool> {
        let pool = self.db.pool();
        if EntPost::gen_nullable(pool, post_id).await?.is_none() {
            return Err(post_not_found(post_id));
        }
        Reaction::Bookmark.delete(pool, viewer, post_id).await
    }
}
