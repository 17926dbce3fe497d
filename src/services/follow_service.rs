// FollowService - the follow graph
//
// One row per directed edge; both users' cached counts are recomputed from the edge table in
// the same transaction that adds or removes the edge, so the two sides can never disagree.

use std::sync::Arc;
use tracing::{info, instrument};

use crate::core::{Page, UserId};
use crate::entities::{EntFollow, EntUser};
use crate::error::{AppError, AppResult};
use crate::infrastructure::{Clock, Database};
use crate::models::UserSummary;

pub struct FollowService {
    db: Database,
    clock: Arc<dyn Clock>,
}

impl FollowService {
    pub fn new(db: Database, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    #[instrument(skip(self))]
    pub async fn follow(&self, viewer: UserId, target: UserId) -> AppResult<()> {
        if viewer == target {
            return Err(AppError::BadRequest("You cannot follow yourself".to_string()));
        }

        let mut tx = self.db.pool().begin().await?;
        if !EntUser::lock_live(&mut *tx, target).await? {
            return Err(AppError::NotFound(format!("User {} not found", target)));
        }

        let inserted = EntFollow::insert(&mut *tx, viewer, target, self.clock.now_timestamp()).await?;
        if !inserted {
            return Err(AppError::Conflict("Already following this user".to_string()));
        }

        EntUser::refresh_follow_counts(&mut *tx, viewer).await?;
        EntUser::refresh_follow_counts(&mut *tx, target).await?;
        tx.commit().await?;

        info!("User {} now follows {}", viewer, target);
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn unfollow(&self, viewer: UserId, target: UserId) -> AppResult<()> {
        if viewer == target {
            return Err(AppError::BadRequest("You cannot unfollow yourself".to_string()));
        }

        let mut tx = self.db.pool().begin().await?;
        if !EntUser::lock_live(&mut *tx, target).await? {
            return Err(AppError::NotFound(format!("User {} not found", target)));
        }

        let removed = EntFollow::delete(&mut *tx, viewer, target).await?;
        if !removed {
            return Err(AppError::Conflict("You are not following this user".to_string()));
        }

        EntUser::refresh_follow_counts(&mut *tx, viewer).await?;
        EntUser::refresh_follow_counts(&mut *tx, target).await?;
        tx.commit().await?;

        info!("User {} unfollowed {}", viewer, target);
        Ok(())
    }

    pub async fn followers(&self, user: UserId, page: Page) -> AppResult<Vec<UserSummary>> {
        let users = EntFollow::gen_followers(self.db.pool(), user, page).await?;
        Ok(users.into_iter().map(UserSummary::from).collect())
    }

    pub async fn following(&self, user: UserId, page: Page) -> AppResult<Vec<UserSummary>> {
        let users = EntFollow::gen_following(self.db.pool(), user, page).await?;
        Ok(users.into_iter().map(UserSummary::from).collect())
    }
}
