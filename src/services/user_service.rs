// UserService - profiles, account lifecycle and per-user metrics

use std::sync::Arc;
use tracing::{info, instrument};

use crate::config::AuthConfig;
use crate::core::{Page, UserId};
use crate::entities::{EntComment, EntFollow, EntPost, EntUser, ProfileChanges, Reaction};
use crate::error::{AppError, AppResult};
use crate::infrastructure::{Clock, Database, PasswordHasher, TokenService};
use crate::models::{AuthResponse, MetricsView, UserSummary, UserView};

pub struct UserService {
    db: Database,
    clock: Arc<dyn Clock>,
    hasher: PasswordHasher,
    tokens: Arc<TokenService>,
    password_min_length: usize,
}

impl UserService {
    pub fn new(
        db: Database,
        clock: Arc<dyn Clock>,
        hasher: PasswordHasher,
        tokens: Arc<TokenService>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            db,
            clock,
            hasher,
            tokens,
            password_min_length: config.password_min_length,
        }
    }

    async fn live_user(&self, id: UserId) -> AppResult<EntUser> {
        EntUser::gen_live(self.db.pool(), id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    pub async fn get_me(&self, viewer: UserId) -> AppResult<UserView> {
        Ok(UserView::private(self.live_user(viewer).await?))
    }

    pub async fn get_user(&self, id: UserId) -> AppResult<UserView> {
        Ok(UserView::public(self.live_user(id).await?))
    }

    #[instrument(skip(self, changes))]
    pub async fn update_profile(&self, viewer: UserId, changes: ProfileChanges) -> AppResult<UserView> {
        if !changes.is_empty() {
            EntUser::update_profile(self.db.pool(), viewer, &changes, self.clock.now_timestamp()).await?;
        }
        self.get_me(viewer).await
    }

    /// Soft delete: tombstone the row, revoke its tokens and drop every follow edge it is part
    /// of, fixing up the counts of the accounts on the other end.
    #[instrument(skip(self))]
    pub async fn delete_account(&self, viewer: UserId) -> AppResult<()> {
        let now = self.clock.now_timestamp();
        let mut tx = self.db.pool().begin().await?;

        if !EntUser::soft_delete(&mut *tx, viewer, now).await? {
            return Err(AppError::NotFound(format!("User {} not found", viewer)));
        }
        let neighbours = EntFollow::gen_neighbours(&mut *tx, viewer).await?;
        EntFollow::delete_all_for(&mut *tx, viewer).await?;
        for neighbour in &neighbours {
            EntUser::refresh_follow_counts(&mut *tx, *neighbour).await?;
        }
        tx.commit().await?;

        info!("User {} deleted, {} follow edges removed", viewer, neighbours.len());
        Ok(())
    }

    pub async fn search(&self, input: Option<&str>, page: Page) -> AppResult<Vec<UserSummary>> {
        let input = input.map(str::trim).unwrap_or_default();
        if input.is_empty() {
            return Ok(Vec::new());
        }
        let users = EntUser::search(self.db.pool(), input, page).await?;
        Ok(users.into_iter().map(UserSummary::from).collect())
    }

    /// Change the password and hand back fresh tokens; every older token stops working.
    #[instrument(skip(self, current_password, new_password))]
    pub async fn change_password(
        &self,
        viewer: UserId,
        current_password: Option<&str>,
        new_password: &str,
    ) -> AppResult<AuthResponse> {
        let user = self.live_user(viewer).await?;
        let hash = match (&user.password_hash, user.is_federated) {
            (Some(hash), false) => hash,
            _ => {
                return Err(AppError::BadRequest(
                    "This account signs in with an external provider".to_string(),
                ))
            }
        };

        let current = current_password.unwrap_or_default();
        if current.is_empty() || !self.hasher.verify(current, hash)? {
            return Err(AppError::Forbidden("Current password is incorrect".to_string()));
        }
        if new_password.chars().count() < self.password_min_length {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                self.password_min_length
            )));
        }

        let new_hash = self.hasher.hash(new_password)?;
        EntUser::set_password(self.db.pool(), viewer, &new_hash, self.clock.now_timestamp()).await?;

        let user = self.live_user(viewer).await?;
        Ok(AuthResponse {
            tokens: self.tokens.issue_pair(user.id, user.token_version)?,
            user: UserView::private(user),
        })
    }

    pub async fn metrics(&self, viewer: UserId) -> AppResult<MetricsView> {
        let pool = self.db.pool();
        let user = self.live_user(viewer).await?;
        let (posts, comments, likes) = futures::try_join!(
            EntPost::count_by_author(pool, viewer),
            EntComment::count_by_author(pool, viewer),
            Reaction::Like.count_received(pool, viewer),
        )?;

        Ok(MetricsView {
            number_of_followers: user.number_of_followers,
            number_of_following: user.number_of_following,
            number_of_posts: posts,
            number_of_comments: comments,
            number_of_likes: likes,
        })
    }

    pub async fn logout(&self, viewer: UserId) -> AppResult<()> {
        EntUser::bump_token_version(self.db.pool(), viewer, self.clock.now_timestamp()).await?;
        info!("User {} logged out everywhere", viewer);
        Ok(())
    }
}
