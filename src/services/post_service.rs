// PostService - post creation

use sqlx::types::Json;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::core::{PostId, UserId};
use crate::entities::{EntPost, EntUser, Media};
use crate::error::{AppError, AppResult};
use crate::infrastructure::{Clock, Database, Geocoder, IdGenerator};
use crate::models::{CreatePostRequest, PostView};
use crate::services::feed_service::FeedService;
use crate::services::gamification::GamificationLevel;

pub const UNKNOWN_CITY: &str = "Unknown city";

/// Coordinates must come as a pair and lie on the globe.
fn validate_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> AppResult<Option<(f64, f64)>> {
    match (latitude, longitude) {
        (None, None) => Ok(None),
        (Some(lat), Some(lon)) => {
            if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
                return Err(AppError::Validation("latitude must be between -90 and 90".to_string()));
            }
            if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
                return Err(AppError::Validation("longitude must be between -180 and 180".to_string()));
            }
            Ok(Some((lat, lon)))
        }
        _ => Err(AppError::Validation(
            "latitude and longitude must be given together".to_string(),
        )),
    }
}

fn validate_multimedia(multimedia: &[Media]) -> AppResult<()> {
    if multimedia.is_empty() {
        return Err(AppError::Validation(
            "multimedia must contain at least one item".to_string(),
        ));
    }
    if multimedia.iter().any(|m| m.url.trim().is_empty()) {
        return Err(AppError::Validation("multimedia url cannot be blank".to_string()));
    }
    Ok(())
}

pub struct PostService {
    db: Database,
    ids: Arc<IdGenerator>,
    clock: Arc<dyn Clock>,
    geocoder: Arc<dyn Geocoder>,
    feed: Arc<FeedService>,
}

impl PostService {
    pub fn new(
        db: Database,
        ids: Arc<IdGenerator>,
        clock: Arc<dyn Clock>,
        geocoder: Arc<dyn Geocoder>,
        feed: Arc<FeedService>,
    ) -> Self {
        Self {
            db,
            ids,
            clock,
            geocoder,
            feed,
        }
    }

    /// Validate, resolve the city, save, and bump the author's gamification level.
    /// A geocoding failure rejects the post before anything is written.
    #[instrument(skip(self, request))]
    pub async fn create_post(&self, viewer: UserId, request: CreatePostRequest) -> AppResult<PostView> {
        validate_multimedia(&request.multimedia)?;
        let coordinates = validate_coordinates(request.latitude, request.longitude)?;

        let city = match coordinates {
            Some((lat, lon)) => {
                let resolved = self.geocoder.reverse(lat, lon).await.map_err(|e| {
                    warn!("Geocoding failed for ({}, {}): {}", lat, lon, e);
                    AppError::BadRequest("Unable to resolve location".to_string())
                })?;
                Some(resolved.unwrap_or_else(|| UNKNOWN_CITY.to_string()))
            }
            None => None,
        };

        let now = self.clock.now_timestamp();
        let post = EntPost {
            id: PostId::new(self.ids.next_id()),
            user_id: viewer,
            description: request
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            multimedia: Json(request.multimedia),
            latitude: coordinates.map(|(lat, _)| lat),
            longitude: coordinates.map(|(_, lon)| lon),
            city,
            likes: 0,
            total_comments: 0,
            last_comment_id: None,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.db.pool().begin().await?;
        if !EntUser::lock_live(&mut *tx, viewer).await? {
            return Err(AppError::Unauthorized("Account no longer exists".to_string()));
        }
        EntPost::insert(&mut *tx, &post).await?;
        let posts = EntPost::count_by_author(&mut *tx, viewer).await?;
        let level = GamificationLevel::for_post_count(posts);
        EntUser::set_gamification_level(&mut *tx, viewer, level.level).await?;
        tx.commit().await?;

        info!(post_id = %post.id, level = level.level, "Post created");
        self.feed.get_post(viewer, post.id).await
    }
}
