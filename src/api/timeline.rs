use axum::{
    extract::{Query, State},
    Json,
};

use crate::app_state::AppState;
use crate::error::AppResult;
use crate::infrastructure::middleware::Vc;
use crate::models::{FeedItem, TimelineQuery};
use crate::services::TimelineRequest;

/// `GET /timeline?offset&limit&sort&order&scope&withAds`
pub async fn timeline(
    State(state): State<AppState>,
    vc: Vc,
    Query(raw): Query<TimelineQuery>,
) -> AppResult<Json<Vec<FeedItem>>> {
    let request = TimelineRequest::parse(vc.user_id, &raw);
    Ok(Json(state.feed_service.timeline(vc.user_id, request).await?))
}
