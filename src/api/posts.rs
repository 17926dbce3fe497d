// Post endpoints: creation, single post, comments, reactions and the viewer's own lists

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::api::extractors::{parse_id, ValidatedJson};
use crate::app_state::AppState;
use crate::core::{Page, PageQuery, PostId};
use crate::entities::{PostQuery, PostScope};
use crate::error::AppResult;
use crate::infrastructure::middleware::Vc;
use crate::infrastructure::Ad;
use crate::models::{CommentView, CreateCommentRequest, CreatePostRequest, PostView, TimelineQuery};
use crate::services::TimelineRequest;

/// Same paging and sorting rules as the timeline, over a fixed scope.
fn scoped_query(vc: &Vc, raw: &TimelineQuery, scope: PostScope) -> PostQuery {
    PostQuery {
        scope,
        ..TimelineRequest::parse(vc.user_id, raw).query
    }
}

pub async fn create_post(
    State(state): State<AppState>,
    vc: Vc,
    ValidatedJson(req): ValidatedJson<CreatePostRequest>,
) -> AppResult<(StatusCode, Json<PostView>)> {
    let post = state.post_service.create_post(vc.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn my_posts(
    State(state): State<AppState>,
    vc: Vc,
    Query(raw): Query<TimelineQuery>,
) -> AppResult<Json<Vec<PostView>>> {
    let query = scoped_query(&vc, &raw, PostScope::Author(vc.user_id));
    Ok(Json(state.feed_service.get_feed(vc.user_id, query).await?))
}

pub async fn my_bookmarks(
    State(state): State<AppState>,
    vc: Vc,
    Query(raw): Query<TimelineQuery>,
) -> AppResult<Json<Vec<PostView>>> {
    let query = scoped_query(&vc, &raw, PostScope::BookmarkedBy(vc.user_id));
    Ok(Json(state.feed_service.get_feed(vc.user_id, query).await?))
}

pub async fn list_ads(State(state): State<AppState>, _vc: Vc) -> AppResult<Json<Vec<Ad>>> {
    Ok(Json(state.ad_service.monthly_ads().await?))
}

pub async fn get_post(
    State(state): State<AppState>,
    vc: Vc,
    Path(post_id): Path<String>,
) -> AppResult<Json<PostView>> {
    let post_id: PostId = parse_id(&post_id, "postId")?;
    Ok(Json(state.feed_service.get_post(vc.user_id, post_id).await?))
}

pub async fn list_comments(
    State(state): State<AppState>,
    _vc: Vc,
    Path(post_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Vec<CommentView>>> {
    let post_id: PostId = parse_id(&post_id, "postId")?;
    let comments = state
        .engagement_service
        .list_comments(post_id, Page::from(&page))
        .await?;
    Ok(Json(comments))
}

pub async fn add_comment(
    State(state): State<AppState>,
    vc: Vc,
    Path(post_id): Path<String>,
    ValidatedJson(req): ValidatedJson<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<CommentView>)> {
    let post_id: PostId = parse_id(&post_id, "postId")?;
    let comment = state
        .engagement_service
        .add_comment(vc.user_id, post_id, &req.content)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn like(
    State(state): State<AppState>,
    vc: Vc,
    Path(post_id): Path<String>,
) -> AppResult<StatusCode> {
    let post_id: PostId = parse_id(&post_id, "postId")?;
    state.engagement_service.like(vc.user_id, post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unlike(
    State(state): State<AppState>,
    vc: Vc,
    Path(post_id): Path<String>,
) -> AppResult<StatusCode> {
    let post_id: PostId = parse_id(&post_id, "postId")?;
    state.engagement_service.unlike(vc.user_id, post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn bookmark(
    State(state): State<AppState>,
    vc: Vc,
    Path(post_id): Path<String>,
) -> AppResult<StatusCode> {
    let post_id: PostId = parse_id(&post_id, "postId")?;
    state.engagement_service.bookmark(vc.user_id, post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unbookmark(
    State(state): State<AppState>,
    vc: Vc,
    Path(post_id): Path<String>,
) -> AppResult<StatusCode> {
    let post_id: PostId = parse_id(&post_id, "postId")?;
    state.engagement_service.unbookmark(vc.user_id, post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
