// User endpoints: profile, account lifecycle, search, follow graph and metrics

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::api::extractors::{parse_id, ValidatedJson};
use crate::app_state::AppState;
use crate::core::{Page, PageQuery, UserId};
use crate::error::AppResult;
use crate::infrastructure::middleware::Vc;
use crate::models::{
    AuthResponse, ChangePasswordRequest, MetricsView, SearchQuery, UpdateProfileRequest,
    UserSummary, UserView,
};

pub async fn get_me(State(state): State<AppState>, vc: Vc) -> AppResult<Json<UserView>> {
    Ok(Json(state.user_service.get_me(vc.user_id).await?))
}

pub async fn update_me(
    State(state): State<AppState>,
    vc: Vc,
    ValidatedJson(req): ValidatedJson<UpdateProfileRequest>,
) -> AppResult<Json<UserView>> {
    Ok(Json(
        state
            .user_service
            .update_profile(vc.user_id, req.into())
            .await?,
    ))
}

pub async fn delete_me(State(state): State<AppState>, vc: Vc) -> AppResult<StatusCode> {
    state.user_service.delete_account(vc.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_user(
    State(state): State<AppState>,
    _vc: Vc,
    Path(user_id): Path<String>,
) -> AppResult<Json<UserView>> {
    let user_id: UserId = parse_id(&user_id, "userId")?;
    Ok(Json(state.user_service.get_user(user_id).await?))
}

pub async fn search(
    State(state): State<AppState>,
    _vc: Vc,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<UserSummary>>> {
    let page = Page::from_raw(query.offset.as_deref(), query.limit.as_deref());
    Ok(Json(
        state
            .user_service
            .search(query.input.as_deref(), page)
            .await?,
    ))
}

pub async fn followers(
    State(state): State<AppState>,
    vc: Vc,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Vec<UserSummary>>> {
    Ok(Json(
        state
            .follow_service
            .followers(vc.user_id, Page::from(&page))
            .await?,
    ))
}

pub async fn following(
    State(state): State<AppState>,
    vc: Vc,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Vec<UserSummary>>> {
    Ok(Json(
        state
            .follow_service
            .following(vc.user_id, Page::from(&page))
            .await?,
    ))
}

pub async fn follow(
    State(state): State<AppState>,
    vc: Vc,
    Path(user_id): Path<String>,
) -> AppResult<StatusCode> {
    let target: UserId = parse_id(&user_id, "userId")?;
    state.follow_service.follow(vc.user_id, target).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unfollow(
    State(state): State<AppState>,
    vc: Vc,
    Path(user_id): Path<String>,
) -> AppResult<StatusCode> {
    let target: UserId = parse_id(&user_id, "userId")?;
    state.follow_service.unfollow(vc.user_id, target).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn change_password(
    State(state): State<AppState>,
    vc: Vc,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> AppResult<Json<AuthResponse>> {
    let response = state
        .user_service
        .change_password(vc.user_id, req.current_password.as_deref(), &req.new_password)
        .await?;
    Ok(Json(response))
}

pub async fn metrics(State(state): State<AppState>, vc: Vc) -> AppResult<Json<MetricsView>> {
    Ok(Json(state.user_service.metrics(vc.user_id).await?))
}

pub async fn logout(State(state): State<AppState>, vc: Vc) -> AppResult<StatusCode> {
    state.user_service.logout(vc.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
