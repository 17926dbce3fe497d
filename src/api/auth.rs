// Public authentication endpoints under /auths

use axum::{extract::State, Json};

use crate::api::extractors::ValidatedJson;
use crate::app_state::AppState;
use crate::error::AppResult;
use crate::models::{
    AuthResponse, EmailRequest, LoginRequest, MessageResponse, RefreshRequest, RegisterRequest,
    ResetPasswordRequest, TokenRequest, TokenValidation, VerifyCodeRequest,
};

pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> AppResult<Json<MessageResponse>> {
    Ok(Json(state.auth_service.register(req).await?))
}

pub async fn send_code(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<EmailRequest>,
) -> AppResult<Json<MessageResponse>> {
    Ok(Json(state.auth_service.resend_code(&req.email).await?))
}

pub async fn verify_code(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<VerifyCodeRequest>,
) -> AppResult<Json<AuthResponse>> {
    Ok(Json(
        state
            .auth_service
            .verify_code(&req.email, &req.totp_code)
            .await?,
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    Ok(Json(state.auth_service.login(&req.email, &req.password).await?))
}

pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    Ok(Json(state.auth_service.refresh(&req.refresh_token).await?))
}

pub async fn request_password_reset(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<EmailRequest>,
) -> AppResult<Json<MessageResponse>> {
    Ok(Json(
        state.auth_service.request_password_reset(&req.email).await?,
    ))
}

pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    Ok(Json(
        state
            .auth_service
            .reset_password(&req.token, &req.new_password)
            .await?,
    ))
}

pub async fn validate_token(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<TokenRequest>,
) -> AppResult<Json<TokenValidation>> {
    Ok(Json(state.auth_service.validate_token(&req.token).await?))
}
