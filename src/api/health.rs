use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::app_state::AppState;
use crate::error::AppResult;

pub async fn health(State(state): State<AppState>) -> AppResult<Json<Value>> {
    state.db.health_check().await?;
    Ok(Json(json!({ "status": "ok" })))
}
