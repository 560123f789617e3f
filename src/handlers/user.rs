use axum::extract::State;
use serde::Deserialize;
use tracing::info;

use super::AffectedRows;
use crate::api::{ApiJson, AppState};
use crate::database::models::User;
use crate::database::validation::require_text;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    pub open_id: Option<String>,
    pub nick_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginCodeRequest {
    pub code: Option<String>,
}

/// POST /api/user/queryByParams
pub async fn query_by_params(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UserRequest>,
) -> ApiResult<Vec<User>> {
    let users = state.db.users().list(body.open_id.as_deref()).await?;
    let message = format!("Found {} users", users.len());
    Ok(ApiResponse::success(users, message))
}

/// POST /api/user/add
pub async fn add(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UserRequest>,
) -> ApiResult<User> {
    let user = state
        .db
        .users()
        .create(body.open_id.as_deref(), body.nick_name.as_deref())
        .await?;
    Ok(ApiResponse::created(user, "User added"))
}

/// PUT|POST /api/user/update
pub async fn update(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UserRequest>,
) -> ApiResult<User> {
    let user = state
        .db
        .users()
        .update(body.open_id.as_deref(), body.nick_name.as_deref())
        .await?;
    Ok(ApiResponse::success(user, "User updated"))
}

/// DELETE /api/user/delete
pub async fn delete(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UserRequest>,
) -> ApiResult<AffectedRows> {
    let affected = state.db.users().delete(body.open_id.as_deref()).await?;
    Ok(ApiResponse::success(AffectedRows::count(affected), "User deleted"))
}

/// POST /api/user/getOpenId - trade a login code for the caller's open id,
/// provisioning the user on first sight
pub async fn get_open_id(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginCodeRequest>,
) -> ApiResult<String> {
    let code = require_text(body.code.as_deref(), "code")?;
    let identity = state.identity.exchange_code(&code).await?;

    let user = state.db.users().provision(&identity.open_id).await?;
    info!(
        union_id = identity.union_id.as_deref().unwrap_or("-"),
        "Login exchange succeeded for {}", user.open_id
    );
    Ok(ApiResponse::success(identity.open_id, "Login successful"))
}
