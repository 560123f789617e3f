use axum::extract::State;
use serde::Deserialize;

use super::AffectedRows;
use crate::api::{ApiJson, AppState};
use crate::database::models::HomeGroupMember;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeGroupRequest {
    pub open_id: Option<String>,
    pub inviter_open_id: Option<String>,
    pub member_open_id: Option<String>,
    pub nick_name: Option<String>,
}

/// POST /api/homeGroup/queryByParams
pub async fn query_by_params(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<HomeGroupRequest>,
) -> ApiResult<Vec<HomeGroupMember>> {
    let members = state.db.home_groups().list(body.open_id.as_deref()).await?;
    let message = format!("Found {} members", members.len());
    Ok(ApiResponse::success(members, message))
}

/// POST /api/homeGroup/add
pub async fn add(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<HomeGroupRequest>,
) -> ApiResult<HomeGroupMember> {
    let owner = state
        .db
        .home_groups()
        .create(body.open_id.as_deref(), body.nick_name.as_deref())
        .await?;
    Ok(ApiResponse::created(owner, "Home group created"))
}

/// POST /api/homeGroup/addMember
pub async fn add_member(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<HomeGroupRequest>,
) -> ApiResult<HomeGroupMember> {
    let member = state
        .db
        .home_groups()
        .add_member(
            body.open_id.as_deref(),
            body.inviter_open_id.as_deref(),
            body.nick_name.as_deref(),
        )
        .await?;
    Ok(ApiResponse::created(member, "Joined home group"))
}

/// PUT /api/homeGroup/update
pub async fn update(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<HomeGroupRequest>,
) -> ApiResult<HomeGroupMember> {
    let member = state
        .db
        .home_groups()
        .update(body.open_id.as_deref(), body.nick_name.as_deref())
        .await?;
    Ok(ApiResponse::success(member, "Home group nickname updated"))
}

/// DELETE /api/homeGroup/delete
pub async fn delete(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<HomeGroupRequest>,
) -> ApiResult<AffectedRows> {
    let released = state.db.home_groups().delete(body.open_id.as_deref()).await?;
    Ok(ApiResponse::success(AffectedRows::count(released), "Home group dissolved"))
}

/// DELETE /api/homeGroup/deleteMember
pub async fn delete_member(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<HomeGroupRequest>,
) -> ApiResult<HomeGroupMember> {
    let released = state
        .db
        .home_groups()
        .delete_member(body.open_id.as_deref(), body.member_open_id.as_deref())
        .await?;
    Ok(ApiResponse::success(released, "Left home group"))
}
