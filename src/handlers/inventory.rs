use axum::extract::{Path, State};
use serde::Deserialize;

use super::{AffectedRows, OpenIdRequest};
use crate::api::{parse_id, ApiJson, AppState};
use crate::database::models::{InventoryInput, InventoryItem};
use crate::database::validation::require_open_id;
use crate::filter::InventoryQuery;
use crate::middleware::{ApiResponse, ApiResult};

/// POST /api/inventory/queryByParams body: the caller plus optional filters
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySearch {
    pub open_id: Option<String>,
    #[serde(flatten)]
    pub query: InventoryQuery,
}

/// POST /api/inventory/queryByParams
pub async fn query_by_params(
    State(state): State<AppState>,
    ApiJson(search): ApiJson<InventorySearch>,
) -> ApiResult<Vec<InventoryItem>> {
    let items = state
        .db
        .inventory()
        .list(search.open_id.as_deref(), search.query)
        .await?;
    let message = format!("Found {} items", items.len());
    Ok(ApiResponse::success(items, message))
}

/// POST /api/inventory/add
pub async fn add(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<InventoryInput>,
) -> ApiResult<InventoryItem> {
    let item = input.into_new_item()?;
    let created = state.db.inventory().create(item).await?;
    Ok(ApiResponse::created(created, "Inventory item added"))
}

/// PUT /api/inventory/update/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<InventoryInput>,
) -> ApiResult<AffectedRows> {
    let id = parse_id(&id)?;
    let open_id = require_open_id(input.open_id.as_deref())?;
    let changes = input.into_changes()?;

    let affected = state
        .db
        .inventory()
        .update(id, Some(&open_id), &changes)
        .await?;
    Ok(ApiResponse::success(AffectedRows::for_id(id, affected), "Inventory item updated"))
}

/// DELETE /api/inventory/delete/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<OpenIdRequest>,
) -> ApiResult<AffectedRows> {
    let id = parse_id(&id)?;
    let affected = state.db.inventory().delete(id, body.open_id.as_deref()).await?;
    Ok(ApiResponse::success(AffectedRows::for_id(id, affected), "Inventory item deleted"))
}
