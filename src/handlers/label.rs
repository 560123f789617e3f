use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::Value;

use super::AffectedRows;
use crate::api::{parse_id, ApiJson, AppState};
use crate::database::models::LabelKind;
use crate::middleware::{ApiResponse, ApiResult};

/// Shared body for category and position requests. Clients send the label
/// name under the kind's own key (`category` / `position`) or as `name`.
/// `exCategory` / `exPosition` are accepted and ignored: the previous name
/// of a rename is read from the stored row.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelRequest {
    pub open_id: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub position: Option<String>,
}

impl LabelRequest {
    pub fn name_for(&self, kind: LabelKind) -> Option<&str> {
        let specific = match kind {
            LabelKind::Category => self.category.as_deref(),
            LabelKind::Position => self.position.as_deref(),
        };
        specific.or(self.name.as_deref())
    }
}

/// POST /api/{category,position}/queryByParams
pub async fn query_by_params(
    kind: LabelKind,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LabelRequest>,
) -> ApiResult<Vec<Value>> {
    let labels = state
        .db
        .labels(kind)
        .list_or_seed(body.open_id.as_deref().unwrap_or_default())
        .await?;
    let data: Vec<Value> = labels.iter().map(|l| l.to_api_value(kind)).collect();
    let message = format!("Found {} {} records", data.len(), kind.table());
    Ok(ApiResponse::success(data, message))
}

/// POST /api/{category,position}/add
pub async fn add(
    kind: LabelKind,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LabelRequest>,
) -> ApiResult<Value> {
    let label = state
        .db
        .labels(kind)
        .create(body.open_id.as_deref(), body.name_for(kind))
        .await?;
    Ok(ApiResponse::created(
        label.to_api_value(kind),
        format!("{} added", kind.display_name()),
    ))
}

/// PUT /api/{category,position}/update/:id
pub async fn update(
    kind: LabelKind,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<LabelRequest>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    let renamed = state
        .db
        .labels(kind)
        .rename(id, body.open_id.as_deref(), body.name_for(kind))
        .await?;

    let mut data = renamed.label.to_api_value(kind);
    data["previousName"] = Value::String(renamed.previous_name);
    data["inventoryUpdated"] = Value::from(renamed.inventory_updated);
    Ok(ApiResponse::success(
        data,
        format!("{} renamed", kind.display_name()),
    ))
}

/// DELETE /api/{category,position}/delete/:id
pub async fn delete(
    kind: LabelKind,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<LabelRequest>,
) -> ApiResult<AffectedRows> {
    let id = parse_id(&id)?;
    let affected = state
        .db
        .labels(kind)
        .delete(id, body.open_id.as_deref())
        .await?;
    Ok(ApiResponse::success(
        AffectedRows::for_id(id, affected),
        format!("{} deleted", kind.display_name()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_key_wins_over_generic_name() {
        let body: LabelRequest = serde_json::from_value(serde_json::json!({
            "openId": "u1",
            "category": "Snacks",
            "exCategory": "Sweets",
            "name": "ignored"
        }))
        .unwrap();
        assert_eq!(body.name_for(LabelKind::Category), Some("Snacks"));
        assert_eq!(body.name_for(LabelKind::Position), Some("ignored"));
    }
}
