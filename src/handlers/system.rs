use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::api::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(3);

/// GET / - service information
pub async fn root() -> ApiResult<Value> {
    let data = json!({
        "name": "Home Inventory API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": env!("CARGO_PKG_DESCRIPTION"),
        "endpoints": {
            "inventory": "/api/inventory/{queryByParams,add,update/:id,delete/:id}",
            "category": "/api/category/{queryByParams,add,update/:id,delete/:id}",
            "position": "/api/position/{queryByParams,add,update/:id,delete/:id}",
            "homeGroup": "/api/homeGroup/{queryByParams,add,addMember,update,delete,deleteMember}",
            "user": "/api/user/{queryByParams,add,update,delete,getOpenId}",
            "health": "/health"
        }
    });
    Ok(ApiResponse::success(data, "ok"))
}

/// GET /health - database ping; 503 while the database is unreachable
pub async fn health(State(state): State<AppState>) -> axum::response::Response {
    let failure = match tokio::time::timeout(HEALTH_CHECK_TIMEOUT, state.db.health_check()).await {
        Ok(Ok(())) => {
            return ApiResponse::success(json!({ "status": "ok", "database": "ok" }), "ok").into_response()
        }
        Ok(Err(e)) => e.to_string(),
        Err(_) => format!("no response within {:?}", HEALTH_CHECK_TIMEOUT),
    };

    tracing::warn!("Health check failed: {}", failure);
    let mut body = ApiError::service_unavailable("database unavailable").to_json();
    body["data"] = json!({ "status": "degraded", "database": "unavailable" });
    (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
}
