// handlers/mod.rs - HTTP handlers, one module per entity
//
// Every handler takes the caller's openId from the JSON body, delegates to a
// repository and wraps the result in the success envelope. Failures convert
// into ApiError and leave through the failure envelope.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod home_group;
pub mod inventory;
pub mod label;
pub mod system;
pub mod user;

/// Body of requests that carry nothing but the caller
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenIdRequest {
    pub open_id: Option<String>,
}

/// Data returned by update/delete operations
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedRows {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub affected_rows: u64,
}

impl AffectedRows {
    pub fn for_id(id: Uuid, affected_rows: u64) -> Self {
        Self {
            id: Some(id),
            affected_rows,
        }
    }

    pub fn count(affected_rows: u64) -> Self {
        Self {
            id: None,
            affected_rows,
        }
    }
}
