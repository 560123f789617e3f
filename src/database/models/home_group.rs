use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One identifier's membership. `group_id` is the owning member's open id,
/// so an owner row has `group_id == open_id`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct HomeGroupMember {
    pub id: Uuid,
    pub group_id: String,
    pub open_id: String,
    pub is_owner: bool,
    pub nick_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl HomeGroupMember {
    pub const COLUMNS: &'static str =
        "\"id\", \"group_id\", \"open_id\", \"is_owner\", \"nick_name\", \"created_at\"";

    pub fn owns_group(&self) -> bool {
        self.is_owner && self.group_id == self.open_id
    }
}
