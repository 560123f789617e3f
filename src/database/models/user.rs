use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub open_id: String,
    pub nick_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Display name handed to users who have not chosen one
    pub fn generated_nick_name() -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("Member-{}", &suffix[..6])
    }
}
