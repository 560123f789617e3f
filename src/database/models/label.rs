use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use uuid::Uuid;

/// Category and position rows share one shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelKind {
    Category,
    Position,
}

impl LabelKind {
    pub fn table(&self) -> &'static str {
        match self {
            LabelKind::Category => "category",
            LabelKind::Position => "position",
        }
    }

    /// Inventory column holding this label's name
    pub fn inventory_column(&self) -> &'static str {
        match self {
            LabelKind::Category => "category",
            LabelKind::Position => "position",
        }
    }

    /// JSON key clients use for the label name
    pub fn api_key(&self) -> &'static str {
        match self {
            LabelKind::Category => "category",
            LabelKind::Position => "position",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            LabelKind::Category => "Category",
            LabelKind::Position => "Position",
        }
    }

    /// Rows provisioned on an identifier's first empty read
    pub fn defaults(&self) -> &'static [&'static str] {
        match self {
            LabelKind::Category => &["Eye cream", "Customize categories in Settings"],
            LabelKind::Position => &["Living room", "Customize positions in Settings"],
        }
    }

    /// Key for the provisioning lock shared by every member of `group_id`
    pub fn seed_lock_key(&self, group_id: &str) -> String {
        format!("{}:{}", self.table(), group_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub id: Uuid,
    pub open_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Label {
    pub const COLUMNS: &'static str = "\"id\", \"open_id\", \"name\", \"created_at\"";

    /// API shape: the generic `name` plus the kind-specific key clients read
    pub fn to_api_value(&self, kind: LabelKind) -> Value {
        let mut value = json!({
            "id": self.id,
            "openId": self.open_id,
            "name": self.name,
            "createdAt": self.created_at,
        });
        value[kind.api_key()] = json!(self.name);
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_value_carries_kind_key() {
        let label = Label {
            id: Uuid::new_v4(),
            open_id: "u1".to_string(),
            name: "Fridge".to_string(),
            created_at: Utc::now(),
        };
        let v = label.to_api_value(LabelKind::Position);
        assert_eq!(v["position"], "Fridge");
        assert_eq!(v["name"], "Fridge");
        assert_eq!(v["openId"], "u1");
        assert!(v.get("category").is_none());
    }

    #[test]
    fn every_kind_has_defaults() {
        for kind in [LabelKind::Category, LabelKind::Position] {
            assert!(!kind.defaults().is_empty());
            assert!(kind.seed_lock_key("u1").ends_with(":u1"));
        }
    }
}
