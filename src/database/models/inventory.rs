use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::validation::{
    non_blank, parse_date, parse_flag, parse_quantity, require_text, ValidationError,
};
use crate::filter::types::SqlParam;

pub const INVENTORY_COLUMNS: &str = "\"id\", \"open_id\", \"inventory_name\", \"category\", \"position\", \
     \"quantity\", \"date\", \"description\", \"show_index\", \"is_delete\", \"capacity\", \
     \"insert_date\", \"update_date\"";

/// Reported in place of a blank position
pub const UNKNOWN_POSITION: &str = "Unknown position";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Uuid,
    pub open_id: String,
    pub inventory_name: String,
    pub category: String,
    pub position: String,
    pub quantity: f64,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub show_index: i32,
    pub is_delete: i32,
    pub capacity: Option<String>,
    pub insert_date: DateTime<Utc>,
    pub update_date: Option<DateTime<Utc>>,
}

impl InventoryItem {
    pub fn with_display_defaults(mut self) -> Self {
        if self.position.trim().is_empty() {
            self.position = UNKNOWN_POSITION.to_string();
        }
        self
    }
}

/// Inventory fields as sent by clients, used for both create and partial update.
/// Numeric fields arrive as numbers or numeric strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryInput {
    pub open_id: Option<String>,
    pub inventory_name: Option<String>,
    pub category: Option<String>,
    pub position: Option<String>,
    pub quantity: Option<Value>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub show_index: Option<Value>,
    pub is_delete: Option<Value>,
    pub capacity: Option<Value>,
}

/// Validated row ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewInventoryItem {
    pub open_id: String,
    pub inventory_name: String,
    pub category: String,
    pub position: String,
    pub quantity: f64,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub show_index: i32,
    pub capacity: Option<String>,
}

/// Validated partial update: column and new value, in request order
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryChanges {
    pub fields: Vec<(&'static str, SqlParam)>,
}

impl InventoryInput {
    pub fn into_new_item(self) -> Result<NewInventoryItem, ValidationError> {
        let open_id = require_text(self.open_id.as_deref(), "openId")?;
        let inventory_name = require_text(self.inventory_name.as_deref(), "inventoryName")?;
        let category = require_text(self.category.as_deref(), "category")?;
        let position = require_text(self.position.as_deref(), "position")?;
        let date = parse_date(&require_text(self.date.as_deref(), "date")?)?;
        let quantity = parse_quantity(self.quantity.as_ref().unwrap_or(&Value::Null))?;
        let show_index = match self.show_index.as_ref() {
            Some(v) => scalar_flag(v, "showIndex")?.unwrap_or(0),
            None => 0,
        };

        Ok(NewInventoryItem {
            open_id,
            inventory_name,
            category,
            position,
            quantity,
            date,
            description: self.description,
            show_index,
            capacity: self.capacity.as_ref().and_then(scalar_text),
        })
    }

    /// Fields present in the request become SET clauses; blank names are rejected
    pub fn into_changes(self) -> Result<InventoryChanges, ValidationError> {
        let mut fields: Vec<(&'static str, SqlParam)> = vec![];

        if let Some(name) = self.inventory_name.as_deref() {
            fields.push(("inventory_name", require_text(Some(name), "inventoryName")?.into()));
        }
        if let Some(category) = self.category.as_deref() {
            fields.push(("category", require_text(Some(category), "category")?.into()));
        }
        if let Some(position) = self.position.as_deref() {
            fields.push(("position", require_text(Some(position), "position")?.into()));
        }
        if let Some(quantity) = self.quantity.as_ref() {
            fields.push(("quantity", SqlParam::Float(parse_quantity(quantity)?)));
        }
        if let Some(date) = non_blank(self.date.as_deref()) {
            fields.push(("date", SqlParam::Date(parse_date(&date)?)));
        }
        if let Some(description) = self.description {
            fields.push(("description", SqlParam::Text(description)));
        }
        if let Some(flag) = self.show_index.as_ref() {
            if let Some(v) = scalar_flag(flag, "showIndex")? {
                fields.push(("show_index", SqlParam::Int(v)));
            }
        }
        if let Some(flag) = self.is_delete.as_ref() {
            if let Some(v) = scalar_flag(flag, "isDelete")? {
                fields.push(("is_delete", SqlParam::Int(v)));
            }
        }
        if let Some(capacity) = self.capacity.as_ref().and_then(scalar_text) {
            fields.push(("capacity", SqlParam::Text(capacity)));
        }

        if fields.is_empty() {
            return Err(ValidationError::NoChanges);
        }
        Ok(InventoryChanges { fields })
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn scalar_flag(value: &Value, field: &'static str) -> Result<Option<i32>, ValidationError> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(i32::from(*b))),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        other => match scalar_text(other) {
            Some(text) => parse_flag(&text, field).map(Some),
            None => Err(ValidationError::invalid(field, "must be an integer")),
        },
    }
}
