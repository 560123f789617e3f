use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use uuid::Uuid;

/// Optional inventory search filters. Every field is independent; an absent
/// field adds no constraint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryQuery {
    #[serde(default, deserialize_with = "loose_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub inventory_name: Option<String>,
    /// "0" selects expired items, any other value selects items not yet expired
    #[serde(default, deserialize_with = "loose_string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub is_delete: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub show_index: Option<String>,
    #[serde(default, deserialize_with = "loose_list")]
    pub category: Option<Vec<String>>,
    #[serde(default, deserialize_with = "loose_list")]
    pub position: Option<Vec<String>>,
    #[serde(default, deserialize_with = "loose_string")]
    pub sort: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub order: Option<String>,
}

/// Bound statement parameter. Typed so Postgres sees the column's own type.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Int(i32),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Uuid(Uuid),
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Text(value.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        SqlParam::Text(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOrderInfo {
    /// Allow-listed column identifier, never caller text
    pub column: &'static str,
    pub sort: SortDirection,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}

/// Accepts a string, number or boolean; mini-program clients send all three.
fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => scalar_to_string(value)
            .map(Some)
            .ok_or_else(|| D::Error::custom("expected a string or number")),
    }
}

/// Accepts an array of scalars (nulls dropped) or a single scalar.
fn loose_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                if item.is_null() {
                    continue;
                }
                let text = scalar_to_string(item)
                    .ok_or_else(|| D::Error::custom("expected an array of strings"))?;
                out.push(text);
            }
            Ok(Some(out))
        }
        Some(value) => scalar_to_string(value)
            .map(|s| Some(vec![s]))
            .ok_or_else(|| D::Error::custom("expected an array of strings")),
    }
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if b { "1" } else { "0" }.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_and_strings_are_both_accepted() {
        let query: InventoryQuery = serde_json::from_value(json!({
            "date": 0,
            "isDelete": "0",
            "showIndex": 1,
            "category": ["Snacks", null, 7],
            "position": "Kitchen"
        }))
        .unwrap();

        assert_eq!(query.date.as_deref(), Some("0"));
        assert_eq!(query.is_delete.as_deref(), Some("0"));
        assert_eq!(query.show_index.as_deref(), Some("1"));
        assert_eq!(query.category, Some(vec!["Snacks".to_string(), "7".to_string()]));
        assert_eq!(query.position, Some(vec!["Kitchen".to_string()]));
        assert_eq!(query.sort, None);
    }

    #[test]
    fn nested_objects_are_rejected() {
        let result: Result<InventoryQuery, _> =
            serde_json::from_value(json!({ "inventoryName": { "$ilike": "milk" } }));
        assert!(result.is_err());
    }
}
