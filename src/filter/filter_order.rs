use super::error::FilterError;
use super::types::{FilterOrderInfo, SortDirection};

pub struct FilterOrder;

/// Sortable inventory fields: API name (camelCase or snake_case) to column
const SORTABLE: &[(&str, &str)] = &[
    ("id", "id"),
    ("inventoryName", "inventory_name"),
    ("inventory_name", "inventory_name"),
    ("category", "category"),
    ("position", "position"),
    ("quantity", "quantity"),
    ("date", "date"),
    ("showIndex", "show_index"),
    ("show_index", "show_index"),
    ("isDelete", "is_delete"),
    ("is_delete", "is_delete"),
    ("capacity", "capacity"),
    ("insertDate", "insert_date"),
    ("insert_date", "insert_date"),
    ("updateDate", "update_date"),
    ("update_date", "update_date"),
];

impl FilterOrder {
    /// Validate `sort`/`order` against the allow-list. A blank or absent sort means no ordering.
    pub fn validate_and_parse(
        sort: Option<&str>,
        order: Option<&str>,
    ) -> Result<Vec<FilterOrderInfo>, FilterError> {
        let sort = match sort.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => s,
            None => return Ok(vec![]),
        };

        let column = Self::column_for(sort)
            .ok_or_else(|| FilterError::InvalidSortField(sort.to_string()))?;

        let direction = match order.map(str::trim).filter(|o| !o.is_empty()) {
            None => SortDirection::Asc,
            Some(o) if o.eq_ignore_ascii_case("asc") => SortDirection::Asc,
            Some(o) if o.eq_ignore_ascii_case("desc") => SortDirection::Desc,
            Some(other) => return Err(FilterError::InvalidSortDirection(other.to_string())),
        };

        Ok(vec![FilterOrderInfo {
            column,
            sort: direction,
        }])
    }

    pub fn column_for(field: &str) -> Option<&'static str> {
        SORTABLE
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, column)| *column)
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        if infos.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("\"{}\" {}", i.column, i.sort.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}
