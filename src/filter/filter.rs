use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterOrderInfo, InventoryQuery, SqlResult};
use crate::database::models::inventory::INVENTORY_COLUMNS;

/// Inventory search: visibility scope, optional filters, allow-listed ordering.
pub struct InventoryFilter {
    open_id: String,
    query: InventoryQuery,
    order_data: Vec<FilterOrderInfo>,
}

impl InventoryFilter {
    pub fn new(open_id: impl Into<String>, query: InventoryQuery) -> Result<Self, FilterError> {
        let order_data = FilterOrder::validate_and_parse(query.sort.as_deref(), query.order.as_deref())?;
        Ok(Self {
            open_id: open_id.into(),
            query,
            order_data,
        })
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = FilterWhere::generate(&self.open_id, &self.query)?;
        let order_clause = FilterOrder::generate(&self.order_data);

        let query = [
            format!("SELECT {}", INVENTORY_COLUMNS),
            "FROM \"inventory\"".to_string(),
            format!("WHERE {}", where_clause),
            order_clause,
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Ok(SqlResult { query, params })
    }
}
