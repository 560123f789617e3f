use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::inventory::INVENTORY_COLUMNS;
use crate::database::models::{InventoryChanges, InventoryItem, NewInventoryItem};
use crate::database::query_builder;
use crate::database::validation::require_open_id;
use crate::database::visibility::Visibility;
use crate::filter::{InventoryFilter, InventoryQuery, SqlParam, SqlResult};

#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Visible items matching the optional filters
    pub async fn list(&self, open_id: Option<&str>, query: InventoryQuery) -> Result<Vec<InventoryItem>, DatabaseError> {
        let open_id = require_open_id(open_id)?;
        let sql = InventoryFilter::new(open_id, query)?.to_sql()?;

        let items: Vec<InventoryItem> = query_builder::select_all(&self.pool, &sql).await?;
        Ok(items
            .into_iter()
            .map(InventoryItem::with_display_defaults)
            .collect())
    }

    pub async fn create(&self, item: NewInventoryItem) -> Result<InventoryItem, DatabaseError> {
        let sql = format!(
            "INSERT INTO \"inventory\" (\"id\", \"open_id\", \"inventory_name\", \"category\", \"position\", \
             \"quantity\", \"date\", \"description\", \"show_index\", \"is_delete\", \"capacity\") \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 0, $10) RETURNING {}",
            INVENTORY_COLUMNS
        );

        let created: InventoryItem = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(&item.open_id)
            .bind(&item.inventory_name)
            .bind(&item.category)
            .bind(&item.position)
            .bind(item.quantity)
            .bind(item.date)
            .bind(&item.description)
            .bind(item.show_index)
            .bind(&item.capacity)
            .fetch_one(&self.pool)
            .await?;

        debug!("Created inventory item {} for {}", created.id, created.open_id);
        Ok(created)
    }

    /// Apply a partial update to a visible item. Returns the affected row count.
    pub async fn update(
        &self,
        id: Uuid,
        open_id: Option<&str>,
        changes: &InventoryChanges,
    ) -> Result<u64, DatabaseError> {
        let open_id = require_open_id(open_id)?;
        let sql = update_sql(id, &open_id, changes);
        let affected = query_builder::execute(&self.pool, &sql).await?;
        DatabaseError::require_affected(affected, "Inventory item")
    }

    pub async fn delete(&self, id: Uuid, open_id: Option<&str>) -> Result<u64, DatabaseError> {
        let open_id = require_open_id(open_id)?;
        let sql = SqlResult {
            query: format!(
                "DELETE FROM \"inventory\" WHERE \"id\" = $1 AND {}",
                Visibility::new().predicate(2)
            ),
            params: vec![SqlParam::Uuid(id), SqlParam::from(open_id)],
        };
        let affected = query_builder::execute(&self.pool, &sql).await?;
        DatabaseError::require_affected(affected, "Inventory item")
    }
}

/// `UPDATE ... SET <changes>, update_date = NOW() WHERE id AND visible`
fn update_sql(id: Uuid, open_id: &str, changes: &InventoryChanges) -> SqlResult {
    let mut params: Vec<SqlParam> = Vec::with_capacity(changes.fields.len() + 2);
    let mut assignments: Vec<String> = Vec::with_capacity(changes.fields.len() + 1);

    for (column, value) in changes.fields.iter() {
        params.push(value.clone());
        assignments.push(format!("\"{}\" = ${}", column, params.len()));
    }
    assignments.push("\"update_date\" = NOW()".to_string());

    params.push(SqlParam::Uuid(id));
    let id_slot = params.len();
    params.push(SqlParam::from(open_id));
    let scope_slot = params.len();

    SqlResult {
        query: format!(
            "UPDATE \"inventory\" SET {} WHERE \"id\" = ${} AND {}",
            assignments.join(", "),
            id_slot,
            Visibility::new().predicate(scope_slot)
        ),
        params,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_binds_changes_then_id_then_scope() {
        let id = Uuid::new_v4();
        let changes = InventoryChanges {
            fields: vec![
                ("quantity", SqlParam::Float(3.0)),
                ("category", SqlParam::from("Snacks")),
            ],
        };
        let sql = update_sql(id, "u1", &changes);

        assert!(sql.query.starts_with(
            "UPDATE \"inventory\" SET \"quantity\" = $1, \"category\" = $2, \"update_date\" = NOW() WHERE \"id\" = $3 AND \"open_id\" IN ("
        ));
        assert_eq!(sql.query.matches("$4").count(), 2);
        assert_eq!(
            sql.params,
            vec![
                SqlParam::Float(3.0),
                SqlParam::from("Snacks"),
                SqlParam::Uuid(id),
                SqlParam::from("u1"),
            ]
        );
    }
}
