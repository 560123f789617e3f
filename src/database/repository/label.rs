use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, info};
use uuid::Uuid;

use super::finish;
use crate::database::manager::DatabaseError;
use crate::database::models::{Label, LabelKind};
use crate::database::validation::{require_open_id, require_text};
use crate::database::visibility::Visibility;

/// Result of a rename: the label after the change and how many inventory rows followed it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelRename {
    pub label: Label,
    pub previous_name: String,
    pub inventory_updated: u64,
}

/// Category and position storage. Both tables share a shape, so one
/// repository serves both, parameterized by `LabelKind`.
#[derive(Clone)]
pub struct LabelRepository {
    kind: LabelKind,
    pool: PgPool,
}

impl LabelRepository {
    pub fn new(kind: LabelKind, pool: PgPool) -> Self {
        Self { kind, pool }
    }

    /// Visible labels, provisioning the defaults when the caller sees none.
    /// Runs under an advisory lock keyed on the caller's home group, so concurrent
    /// first reads from any member seed once.
    pub async fn list_or_seed(&self, open_id: &str) -> Result<Vec<Label>, DatabaseError> {
        let open_id = require_open_id(Some(open_id))?;

        let mut tx = self.pool.begin().await?;
        let result = self.list_or_seed_in(&mut *tx, &open_id).await;
        finish(tx, result).await
    }

    async fn list_or_seed_in(
        &self,
        conn: &mut PgConnection,
        open_id: &str,
    ) -> Result<Vec<Label>, DatabaseError> {
        let group_id: String = sqlx::query_scalar(
            "SELECT COALESCE((SELECT \"group_id\" FROM \"home_group\" WHERE \"open_id\" = $1), $1)",
        )
        .bind(open_id)
        .fetch_one(&mut *conn)
        .await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(self.kind.seed_lock_key(&group_id))
            .execute(&mut *conn)
            .await?;

        let labels = self.visible(&mut *conn, open_id).await?;
        if !labels.is_empty() {
            return Ok(labels);
        }

        for name in self.kind.defaults() {
            self.insert(&mut *conn, open_id, name).await?;
        }
        info!(
            "Seeded {} default {} labels for {}",
            self.kind.defaults().len(),
            self.kind.table(),
            open_id
        );

        self.visible(&mut *conn, open_id).await
    }

    pub async fn create(&self, open_id: Option<&str>, name: Option<&str>) -> Result<Label, DatabaseError> {
        let open_id = require_open_id(open_id)?;
        let name = require_text(name, self.kind.api_key())?;

        let mut conn = self.pool.acquire().await?;
        self.insert(&mut *conn, &open_id, &name).await
    }

    /// Rename a visible label and rewrite every visible inventory row that
    /// referenced the old name. All or nothing.
    pub async fn rename(
        &self,
        id: Uuid,
        open_id: Option<&str>,
        new_name: Option<&str>,
    ) -> Result<LabelRename, DatabaseError> {
        let open_id = require_open_id(open_id)?;
        let new_name = require_text(new_name, self.kind.api_key())?;

        let mut tx = self.pool.begin().await?;
        let result = self.rename_in(&mut *tx, id, &open_id, &new_name).await;
        finish(tx, result).await
    }

    async fn rename_in(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        open_id: &str,
        new_name: &str,
    ) -> Result<LabelRename, DatabaseError> {
        let table = self.kind.table();

        let locked = format!(
            "SELECT {} FROM \"{}\" WHERE \"id\" = $1 AND {} FOR UPDATE",
            Label::COLUMNS,
            table,
            Visibility::new().predicate(2)
        );
        let current: Label = sqlx::query_as(&locked)
            .bind(id)
            .bind(open_id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| self.not_found())?;

        let rename = format!(
            "UPDATE \"{}\" SET \"name\" = $1 WHERE \"id\" = $2 RETURNING {}",
            table,
            Label::COLUMNS
        );
        let label: Label = sqlx::query_as(&rename)
            .bind(new_name)
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;

        let column = self.kind.inventory_column();
        let cascade = format!(
            "UPDATE \"inventory\" SET \"{col}\" = $1, \"update_date\" = NOW() WHERE \"{col}\" = $2 AND {}",
            Visibility::new().predicate(3),
            col = column
        );
        let inventory_updated = sqlx::query(&cascade)
            .bind(new_name)
            .bind(&current.name)
            .bind(open_id)
            .execute(&mut *conn)
            .await?
            .rows_affected();

        debug!(
            "Renamed {} '{}' to '{}' ({} inventory rows)",
            table, current.name, new_name, inventory_updated
        );

        Ok(LabelRename {
            label,
            previous_name: current.name,
            inventory_updated,
        })
    }

    pub async fn delete(&self, id: Uuid, open_id: Option<&str>) -> Result<u64, DatabaseError> {
        let open_id = require_open_id(open_id)?;
        let sql = format!(
            "DELETE FROM \"{}\" WHERE \"id\" = $1 AND {}",
            self.kind.table(),
            Visibility::new().predicate(2)
        );
        let affected = sqlx::query(&sql)
            .bind(id)
            .bind(&open_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        DatabaseError::require_affected(affected, self.kind.display_name())
    }

    async fn visible(&self, conn: &mut PgConnection, open_id: &str) -> Result<Vec<Label>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM \"{}\" WHERE {} ORDER BY \"name\", \"created_at\"",
            Label::COLUMNS,
            self.kind.table(),
            Visibility::new().predicate(1)
        );
        Ok(sqlx::query_as(&sql).bind(open_id).fetch_all(conn).await?)
    }

    async fn insert(&self, conn: &mut PgConnection, open_id: &str, name: &str) -> Result<Label, DatabaseError> {
        let sql = format!(
            "INSERT INTO \"{}\" (\"id\", \"open_id\", \"name\") VALUES ($1, $2, $3) RETURNING {}",
            self.kind.table(),
            Label::COLUMNS
        );
        Ok(sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(open_id)
            .bind(name)
            .fetch_one(conn)
            .await?)
    }

    fn not_found(&self) -> DatabaseError {
        DatabaseError::NotFound(format!(
            "{} not found or not visible to this user",
            self.kind.display_name()
        ))
    }
}
