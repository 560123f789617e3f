use sqlx::{PgConnection, PgPool};
use tracing::info;

use super::finish;
use super::home_group::{ensure_membership, release_members};
use crate::database::manager::DatabaseError;
use crate::database::models::User;
use crate::database::validation::{non_blank, require_open_id, require_text};

const USER_COLUMNS: &str = "\"open_id\", \"nick_name\", \"created_at\", \"updated_at\"";

/// Users are strictly self-scoped: no group visibility applies here.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The caller's own row, if it exists
    pub async fn list(&self, open_id: Option<&str>) -> Result<Vec<User>, DatabaseError> {
        let open_id = require_open_id(open_id)?;
        let sql = format!("SELECT {} FROM \"users\" WHERE \"open_id\" = $1", USER_COLUMNS);
        Ok(sqlx::query_as(&sql).bind(&open_id).fetch_all(&self.pool).await?)
    }

    /// Register a user together with their group of one
    pub async fn create(&self, open_id: Option<&str>, nick_name: Option<&str>) -> Result<User, DatabaseError> {
        let open_id = require_open_id(open_id)?;
        let nick_name = non_blank(nick_name).unwrap_or_else(User::generated_nick_name);

        let mut tx = self.pool.begin().await?;
        let result = create_in(&mut *tx, &open_id, &nick_name).await;
        finish(tx, result).await
    }

    /// First sight of an identifier from the login exchange: create it if missing
    pub async fn provision(&self, open_id: &str) -> Result<User, DatabaseError> {
        let open_id = require_open_id(Some(open_id))?;

        let mut tx = self.pool.begin().await?;
        let result = provision_in(&mut *tx, &open_id).await;
        finish(tx, result).await
    }

    /// Change the caller's display name, mirrored into their group listing
    pub async fn update(&self, open_id: Option<&str>, nick_name: Option<&str>) -> Result<User, DatabaseError> {
        let open_id = require_open_id(open_id)?;
        let nick_name = require_text(nick_name, "nickName")?;

        let mut tx = self.pool.begin().await?;
        let result = update_in(&mut *tx, &open_id, &nick_name).await;
        finish(tx, result).await
    }

    /// Self-delete: releases any members of the caller's group and removes the membership row
    pub async fn delete(&self, open_id: Option<&str>) -> Result<u64, DatabaseError> {
        let open_id = require_open_id(open_id)?;

        let mut tx = self.pool.begin().await?;
        let result = delete_in(&mut *tx, &open_id).await;
        finish(tx, result).await
    }
}

async fn insert(conn: &mut PgConnection, open_id: &str, nick_name: &str) -> Result<Option<User>, DatabaseError> {
    let sql = format!(
        "INSERT INTO \"users\" (\"open_id\", \"nick_name\") VALUES ($1, $2) \
         ON CONFLICT (\"open_id\") DO NOTHING RETURNING {}",
        USER_COLUMNS
    );
    Ok(sqlx::query_as(&sql)
        .bind(open_id)
        .bind(nick_name)
        .fetch_optional(conn)
        .await?)
}

async fn create_in(conn: &mut PgConnection, open_id: &str, nick_name: &str) -> Result<User, DatabaseError> {
    let user = insert(&mut *conn, open_id, nick_name)
        .await?
        .ok_or_else(|| DatabaseError::Conflict(format!("User {} already exists", open_id)))?;
    ensure_membership(&mut *conn, open_id, Some(nick_name)).await?;
    Ok(user)
}

async fn provision_in(conn: &mut PgConnection, open_id: &str) -> Result<User, DatabaseError> {
    let nick_name = User::generated_nick_name();
    let user = match insert(&mut *conn, open_id, &nick_name).await? {
        Some(user) => {
            info!("Provisioned user {}", open_id);
            user
        }
        None => {
            let sql = format!("SELECT {} FROM \"users\" WHERE \"open_id\" = $1", USER_COLUMNS);
            sqlx::query_as(&sql).bind(open_id).fetch_one(&mut *conn).await?
        }
    };
    ensure_membership(&mut *conn, open_id, Some(user.nick_name.as_str())).await?;
    Ok(user)
}

async fn update_in(conn: &mut PgConnection, open_id: &str, nick_name: &str) -> Result<User, DatabaseError> {
    let sql = format!(
        "UPDATE \"users\" SET \"nick_name\" = $1, \"updated_at\" = NOW() WHERE \"open_id\" = $2 RETURNING {}",
        USER_COLUMNS
    );
    let user: User = sqlx::query_as(&sql)
        .bind(nick_name)
        .bind(open_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("User {} not found", open_id)))?;

    sqlx::query("UPDATE \"home_group\" SET \"nick_name\" = $1 WHERE \"open_id\" = $2")
        .bind(nick_name)
        .bind(open_id)
        .execute(&mut *conn)
        .await?;
    Ok(user)
}

async fn delete_in(conn: &mut PgConnection, open_id: &str) -> Result<u64, DatabaseError> {
    let released = release_members(&mut *conn, open_id).await?;
    sqlx::query("DELETE FROM \"home_group\" WHERE \"open_id\" = $1")
        .bind(open_id)
        .execute(&mut *conn)
        .await?;
    let affected = sqlx::query("DELETE FROM \"users\" WHERE \"open_id\" = $1")
        .bind(open_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    let affected = DatabaseError::require_affected(affected, "User")?;
    info!("Deleted user {} ({} group members released)", open_id, released);
    Ok(affected)
}
