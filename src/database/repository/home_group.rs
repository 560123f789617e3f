use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use super::finish;
use crate::database::manager::DatabaseError;
use crate::database::models::HomeGroupMember;
use crate::database::validation::{require_open_id, require_text, ValidationError};
use crate::database::visibility::Visibility;

/// Home group membership. Each identifier has at most one row; a group is
/// identified by its owner's open id.
#[derive(Clone)]
pub struct HomeGroupRepository {
    pool: PgPool,
}

impl HomeGroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Every membership row of the caller's group, owner first
    pub async fn list(&self, open_id: Option<&str>) -> Result<Vec<HomeGroupMember>, DatabaseError> {
        let open_id = require_open_id(open_id)?;
        let sql = format!(
            "SELECT {} FROM \"home_group\" WHERE {} ORDER BY \"is_owner\" DESC, \"created_at\"",
            HomeGroupMember::COLUMNS,
            Visibility::new().predicate(1)
        );
        Ok(sqlx::query_as(&sql).bind(&open_id).fetch_all(&self.pool).await?)
    }

    /// Ensure the caller owns a group and return the owner row
    pub async fn create(
        &self,
        open_id: Option<&str>,
        nick_name: Option<&str>,
    ) -> Result<HomeGroupMember, DatabaseError> {
        let open_id = require_open_id(open_id)?;

        let mut tx = self.pool.begin().await?;
        let result = ensure_owner(&mut *tx, &open_id, nick_name).await;
        finish(tx, result).await
    }

    /// Move the caller into the inviter's group
    pub async fn add_member(
        &self,
        open_id: Option<&str>,
        inviter_open_id: Option<&str>,
        nick_name: Option<&str>,
    ) -> Result<HomeGroupMember, DatabaseError> {
        let open_id = require_open_id(open_id)?;
        let inviter = require_text(inviter_open_id, "inviterOpenId")?;
        if inviter == open_id {
            return Err(ValidationError::invalid("inviterOpenId", "cannot invite yourself").into());
        }

        let mut tx = self.pool.begin().await?;
        let result = add_member_in(&mut *tx, &open_id, &inviter, nick_name).await;
        finish(tx, result).await
    }

    /// Change the caller's nickname in the group listing
    pub async fn update(
        &self,
        open_id: Option<&str>,
        nick_name: Option<&str>,
    ) -> Result<HomeGroupMember, DatabaseError> {
        let open_id = require_open_id(open_id)?;
        let nick_name = require_text(nick_name, "nickName")?;

        let sql = format!(
            "UPDATE \"home_group\" SET \"nick_name\" = $1 WHERE \"open_id\" = $2 RETURNING {}",
            HomeGroupMember::COLUMNS
        );
        sqlx::query_as(&sql)
            .bind(&nick_name)
            .bind(&open_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(not_a_member)
    }

    /// Dissolve the caller's group: every other member returns to a group of their own.
    /// Returns the number of released members.
    pub async fn delete(&self, open_id: Option<&str>) -> Result<u64, DatabaseError> {
        let open_id = require_open_id(open_id)?;
        let mut conn = self.pool.acquire().await?;
        let released = release_members(&mut *conn, &open_id).await?;
        info!("Dissolved home group {} ({} members released)", open_id, released);
        DatabaseError::require_affected(released, "Home group member")
    }

    /// The caller leaves their group, or as owner removes `member_open_id`.
    /// Returns the released member's new row.
    pub async fn delete_member(
        &self,
        open_id: Option<&str>,
        member_open_id: Option<&str>,
    ) -> Result<HomeGroupMember, DatabaseError> {
        let open_id = require_open_id(open_id)?;
        let target = member_open_id
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(&open_id)
            .to_string();

        let mut tx = self.pool.begin().await?;
        let result = delete_member_in(&mut *tx, &open_id, &target).await;
        finish(tx, result).await
    }
}

async fn add_member_in(
    conn: &mut PgConnection,
    open_id: &str,
    inviter: &str,
    nick_name: Option<&str>,
) -> Result<HomeGroupMember, DatabaseError> {
    let inviter_row = ensure_membership(&mut *conn, inviter, None).await?;
    let group_id = inviter_row.group_id;

    let current = membership_for_update(&mut *conn, open_id).await?;
    if let Some(current) = current.as_ref() {
        if current.group_id == group_id {
            return Ok(current.clone());
        }
        if current.owns_group() && member_count(&mut *conn, open_id).await? > 0 {
            return Err(DatabaseError::Conflict(
                "You own a home group with other members; dissolve it before joining another".to_string(),
            ));
        }
    }

    let sql = format!(
        "INSERT INTO \"home_group\" (\"id\", \"group_id\", \"open_id\", \"is_owner\", \"nick_name\") \
         VALUES ($1, $2, $3, FALSE, $4) \
         ON CONFLICT (\"open_id\") DO UPDATE SET \"group_id\" = EXCLUDED.\"group_id\", \"is_owner\" = FALSE, \
         \"nick_name\" = COALESCE(EXCLUDED.\"nick_name\", \"home_group\".\"nick_name\") \
         RETURNING {}",
        HomeGroupMember::COLUMNS
    );
    let row: HomeGroupMember = sqlx::query_as(&sql)
        .bind(Uuid::new_v4())
        .bind(&group_id)
        .bind(open_id)
        .bind(nick_name)
        .fetch_one(&mut *conn)
        .await?;

    info!("{} joined home group {}", open_id, group_id);
    Ok(row)
}

async fn delete_member_in(
    conn: &mut PgConnection,
    open_id: &str,
    target: &str,
) -> Result<HomeGroupMember, DatabaseError> {
    let caller = membership_for_update(&mut *conn, open_id)
        .await?
        .ok_or_else(not_a_member)?;

    if target == open_id {
        if caller.owns_group() {
            return Err(DatabaseError::Conflict(
                "The owner cannot leave their own home group; dissolve it instead".to_string(),
            ));
        }
        return release(&mut *conn, open_id).await;
    }

    let member = membership_for_update(&mut *conn, target).await?;
    match member {
        Some(member) if caller.owns_group() && member.group_id == caller.open_id => {
            release(&mut *conn, target).await
        }
        _ => Err(DatabaseError::NotFound(
            "Member not found in your home group".to_string(),
        )),
    }
}

/// Membership row for `open_id`, inserting a group of one when missing
pub(crate) async fn ensure_membership(
    conn: &mut PgConnection,
    open_id: &str,
    nick_name: Option<&str>,
) -> Result<HomeGroupMember, DatabaseError> {
    sqlx::query(
        "INSERT INTO \"home_group\" (\"id\", \"group_id\", \"open_id\", \"is_owner\", \"nick_name\") \
         VALUES ($1, $2, $2, TRUE, $3) ON CONFLICT (\"open_id\") DO NOTHING",
    )
    .bind(Uuid::new_v4())
    .bind(open_id)
    .bind(nick_name)
    .execute(&mut *conn)
    .await?;

    let sql = format!(
        "SELECT {} FROM \"home_group\" WHERE \"open_id\" = $1",
        HomeGroupMember::COLUMNS
    );
    Ok(sqlx::query_as(&sql).bind(open_id).fetch_one(&mut *conn).await?)
}

/// Like `ensure_membership`, but the caller must be the owner of the group
pub(crate) async fn ensure_owner(
    conn: &mut PgConnection,
    open_id: &str,
    nick_name: Option<&str>,
) -> Result<HomeGroupMember, DatabaseError> {
    let row = ensure_membership(conn, open_id, nick_name).await?;
    if !row.owns_group() {
        return Err(DatabaseError::Conflict(
            "Already a member of another home group".to_string(),
        ));
    }
    Ok(row)
}

/// Return every other member of `owner`'s group to a group of their own
pub(crate) async fn release_members(conn: &mut PgConnection, owner: &str) -> Result<u64, DatabaseError> {
    let affected = sqlx::query(
        "UPDATE \"home_group\" SET \"group_id\" = \"open_id\", \"is_owner\" = TRUE \
         WHERE \"group_id\" = $1 AND \"open_id\" <> $1",
    )
    .bind(owner)
    .execute(conn)
    .await?
    .rows_affected();
    Ok(affected)
}

async fn release(conn: &mut PgConnection, open_id: &str) -> Result<HomeGroupMember, DatabaseError> {
    let sql = format!(
        "UPDATE \"home_group\" SET \"group_id\" = \"open_id\", \"is_owner\" = TRUE \
         WHERE \"open_id\" = $1 RETURNING {}",
        HomeGroupMember::COLUMNS
    );
    let row: HomeGroupMember = sqlx::query_as(&sql).bind(open_id).fetch_one(conn).await?;
    info!("{} left their home group", open_id);
    Ok(row)
}

async fn membership_for_update(
    conn: &mut PgConnection,
    open_id: &str,
) -> Result<Option<HomeGroupMember>, DatabaseError> {
    let sql = format!(
        "SELECT {} FROM \"home_group\" WHERE \"open_id\" = $1 FOR UPDATE",
        HomeGroupMember::COLUMNS
    );
    Ok(sqlx::query_as(&sql).bind(open_id).fetch_optional(conn).await?)
}

async fn member_count(conn: &mut PgConnection, owner: &str) -> Result<i64, DatabaseError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM \"home_group\" WHERE \"group_id\" = $1 AND \"open_id\" <> $1",
    )
    .bind(owner)
    .fetch_one(conn)
    .await?;
    Ok(count)
}

fn not_a_member() -> DatabaseError {
    DatabaseError::NotFound("Not a member of any home group".to_string())
}
