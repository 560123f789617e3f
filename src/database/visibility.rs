//! Home-group visibility scoping.
//!
//! Every identifier-partitioned table is filtered through the same predicate:
//! a row is visible to caller `U` when its owner is `U` or shares `U`'s home
//! group. The predicate is a SQL fragment bound to a single parameter so it
//! composes into SELECT, UPDATE and DELETE statements alike.

/// Builds the `"open_id" IN (...)` predicate for one caller.
#[derive(Debug, Clone, Copy)]
pub struct Visibility {
    column: &'static str,
}

impl Visibility {
    pub const OWNER_COLUMN: &'static str = "open_id";

    pub fn new() -> Self {
        Self {
            column: Self::OWNER_COLUMN,
        }
    }

    /// Predicate text for a caller bound at placeholder `$param_index`.
    ///
    /// When the caller has no membership row the scalar subquery yields NULL,
    /// no member matches, and the UNION arm still contributes the caller.
    pub fn predicate(&self, param_index: usize) -> String {
        format!(
            "\"{column}\" IN (\
             SELECT member.\"open_id\" FROM \"home_group\" member \
             WHERE member.\"group_id\" = (SELECT own.\"group_id\" FROM \"home_group\" own WHERE own.\"open_id\" = ${p}) \
             UNION SELECT ${p}::TEXT)",
            column = self.column,
            p = param_index
        )
    }

    /// Standalone query listing every identifier visible to the caller at `$1`.
    pub fn visible_identifiers_sql() -> String {
        "SELECT member.\"open_id\" FROM \"home_group\" member \
         WHERE member.\"group_id\" = (SELECT own.\"group_id\" FROM \"home_group\" own WHERE own.\"open_id\" = $1) \
         UNION SELECT $1::TEXT"
            .to_string()
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve the visible identifier set for `open_id`. Never empty: the caller is always included.
pub async fn visible_identifiers<'e, E>(executor: E, open_id: &str) -> Result<Vec<String>, sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    let mut ids: Vec<String> = sqlx::query_scalar(&Visibility::visible_identifiers_sql())
        .bind(open_id)
        .fetch_all(executor)
        .await?;
    ids.sort();
    ids.dedup();
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicate_reuses_a_single_placeholder() {
        let sql = Visibility::new().predicate(3);
        assert!(sql.starts_with("\"open_id\" IN ("));
        assert_eq!(sql.matches("$3").count(), 2);
        assert!(!sql.contains("$1"));
        assert!(sql.contains("UNION SELECT $3::TEXT"));
    }

    #[test]
    fn standalone_query_always_includes_caller() {
        let sql = Visibility::visible_identifiers_sql();
        assert!(sql.ends_with("UNION SELECT $1::TEXT"));
    }
}
