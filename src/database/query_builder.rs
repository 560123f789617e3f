use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{FromRow, PgExecutor, Postgres};

use crate::database::manager::DatabaseError;
use crate::filter::types::{SqlParam, SqlResult};

/// Run a generated SELECT and map every row onto `T`
pub async fn select_all<'e, T, E>(executor: E, sql: &SqlResult) -> Result<Vec<T>, DatabaseError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    E: PgExecutor<'e>,
{
    log_statement(sql);
    let mut q = sqlx::query_as::<_, T>(&sql.query);
    for p in sql.params.iter() {
        q = bind_param_query_as(q, p);
    }
    Ok(q.fetch_all(executor).await?)
}

/// Run a generated UPDATE/DELETE and return the affected row count
pub async fn execute<'e, E>(executor: E, sql: &SqlResult) -> Result<u64, DatabaseError>
where
    E: PgExecutor<'e>,
{
    log_statement(sql);
    let mut q = sqlx::query(&sql.query);
    for p in sql.params.iter() {
        q = bind_param_query(q, p);
    }
    Ok(q.execute(executor).await?.rows_affected())
}

fn log_statement(sql: &SqlResult) {
    if crate::config::CONFIG.database.enable_query_logging {
        tracing::debug!(params = sql.params.len(), "SQL: {}", sql.query);
    }
}

pub fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, Postgres, PgArguments>,
    v: &'q SqlParam,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    match v {
        SqlParam::Text(s) => q.bind(s.as_str()),
        SqlParam::Int(i) => q.bind(*i),
        SqlParam::Float(f) => q.bind(*f),
        SqlParam::Bool(b) => q.bind(*b),
        SqlParam::Date(d) => q.bind(*d),
        SqlParam::Uuid(u) => q.bind(*u),
    }
}

pub fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    v: &'q SqlParam,
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        SqlParam::Text(s) => q.bind(s.as_str()),
        SqlParam::Int(i) => q.bind(*i),
        SqlParam::Float(f) => q.bind(*f),
        SqlParam::Bool(b) => q.bind(*b),
        SqlParam::Date(d) => q.bind(*d),
        SqlParam::Uuid(u) => q.bind(*u),
    }
}
