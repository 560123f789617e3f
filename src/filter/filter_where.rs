use uuid::Uuid;

use super::error::FilterError;
use super::types::{InventoryQuery, SqlParam};
use crate::database::validation::parse_flag;
use crate::database::visibility::Visibility;

/// Accumulates WHERE conditions and their bound parameters.
pub struct FilterWhere {
    param_values: Vec<SqlParam>,
    param_index: usize,
    conditions: Vec<String>,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
            conditions: vec![],
        }
    }

    /// Visibility scope for `open_id`, then every active inventory filter.
    pub fn generate(open_id: &str, query: &InventoryQuery) -> Result<(String, Vec<SqlParam>), FilterError> {
        let mut filter_where = Self::new(0);
        filter_where.scope(open_id);
        filter_where.apply(query)?;
        Ok(filter_where.finish())
    }

    /// Restrict to rows whose owner is visible to `open_id`
    pub fn scope(&mut self, open_id: &str) -> &mut Self {
        let p = self.param_slot(SqlParam::from(open_id));
        self.conditions.push(Visibility::new().predicate(p));
        self
    }

    fn apply(&mut self, query: &InventoryQuery) -> Result<(), FilterError> {
        if let Some(id) = trimmed(&query.id) {
            let id = Uuid::parse_str(id).map_err(|_| FilterError::InvalidValue {
                field: "id",
                message: format!("'{}' is not a valid id", id),
            })?;
            let p = self.param(SqlParam::Uuid(id));
            self.conditions.push(format!("\"id\" = {}", p));
        }

        if let Some(name) = trimmed(&query.inventory_name) {
            let p = self.param(SqlParam::from(name));
            self.conditions.push(format!("\"inventory_name\" ILIKE '%' || {} || '%'", p));
        }

        if let Some(date) = trimmed(&query.date) {
            if date == "0" {
                self.conditions.push("\"date\" < NOW()".to_string());
            } else {
                self.conditions.push("\"date\" >= NOW()".to_string());
            }
        }

        if let Some(flag) = trimmed(&query.is_delete) {
            let value = parse_flag(flag, "isDelete").map_err(invalid("isDelete"))?;
            let p = self.param(SqlParam::Int(value));
            self.conditions.push(format!("\"is_delete\" = {}", p));
        }

        if let Some(flag) = trimmed(&query.show_index) {
            let value = parse_flag(flag, "showIndex").map_err(invalid("showIndex"))?;
            let p = self.param(SqlParam::Int(value));
            self.conditions.push(format!("\"show_index\" = {}", p));
        }

        self.membership("category", query.category.as_deref());
        self.membership("position", query.position.as_deref());

        Ok(())
    }

    /// `column IN (...)` over the non-blank candidates; no clause when none remain
    fn membership(&mut self, column: &str, candidates: Option<&[String]>) {
        let valid: Vec<&str> = candidates
            .unwrap_or_default()
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect();

        if valid.is_empty() {
            return;
        }

        let placeholders: Vec<String> = valid
            .into_iter()
            .map(|c| self.param(SqlParam::from(c)))
            .collect();
        self.conditions
            .push(format!("\"{}\" IN ({})", column, placeholders.join(", ")));
    }

    fn finish(self) -> (String, Vec<SqlParam>) {
        let where_clause = if self.conditions.is_empty() {
            "1=1".to_string()
        } else {
            self.conditions.join(" AND ")
        };
        (where_clause, self.param_values)
    }

    fn param(&mut self, value: SqlParam) -> String {
        format!("${}", self.param_slot(value))
    }

    fn param_slot(&mut self, value: SqlParam) -> usize {
        self.param_values.push(value);
        self.param_index += 1;
        self.param_index
    }
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn invalid(field: &'static str) -> impl Fn(crate::database::validation::ValidationError) -> FilterError {
    move |e| FilterError::InvalidValue {
        field,
        message: e.to_string(),
    }
}
