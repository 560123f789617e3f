use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use thiserror::Error;

/// Input rejected before any statement reaches the database
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{field}: {message}")]
    InvalidField { field: &'static str, message: String },

    #[error("No updatable fields supplied")]
    NoChanges,
}

impl ValidationError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ValidationError::InvalidField {
            field,
            message: message.into(),
        }
    }

    /// Field the error refers to, if any
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::MissingField(field) => Some(field),
            ValidationError::InvalidField { field, .. } => Some(field),
            ValidationError::NoChanges => None,
        }
    }
}

/// Trimmed, non-empty string or `MissingField`
pub fn require_text(value: Option<&str>, field: &'static str) -> Result<String, ValidationError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ValidationError::MissingField(field)),
    }
}

/// The caller identifier every write must carry
pub fn require_open_id(open_id: Option<&str>) -> Result<String, ValidationError> {
    require_text(open_id, "openId")
}

/// Trimmed value, or None when absent or blank
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Quantity as sent by clients: a JSON number or a numeric string.
/// Must be finite and non-negative; zero is allowed.
pub fn parse_quantity(value: &Value) -> Result<f64, ValidationError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.trim().is_empty() => s.trim().parse::<f64>().ok(),
        Value::Null => return Err(ValidationError::MissingField("quantity")),
        Value::String(_) => return Err(ValidationError::MissingField("quantity")),
        _ => None,
    };

    match parsed {
        Some(q) if q.is_finite() && q >= 0.0 => Ok(q),
        _ => Err(ValidationError::invalid(
            "quantity",
            "must be a non-negative number",
        )),
    }
}

/// Expiry date as `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` or RFC 3339
pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField("date"));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed).map(|dt| dt.date_naive()))
        .map_err(|_| ValidationError::invalid("date", format!("unrecognized date '{}'", trimmed)))
}

/// Integer flag columns (showIndex, isDelete) accept numbers or numeric strings
pub fn parse_flag(value: &str, field: &'static str) -> Result<i32, ValidationError> {
    value
        .trim()
        .parse::<i32>()
        .map_err(|_| ValidationError::invalid(field, "must be an integer"))
}
