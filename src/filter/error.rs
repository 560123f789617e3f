use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Unknown sort field: {0}")]
    InvalidSortField(String),

    #[error("Invalid sort direction: {0} (expected ASC or DESC)")]
    InvalidSortDirection(String),

    #[error("Invalid filter value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },
}

impl FilterError {
    /// API field the error refers to
    pub fn field(&self) -> &'static str {
        match self {
            FilterError::InvalidSortField(_) => "sort",
            FilterError::InvalidSortDirection(_) => "order",
            FilterError::InvalidValue { field, .. } => field,
        }
    }
}
