use std::sync::Arc;

use axum::extract::FromRequest;
use uuid::Uuid;

use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::services::identity::IdentityProvider;

pub mod routes;

pub use routes::app;

/// Shared by every handler. Cloned per request; both fields are cheap handles.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseManager,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(db: DatabaseManager, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { db, identity }
    }
}

/// JSON body extractor whose rejections use the failure envelope
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Record id from the path; malformed ids are a validation error on `id`
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::field_error("id", format!("'{}' is not a valid id", raw)))
}
