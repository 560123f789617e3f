pub mod manager;
pub mod models;
pub mod query_builder;
pub mod repository;
pub mod validation;
pub mod visibility;

pub use manager::{DatabaseError, DatabaseManager};
pub use validation::ValidationError;
