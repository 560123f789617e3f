use sqlx::{Postgres, Transaction};
use tracing::error;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::LabelKind;

pub mod home_group;
pub mod inventory;
pub mod label;
pub mod user;

pub use home_group::HomeGroupRepository;
pub use inventory::InventoryRepository;
pub use label::{LabelRename, LabelRepository};
pub use user::UserRepository;

/// Commit on success. On failure roll back and report the original error;
/// a failed rollback is only logged.
pub(crate) async fn finish<T>(
    tx: Transaction<'_, Postgres>,
    result: Result<T, DatabaseError>,
) -> Result<T, DatabaseError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                error!("Rollback failed after '{}': {}", err, rollback_err);
            }
            Err(err)
        }
    }
}

impl DatabaseManager {
    pub fn inventory(&self) -> InventoryRepository {
        InventoryRepository::new(self.pool().clone())
    }

    pub fn labels(&self, kind: LabelKind) -> LabelRepository {
        LabelRepository::new(kind, self.pool().clone())
    }

    pub fn home_groups(&self) -> HomeGroupRepository {
        HomeGroupRepository::new(self.pool().clone())
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool().clone())
    }
}
