pub mod home_group;
pub mod inventory;
pub mod label;
pub mod user;

pub use home_group::HomeGroupMember;
pub use inventory::{InventoryChanges, InventoryInput, InventoryItem, NewInventoryItem};
pub use label::{Label, LabelKind};
pub use user::User;
