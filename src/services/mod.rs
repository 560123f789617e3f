pub mod identity;

pub use identity::{IdentityError, IdentityProvider, OpenIdentity, WeChatIdentityProvider};
