pub mod auth;
pub mod json;

pub use auth::{auth_middleware, require_general_manager, AuthUser, CurrentUser};
pub use json::ValidJson;
