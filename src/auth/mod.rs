pub mod auth_dto;
pub mod auth_handlers;
pub mod auth_service;
pub mod jwt;
pub mod oauth;
pub mod password;
pub mod routes;

pub use auth_service::AuthService;
pub use jwt::{create_access_token, verify_jwt, Claims};
pub use oauth::{create_oauth_client, PendingLogins};
pub use password::{hash_password, verify_password};
