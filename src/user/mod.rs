pub mod routes;
pub mod user_dto;
pub mod user_handlers;
pub mod user_models;
pub mod user_repository;

pub use user_repository::{UserRepository, FULL_NAME};
