pub mod permission_dto;
pub mod permission_handlers;
pub mod permission_models;
pub mod permission_repository;
pub mod permission_service;
pub mod routes;

pub use permission_models::ACCESSFUNC;
pub use permission_repository::PermissionRepository;
pub use permission_service::PermissionService;
