pub mod organization_dto;
pub mod organization_handlers;
pub mod organization_models;
pub mod organization_repository;
pub mod organization_service;
pub mod routes;

pub use organization_repository::OrganizationRepository;
pub use organization_service::OrganizationService;
