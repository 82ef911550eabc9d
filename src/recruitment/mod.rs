pub mod recruitment_dto;
pub mod recruitment_handlers;
pub mod recruitment_models;
pub mod recruitment_repository;
pub mod recruitment_service;
pub mod routes;

pub use recruitment_repository::RecruitmentRepository;
pub use recruitment_service::RecruitmentService;
