pub mod contract_dto;
pub mod contract_handlers;
pub mod contract_models;
pub mod contract_repository;
pub mod contract_service;
pub mod routes;

pub use contract_repository::ContractRepository;
pub use contract_service::ContractService;
