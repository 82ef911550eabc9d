pub mod asset_dto;
pub mod asset_handlers;
pub mod asset_models;
pub mod asset_repository;
pub mod asset_service;
pub mod lending;
pub mod routes;

pub use asset_repository::AssetRepository;
pub use asset_service::AssetService;
