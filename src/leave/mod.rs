pub mod calendar;
pub mod leave_dto;
pub mod leave_handlers;
pub mod leave_models;
pub mod leave_repository;
pub mod leave_service;
pub mod routes;

pub use calendar::{HolidayCalendar, LeaveCalendar};
pub use leave_repository::LeaveRepository;
pub use leave_service::LeaveService;
