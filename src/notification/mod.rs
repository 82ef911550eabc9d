pub mod dispatch;
pub mod fcm_repository;
pub mod notification_dto;
pub mod notification_handlers;
pub mod notification_models;
pub mod notification_repository;
pub mod push;
pub mod routes;

pub use dispatch::{ImmediateDelivery, ImmediateMail, NotificationDispatcher};
pub use fcm_repository::FcmTokenRepository;
pub use notification_repository::NotificationRepository;
pub use push::FcmClient;
