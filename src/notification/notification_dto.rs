use crate::common::{labels::LabelMap, Pagination};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

pub const DEFAULT_CURRENT_PAGE: i64 = 1;
pub const DEFAULT_ROW_PER_PAGE: i64 = 8;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EditStatusReadRequest {
    #[validate(range(min = 1))]
    pub receiver: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EditNotificationStatusRequest {
    #[validate(range(min = 1))]
    pub id: i32,
    #[validate(range(min = 1, max = 3))]
    pub status: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GetNotificationsRequest {
    #[validate(range(min = 1))]
    pub receiver: i32,
    #[validate(range(min = 1))]
    pub current_page: Option<i64>,
    #[validate(range(min = 1))]
    pub row_per_page: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GetTotalUnreadRequest {
    #[validate(range(min = 1))]
    pub receiver: i32,
    #[validate(length(min = 1))]
    pub client_time: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NotificationIdRequest {
    #[validate(range(min = 1))]
    pub id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationItem {
    pub id: i32,
    pub sender: String,
    pub content: String,
    pub status: i32,
    pub redirect_url: String,
    pub created_at: String,
    pub avatar_sender: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationsResponse {
    pub pagination: Pagination,
    #[schema(value_type = Object)]
    pub notification_status_map: LabelMap,
    pub notifications: Vec<NotificationItem>,
    pub smallest_day: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TotalUnreadResponse {
    pub total: i64,
}
