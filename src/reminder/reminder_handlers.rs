use super::{
    reminder_dto::{BirthdayItem, CompanyJoinedItem, ContractRemindItem, EventRemindResponse},
    reminder_models::ReminderLists,
};
use crate::{
    common::{dates, JsonResponse},
    error::Result,
    middleware::AuthUser,
    state::AppState,
};
use axum::{extract::State, Json};

impl From<ReminderLists> for EventRemindResponse {
    fn from(lists: ReminderLists) -> Self {
        EventRemindResponse {
            bithday_list: lists
                .birthdays
                .into_iter()
                .map(|e| BirthdayItem {
                    fullname: e.full_name,
                    birthday: dates::database_date(e.birthday),
                })
                .collect(),
            company_join_date_list: lists
                .anniversaries
                .into_iter()
                .map(|e| CompanyJoinedItem {
                    fullname: e.full_name,
                    company_joined_date: dates::database_date(e.company_joined_date),
                })
                .collect(),
            contract_remind_list: lists
                .contracts
                .into_iter()
                .map(|e| ContractRemindItem {
                    fullname: e.full_name,
                    contract_expiration_date: dates::database_date(e.contract_expiration_date),
                })
                .collect(),
        }
    }
}

#[utoipa::path(
    post,
    path = "/notification/event-remind",
    responses((status = 200, description = "Upcoming birthdays, anniversaries and contract expirations", body = EventRemindResponse)),
    tag = "notification",
    security(("bearer_auth" = []))
)]
pub async fn event_remind(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<JsonResponse<EventRemindResponse>>> {
    let lists = state.reminder_service.preview(user.organization_id).await?;

    Ok(Json(JsonResponse::success(
        "Create cron event successfully.",
        EventRemindResponse::from(lists),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminder::reminder_models::ContractEntry;
    use chrono::NaiveDate;

    #[test]
    fn test_response_uses_database_dates() {
        let response = EventRemindResponse::from(ReminderLists {
            contracts: vec![ContractEntry {
                full_name: "Binh".into(),
                contract_expiration_date: NaiveDate::from_ymd_opt(2024, 6, 18).unwrap(),
            }],
            ..Default::default()
        });

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["contract_remind_list"][0]["contract_expiration_date"], "2024-06-18");
        assert_eq!(json["bithday_list"].as_array().map(Vec::len), Some(0));
    }
}
