use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct BirthdayItem {
    pub fullname: String,
    pub birthday: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CompanyJoinedItem {
    pub fullname: String,
    pub company_joined_date: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContractRemindItem {
    pub fullname: String,
    pub contract_expiration_date: String,
}

/// Key names are part of the client contract.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventRemindResponse {
    pub bithday_list: Vec<BirthdayItem>,
    pub company_join_date_list: Vec<CompanyJoinedItem>,
    pub contract_remind_list: Vec<ContractRemindItem>,
}
