use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct FindOrganizationRequest {
    #[serde(default)]
    pub tag_organization: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CheckOrganizationRequest {
    #[validate(length(min = 1, max = 50))]
    pub organization_tag: String,
    #[validate(length(min = 1, max = 255))]
    pub organization_name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RequestRegistrationRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterOrganizationRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub code: String,
    #[validate(length(min = 1, max = 255))]
    pub first_name: String,
    #[validate(length(min = 1, max = 255))]
    pub last_name: String,
    #[validate(length(min = 6))]
    pub password: String,
    #[validate(length(min = 1, max = 50))]
    pub organization_tag: String,
    #[validate(length(min = 1, max = 255))]
    pub organization_name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct InviteUserRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterInviteLinkRequest {
    #[validate(range(min = 1))]
    pub request_id: i32,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub code: String,
    #[validate(length(min = 1, max = 255))]
    pub first_name: String,
    #[validate(length(min = 1, max = 255))]
    pub last_name: String,
    #[validate(length(min = 6))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EditOrganizationEmailRequest {
    #[validate(email)]
    pub email_test: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EditExpirationResetDayOffRequest {
    #[validate(range(min = 0, max = 120))]
    pub expiration: i32,
}
