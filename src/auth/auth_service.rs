use super::{create_access_token, jwt::TokenSubject, oauth::GoogleUserInfo, verify_password};
use crate::{
    error::{AppError, Result},
    organization::{organization_models::normalize_tag, OrganizationRepository},
    user::{user_models::User, UserRepository},
};

pub const LOGIN_FAILED: &str = "Email or password is incorrect";
pub const ACCOUNT_NOT_REGISTERED: &str = "Your account is not registered";

#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    organizations: OrganizationRepository,
    jwt_secret: String,
    jwt_expiration_hours: i64,
}

impl AuthService {
    pub fn new(
        users: UserRepository,
        organizations: OrganizationRepository,
        jwt_secret: String,
        jwt_expiration_hours: i64,
    ) -> Self {
        Self {
            users,
            organizations,
            jwt_secret,
            jwt_expiration_hours,
        }
    }

    fn issue_token(&self, user: &User) -> Result<String> {
        create_access_token(
            &TokenSubject {
                user_id: user.id,
                organization_id: user.organization_id,
                role_id: user.role_id,
                email: &user.email,
            },
            &self.jwt_secret,
            self.jwt_expiration_hours,
        )
    }

    async fn organization_id(&self, tag: &str, failure: &str) -> Result<i32> {
        let tag = normalize_tag(tag).ok_or_else(|| AppError::Unauthorized(failure.to_string()))?;
        self.organizations
            .find_by_tag(&tag)
            .await?
            .map(|org| org.id)
            .ok_or_else(|| AppError::Unauthorized(failure.to_string()))
    }

    /// Password login inside one organization. Returns the user and a fresh access token.
    pub async fn login(&self, organization_tag: &str, email: &str, password: &str) -> Result<(User, String)> {
        let organization_id = self.organization_id(organization_tag, LOGIN_FAILED).await?;

        let user = self
            .users
            .find_by_email_in_org(organization_id, email)
            .await?
            .ok_or_else(|| AppError::Unauthorized(LOGIN_FAILED.to_string()))?;

        let matches = user
            .password_hash
            .as_deref()
            .map(|hash| verify_password(password, hash))
            .unwrap_or(false);
        if !matches {
            return Err(AppError::Unauthorized(LOGIN_FAILED.to_string()));
        }

        let token = self.issue_token(&user)?;
        tracing::info!(user_id = user.id, organization_id, "User logged in");
        Ok((user, token))
    }

    /// Google login for an existing member. The Google account is linked to the
    /// member on first use.
    pub async fn login_with_google(&self, organization_tag: &str, info: &GoogleUserInfo) -> Result<(User, String)> {
        let organization_id = self
            .organization_id(organization_tag, ACCOUNT_NOT_REGISTERED)
            .await?;

        let user = match self.users.find_by_google_id(organization_id, &info.id).await? {
            Some(user) => user,
            None => {
                let user = self
                    .users
                    .find_by_email_in_org(organization_id, &info.email)
                    .await?
                    .ok_or_else(|| AppError::Unauthorized(ACCOUNT_NOT_REGISTERED.to_string()))?;
                self.users.set_google_id(user.id, &info.id).await?;
                user
            }
        };

        let token = self.issue_token(&user)?;
        tracing::info!(user_id = user.id, organization_id, "User logged in with Google");
        Ok((user, token))
    }
}
