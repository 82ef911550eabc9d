use super::organization_models::{
    generate_registration_code, normalize_tag, registration_code_expiry, OrganizationSetting, OrganizationSummary,
    REGISTER_SUCCESSFUL_SUBJECT,
};
use super::organization_repository::OrganizationRepository;
use crate::{
    auth::hash_password,
    common::roles::{GENERAL_MANAGER_ROLE_ID, MEMBER_ROLE_ID},
    error::{map_duplicate, AppError, Result},
    leave::LeaveRepository,
    mailer::{MailCredentials, MailSender, MailTemplate, OutgoingMail},
    middleware::CurrentUser,
    permission::{permission_models::default_modules, PermissionService, ACCESSFUNC},
    state::Config,
    user::{user_models::NewUser, UserRepository},
};
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;

const SETTING_STEP_EMAIL_DONE: i32 = 2;

/// Result of a sign-up attempt. Rejections are answered with HTTP 200 and a FAIL status.
#[derive(Debug, PartialEq)]
pub enum Registration {
    Registered(OrganizationSummary),
    Rejected(&'static str),
}

pub struct NewOrganization<'a> {
    pub code: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub organization_tag: &'a str,
    pub organization_name: &'a str,
}

pub struct InvitedMember<'a> {
    pub request_id: i32,
    pub code: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

#[derive(Clone)]
pub struct OrganizationService {
    db: PgPool,
    repo: OrganizationRepository,
    users: UserRepository,
    permissions: PermissionService,
    leave: LeaveRepository,
    mailer: Arc<dyn MailSender>,
    config: Arc<Config>,
}

impl OrganizationService {
    pub fn new(
        db: PgPool,
        repo: OrganizationRepository,
        users: UserRepository,
        permissions: PermissionService,
        leave: LeaveRepository,
        mailer: Arc<dyn MailSender>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            db,
            repo,
            users,
            permissions,
            leave,
            mailer,
            config,
        }
    }

    pub fn repository(&self) -> &OrganizationRepository {
        &self.repo
    }

    fn system_mailbox(&self) -> Result<MailCredentials> {
        self.config
            .system_mail()
            .ok_or_else(|| AppError::Mail("System mailbox is not configured".to_string()))
    }

    /// Issues a sign-up code and mails the link to `email`.
    pub async fn request_registration(&self, email: &str) -> Result<()> {
        let credentials = self.system_mailbox()?;
        let code = generate_registration_code();

        let mut tx = self.db.begin().await?;
        let request_id = self.repo.create_registration_request_with_tx(&mut tx, None, email).await?;
        self.repo
            .create_code_with_tx(&mut tx, request_id, email, &code, registration_code_expiry(Utc::now()))
            .await?;
        tx.commit().await?;

        let mail = OutgoingMail {
            to: vec![email.to_string()],
            subject: "Micro Erp Register Organization".to_string(),
            template: MailTemplate::RegistrationCode,
            content: "Use the link below to register your organization. It expires in 24 hours.".to_string(),
            url: Some(format!("{}/organization/create-organization?code={}", self.config.base_spa_url, code)),
            org_tag: None,
        };
        self.mailer.send(&credentials, &mail).await
    }

    pub async fn register_organization(&self, input: &NewOrganization<'_>) -> Result<Registration> {
        let Some(tag) = normalize_tag(input.organization_tag) else {
            return Ok(Registration::Rejected("Invalid params"));
        };
        let Some(code) = self.repo.find_code(input.code).await? else {
            return Ok(Registration::Rejected("Your registration link is wrong."));
        };
        if code.is_expired(Utc::now()) {
            return Ok(Registration::Rejected("Code Expired . Please register new code"));
        }

        let password_hash = hash_password(input.password)?;

        let mut tx = self.db.begin().await?;
        let org = self
            .repo
            .create_with_tx(&mut tx, input.organization_name.trim(), &tag)
            .await
            .map_err(|e| map_duplicate(e, "Organization already registered."))?;
        let user_id = self
            .users
            .create_with_tx(
                &mut tx,
                &NewUser {
                    organization_id: org.id,
                    email: input.email,
                    password_hash: &password_hash,
                    role_id: GENERAL_MANAGER_ROLE_ID,
                    first_name: input.first_name,
                    last_name: input.last_name,
                },
            )
            .await?;
        self.repo.expire_code_with_tx(&mut tx, code.id).await?;
        self.permissions
            .repository()
            .upsert_org_modules_with_tx(&mut tx, org.id, &default_modules())
            .await?;
        self.permissions
            .grant_enabled_with_tx(&mut tx, org.id, user_id, ACCESSFUNC)
            .await?;
        tx.commit().await?;

        tracing::info!(organization_id = org.id, tag = %org.tag, "Organization registered");

        if let Ok(credentials) = self.system_mailbox() {
            self.send_welcome(&credentials, input.email, &org.tag).await;
        }

        Ok(Registration::Registered(OrganizationSummary::from(&org)))
    }

    /// Creates a pending invitation in the actor's organization and mails the link
    /// with the organization mailbox.
    pub async fn invite_user(&self, actor: &CurrentUser, email: &str) -> Result<()> {
        let org = self
            .repo
            .find_by_id(actor.organization_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Organization is not exist".to_string()))?;
        let credentials = MailCredentials::from_parts(&org.email, &org.email_password)
            .ok_or_else(|| AppError::BadRequest("Please setting email for organization first".to_string()))?;

        if self.users.find_by_email_in_org(org.id, email).await?.is_some() {
            return Err(AppError::BadRequest("Email already registered".to_string()));
        }

        let code = generate_registration_code();
        let mut tx = self.db.begin().await?;
        let request_id = self
            .repo
            .create_registration_request_with_tx(&mut tx, Some(org.id), email)
            .await?;
        self.repo
            .create_code_with_tx(&mut tx, request_id, email, &code, registration_code_expiry(Utc::now()))
            .await?;
        tx.commit().await?;

        let mail = OutgoingMail {
            to: vec![email.to_string()],
            subject: format!("Invitation to join {} on Micro Erp", org.name),
            template: MailTemplate::RegistrationCode,
            content: format!("{} invited you to join the organization {}.", actor.email, org.name),
            url: Some(format!(
                "{}/organization/register-invite-link?request_id={}&code={}",
                self.config.base_spa_url, request_id, code
            )),
            org_tag: Some(org.tag.clone()),
        };
        self.mailer.send(&credentials, &mail).await
    }

    pub async fn register_invite_link(&self, input: &InvitedMember<'_>) -> Result<Registration> {
        let Some(code) = self.repo.find_code(input.code).await? else {
            return Ok(Registration::Rejected("Your registration link is wrong."));
        };
        if code.registration_request_id != Some(input.request_id) {
            return Ok(Registration::Rejected("Register fail"));
        }
        if code.is_expired(Utc::now()) {
            return Ok(Registration::Rejected("Code Expired . Please register new code"));
        }
        let Some(organization_id) = self
            .repo
            .find_registration_request(input.request_id)
            .await?
            .and_then(|r| r.organization_id)
        else {
            return Ok(Registration::Rejected("Register fail"));
        };
        let Some(org) = self.repo.find_by_id(organization_id).await? else {
            return Ok(Registration::Rejected("Register fail"));
        };

        let password_hash = hash_password(input.password)?;

        let mut tx = self.db.begin().await?;
        let user_id = self
            .users
            .create_with_tx(
                &mut tx,
                &NewUser {
                    organization_id: org.id,
                    email: input.email,
                    password_hash: &password_hash,
                    role_id: MEMBER_ROLE_ID,
                    first_name: input.first_name,
                    last_name: input.last_name,
                },
            )
            .await
            .map_err(|e| map_duplicate(e, "Email already registered"))?;
        self.repo.expire_code_with_tx(&mut tx, code.id).await?;
        self.permissions
            .grant_enabled_with_tx(&mut tx, org.id, user_id, ACCESSFUNC)
            .await?;
        tx.commit().await?;

        if let Some(credentials) = MailCredentials::from_parts(&org.email, &org.email_password) {
            self.send_welcome(&credentials, input.email, &org.tag).await;
        }

        Ok(Registration::Registered(OrganizationSummary::from(&org)))
    }

    async fn send_welcome(&self, credentials: &MailCredentials, email: &str, tag: &str) {
        let mail = OutgoingMail {
            to: vec![email.to_string()],
            subject: REGISTER_SUCCESSFUL_SUBJECT.to_string(),
            template: MailTemplate::RegisterSuccessful,
            content: format!("Your account is ready. Sign in with the organization tag {}.", tag),
            url: Some(format!("{}/login", self.config.base_spa_url)),
            org_tag: Some(tag.to_string()),
        };
        if let Err(e) = self.mailer.send(credentials, &mail).await {
            tracing::warn!(email, "Failed to send register mail: {}", e);
        }
    }

    /// Stores the system mailbox as the organization mailbox and mails `email_test` from it.
    pub async fn edit_organization_email(&self, actor: &CurrentUser, email_test: &str) -> Result<()> {
        let credentials = self.system_mailbox()?;
        let org = self
            .repo
            .find_by_id(actor.organization_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Organization is not exist".to_string()))?;

        self.repo
            .update_email(
                org.id,
                &credentials.address,
                &credentials.password,
                org.setting_step.max(SETTING_STEP_EMAIL_DONE),
            )
            .await?;

        let mail = OutgoingMail {
            to: vec![email_test.to_string()],
            subject: "Micro Erp Test Email".to_string(),
            template: MailTemplate::Plain,
            content: format!("This mailbox now sends the mail of organization {}.", org.name),
            url: None,
            org_tag: Some(org.tag),
        };
        self.mailer.send(&credentials, &mail).await
    }

    pub async fn setting(&self, organization_id: i32) -> Result<OrganizationSetting> {
        let org = self
            .repo
            .find_by_id(organization_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Organization is not exist".to_string()))?;

        Ok(OrganizationSetting {
            email: org.email,
            expiration_reset_day_off: org.expiration_reset_day_off,
        })
    }

    pub async fn edit_expiration_reset_day_off(&self, organization_id: i32, months: i32) -> Result<()> {
        let mut tx = self.db.begin().await?;
        self.repo
            .update_expiration_reset_with_tx(&mut tx, organization_id, months)
            .await?;
        self.leave
            .restamp_opening_grants_with_tx(&mut tx, organization_id, months)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}
