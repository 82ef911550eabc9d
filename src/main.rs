mod asset;
mod auth;
mod common;
mod contract;
mod db;
mod error;
mod leave;
mod mailer;
mod middleware;
mod notification;
mod organization;
mod permission;
mod recruitment;
mod reminder;
mod routes;
mod scheduler;
mod shutdown;
mod state;
mod storage;
mod user;

use anyhow::Context;
use asset::{AssetRepository, AssetService};
use auth::{create_oauth_client, AuthService, PendingLogins};
use contract::{ContractRepository, ContractService};
use db::{create_pool, run_migrations};
use leave::{HolidayCalendar, LeaveRepository, LeaveService};
use mailer::{MailSender, SmtpMailer};
use notification::{FcmClient, FcmTokenRepository, NotificationDispatcher, NotificationRepository};
use organization::{OrganizationRepository, OrganizationService};
use permission::{PermissionRepository, PermissionService};
use recruitment::{RecruitmentRepository, RecruitmentService};
use reminder::ReminderService;
use routes::create_router;
use state::{AppState, Config};
use std::sync::Arc;
use storage::{BlobStorage, LocalBlobStorage};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use user::UserRepository;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,hr_erp_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    tracing::info!("Connecting to database...");
    let db = create_pool(&config.database_url, config.database_max_connections)
        .await
        .context("Failed to connect to the database")?;

    tracing::info!("Running migrations...");
    run_migrations(&db).await.context("Failed to run migrations")?;

    let oauth_client = create_oauth_client(
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
        config.google_redirect_uri.clone(),
    )?;

    // Repositories
    let user_repository = UserRepository::new(db.clone());
    let organization_repository = OrganizationRepository::new(db.clone());
    let notification_repository = NotificationRepository::new(db.clone());
    let fcm_repository = FcmTokenRepository::new(db.clone());
    let permission_repository = PermissionRepository::new(db.clone());
    let leave_repository = LeaveRepository::new(db.clone());
    let asset_repository = AssetRepository::new(db.clone());
    let contract_repository = ContractRepository::new(db.clone());
    let recruitment_repository = RecruitmentRepository::new(db.clone());

    // Outbound collaborators
    let mailer: Arc<dyn MailSender> = Arc::new(SmtpMailer::new(
        config.smtp_host.clone(),
        config.smtp_port,
        config.base_spa_url.clone(),
    ));
    let storage: Arc<dyn BlobStorage> = Arc::new(LocalBlobStorage::new(
        config.storage_root.clone(),
        config.storage_public_url.clone(),
    ));
    let push = Arc::new(FcmClient::new(config.fcm_endpoint.clone(), config.fcm_server_key.clone()));
    if config.fcm_server_key.is_none() {
        tracing::warn!("FCM_SERVER_KEY is not set, push notifications are disabled");
    }

    let dispatcher = NotificationDispatcher::new(
        Arc::new(notification_repository.clone()),
        Arc::new(fcm_repository.clone()),
        push,
        Arc::new(user_repository.clone()),
        mailer.clone(),
    );

    // Services
    let auth_service = AuthService::new(
        user_repository.clone(),
        organization_repository.clone(),
        config.jwt_secret.clone(),
        config.jwt_expiration_hours,
    );
    let permission_service = PermissionService::new(db.clone(), permission_repository, user_repository.clone());
    let organization_service = OrganizationService::new(
        db.clone(),
        organization_repository.clone(),
        user_repository.clone(),
        permission_service.clone(),
        leave_repository.clone(),
        mailer.clone(),
        config.clone(),
    );
    let asset_service = AssetService::new(
        db.clone(),
        asset_repository.clone(),
        user_repository.clone(),
        notification_repository.clone(),
        dispatcher.clone(),
        Arc::new(asset_repository),
    );
    let contract_service = ContractService::new(
        db.clone(),
        contract_repository,
        user_repository.clone(),
        storage.clone(),
    );
    let leave_service = LeaveService::new(
        db.clone(),
        leave_repository.clone(),
        user_repository.clone(),
        notification_repository.clone(),
        Arc::new(HolidayCalendar::new(leave_repository)),
    );
    let recruitment_service = RecruitmentService::new(
        db.clone(),
        recruitment_repository,
        user_repository.clone(),
        organization_repository.clone(),
        notification_repository.clone(),
        dispatcher.clone(),
        storage.clone(),
    );
    let reminder_service = ReminderService::new(
        user_repository.clone(),
        organization_repository,
        mailer,
        config.system_mail(),
        config.notice_email.clone(),
    );

    let state = AppState {
        db,
        config: config.clone(),
        oauth_client,
        pending_logins: PendingLogins::default(),
        storage,
        dispatcher,
        user_repository,
        notification_repository,
        fcm_repository,
        auth_service,
        organization_service,
        permission_service,
        asset_service,
        contract_service,
        leave_service,
        recruitment_service,
        reminder_service,
    };

    let mut schedulers = scheduler::start_schedulers(state.clone()).await?;

    let app = create_router(state);

    let addr = config.listen_addr();
    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::shutdown_signal())
        .await?;

    schedulers.shutdown().await?;
    tracing::info!("Server stopped");

    Ok(())
}
