use super::{
    asset_models::{asset_request_url, Asset, NewAsset, ASSET_REQUEST_CONTENT, DUPLICATE_ASSET_CODE},
    asset_repository::AssetRepository,
    lending::{self, AssetLendingStore, LendingDecision, LendingPlan},
};
use crate::{
    error::{map_duplicate, AppError, Result},
    middleware::CurrentUser,
    notification::{
        notification_models::{NewNotifications, NEW_NOTIFICATION_TITLE},
        ImmediateDelivery, NotificationDispatcher, NotificationRepository,
    },
    user::UserRepository,
};
use sqlx::PgPool;
use std::sync::Arc;

pub struct NewAssetRequest {
    pub asset_id: i32,
    pub user_id: i32,
    pub status: i32,
    pub status_req: i32,
}

#[derive(Clone)]
pub struct AssetService {
    db: PgPool,
    repo: AssetRepository,
    users: UserRepository,
    notifications: NotificationRepository,
    dispatcher: NotificationDispatcher,
    lending: Arc<dyn AssetLendingStore>,
}

impl AssetService {
    pub fn new(
        db: PgPool,
        repo: AssetRepository,
        users: UserRepository,
        notifications: NotificationRepository,
        dispatcher: NotificationDispatcher,
        lending: Arc<dyn AssetLendingStore>,
    ) -> Self {
        Self {
            db,
            repo,
            users,
            notifications,
            dispatcher,
            lending,
        }
    }

    pub fn repository(&self) -> &AssetRepository {
        &self.repo
    }

    /// Stores the asset; a holder given up front starts a usage log right away.
    pub async fn create_asset(&self, organization_id: i32, asset: &NewAsset) -> Result<Asset> {
        let mut tx = self.db.begin().await?;
        let created = self
            .repo
            .create_with_tx(&mut tx, organization_id, asset)
            .await
            .map_err(|e| map_duplicate(e, DUPLICATE_ASSET_CODE))?;
        if created.user_id != 0 {
            self.repo
                .open_log_with_tx(&mut tx, organization_id, created.id, created.user_id)
                .await?;
        }
        tx.commit().await?;

        Ok(created)
    }

    pub async fn update_asset(&self, organization_id: i32, id: i32, asset: &NewAsset) -> Result<u64> {
        self.repo
            .update(organization_id, id, asset)
            .await
            .map_err(|e| map_duplicate(e, DUPLICATE_ASSET_CODE))
    }

    /// Files a borrow or return request and tells every general manager about it.
    pub async fn create_request(&self, user: &CurrentUser, request: &NewAssetRequest) -> Result<i32> {
        if request.user_id != user.user_id {
            return Err(AppError::MethodNotAllowed(
                "You not have permission to create asset request".to_string(),
            ));
        }

        let managers = self.users.general_manager_ids(user.organization_id).await?;

        let mut tx = self.db.begin().await?;
        let request_id = self
            .repo
            .insert_request_with_tx(&mut tx, user.organization_id, request.asset_id, user.user_id, request.status_req)
            .await?;
        let url = asset_request_url(request_id);
        let receivers = self
            .notifications
            .insert_notifications_with_tx(
                &mut tx,
                &NewNotifications {
                    organization_id: user.organization_id,
                    sender: user.user_id,
                    receivers: &managers,
                    title: NEW_NOTIFICATION_TITLE,
                    content: ASSET_REQUEST_CONTENT,
                    redirect_url: &url,
                    noti_request_id: None,
                },
            )
            .await?;
        self.repo
            .mark_requested_with_tx(&mut tx, user.organization_id, request.asset_id, request.status, request.status_req)
            .await?;
        tx.commit().await?;

        let sender_name = self.users.full_name(user.user_id).await?.unwrap_or_default();
        self.dispatcher
            .deliver_now(&ImmediateDelivery {
                receivers,
                title: NEW_NOTIFICATION_TITLE.to_string(),
                body: format!("{} {}", sender_name, ASSET_REQUEST_CONTENT).trim().to_string(),
                link: url,
                mail: None,
            })
            .await;

        Ok(request_id)
    }

    pub async fn decide_request(&self, organization_id: i32, decision: &LendingDecision) -> Result<LendingPlan> {
        lending::decide(self.lending.as_ref(), organization_id, decision).await
    }
}
