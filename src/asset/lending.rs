//! Borrow and return approvals, expressed as the writes each request status implies.

use super::asset_models::{
    ACCEPT_REQUEST_BORROW_ASSET, ACCEPT_REQUEST_RETURN_ASSET, DENY_REQUEST_BORROW, DENY_REQUEST_RETURN,
};
use crate::error::Result;
use axum::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetUpdate {
    /// Hand the asset to the requesting user.
    InUse,
    /// Clear the holder and make the asset available again.
    Available,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LendingPlan {
    pub asset_update: Option<AssetUpdate>,
    pub open_log: bool,
    pub close_log: bool,
    pub delete_request: bool,
}

/// A manager's decision on one borrow or return request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LendingDecision {
    pub request_id: i32,
    pub asset_id: i32,
    pub user_id: i32,
    pub status: i32,
}

/// Denying a return keeps the asset in use and drops the request without
/// touching the usage log.
pub fn plan(status: i32) -> LendingPlan {
    let asset_update = match status {
        ACCEPT_REQUEST_BORROW_ASSET | DENY_REQUEST_RETURN => Some(AssetUpdate::InUse),
        ACCEPT_REQUEST_RETURN_ASSET | DENY_REQUEST_BORROW => Some(AssetUpdate::Available),
        _ => None,
    };

    LendingPlan {
        asset_update,
        open_log: status == ACCEPT_REQUEST_BORROW_ASSET,
        close_log: status == ACCEPT_REQUEST_RETURN_ASSET,
        delete_request: matches!(status, DENY_REQUEST_BORROW | DENY_REQUEST_RETURN),
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetLendingStore: Send + Sync {
    /// Records the decision and applies `plan` in a single transaction.
    async fn apply_lending(&self, organization_id: i32, decision: &LendingDecision, plan: &LendingPlan) -> Result<()>;
}

/// Plans the writes for `decision` and hands them to `store`.
pub async fn decide(
    store: &dyn AssetLendingStore,
    organization_id: i32,
    decision: &LendingDecision,
) -> Result<LendingPlan> {
    let plan = plan(decision.status);
    store.apply_lending(organization_id, decision, &plan).await?;
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::asset_models::{REQUEST_BORROW_ASSET, REQUEST_RETURN_ASSET};
    use crate::error::AppError;
    use mockall::predicate::eq;

    #[test]
    fn test_accept_borrow_hands_over_and_opens_log() {
        assert_eq!(
            plan(ACCEPT_REQUEST_BORROW_ASSET),
            LendingPlan {
                asset_update: Some(AssetUpdate::InUse),
                open_log: true,
                close_log: false,
                delete_request: false,
            }
        );
    }

    #[test]
    fn test_accept_return_frees_asset_and_closes_log() {
        assert_eq!(
            plan(ACCEPT_REQUEST_RETURN_ASSET),
            LendingPlan {
                asset_update: Some(AssetUpdate::Available),
                open_log: false,
                close_log: true,
                delete_request: false,
            }
        );
    }

    #[test]
    fn test_deny_borrow_frees_asset_and_drops_request() {
        assert_eq!(
            plan(DENY_REQUEST_BORROW),
            LendingPlan {
                asset_update: Some(AssetUpdate::Available),
                open_log: false,
                close_log: false,
                delete_request: true,
            }
        );
    }

    #[test]
    fn test_deny_return_keeps_asset_in_use_without_log_change() {
        assert_eq!(
            plan(DENY_REQUEST_RETURN),
            LendingPlan {
                asset_update: Some(AssetUpdate::InUse),
                open_log: false,
                close_log: false,
                delete_request: true,
            }
        );
    }

    #[test]
    fn test_pending_statuses_change_nothing() {
        assert_eq!(plan(REQUEST_BORROW_ASSET), LendingPlan::default());
        assert_eq!(plan(REQUEST_RETURN_ASSET), LendingPlan::default());
    }

    #[tokio::test]
    async fn test_denied_borrow_is_applied_as_one_plan() {
        let decision = LendingDecision {
            request_id: 42,
            asset_id: 7,
            user_id: 3,
            status: DENY_REQUEST_BORROW,
        };
        let mut store = MockAssetLendingStore::new();
        store
            .expect_apply_lending()
            .with(eq(1), eq(decision), eq(plan(DENY_REQUEST_BORROW)))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let applied = decide(&store, 1, &decision).await.unwrap();
        assert_eq!(applied.asset_update, Some(AssetUpdate::Available));
        assert!(applied.delete_request);
    }

    #[tokio::test]
    async fn test_store_failure_is_returned() {
        let decision = LendingDecision {
            request_id: 1,
            asset_id: 2,
            user_id: 3,
            status: ACCEPT_REQUEST_BORROW_ASSET,
        };
        let mut store = MockAssetLendingStore::new();
        store
            .expect_apply_lending()
            .returning(|_, _, _| Err(AppError::Internal("connection reset".into())));

        assert!(matches!(decide(&store, 1, &decision).await, Err(AppError::Internal(_))));
    }
}
