use crate::state::AppState;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

/// Registers the daily reminder mail and the leave-bonus expiry sweep.
pub async fn start_schedulers(state: AppState) -> anyhow::Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let reminder_state = state.clone();
    let reminders = Job::new_async(state.config.reminder_cron.as_str(), move |_uuid, _l| {
        let state = reminder_state.clone();

        Box::pin(async move {
            state.reminder_service.run().await;
        })
    })?;

    let expiry_state = state.clone();
    let leave_expiry = Job::new_async(state.config.leave_expiry_cron.as_str(), move |_uuid, _l| {
        let state = expiry_state.clone();

        Box::pin(async move {
            clear_expired_leave(state).await;
        })
    })?;

    scheduler.add(reminders).await?;
    scheduler.add(leave_expiry).await?;
    scheduler.start().await?;

    info!(
        reminder_cron = %state.config.reminder_cron,
        leave_expiry_cron = %state.config.leave_expiry_cron,
        "Schedulers started"
    );
    Ok(scheduler)
}

async fn clear_expired_leave(state: AppState) {
    let organizations = match state.organization_service.repository().all().await {
        Ok(organizations) => organizations,
        Err(e) => {
            error!(error = %e, "Could not load organizations for leave expiry");
            return;
        }
    };

    for organization in organizations {
        if let Err(e) = state.leave_service.clear_expired(organization.id).await {
            error!(organization_id = organization.id, error = %e, "Clearing expired leave failed");
        }
    }
}
