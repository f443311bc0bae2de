use tokio::sync::mpsc::error::TrySendError;
use tracing::warn;
use uuid::Uuid;

use crate::models::user::UserStats;
use crate::state::AppState;

/// Request to evaluate badge rules for a freshly submitted route.
///
/// `stats` is the driver's totals right after this route was recorded, so
/// streak badges are judged against the submission and not against whatever
/// later routes have done to the totals by the time the job runs.
#[derive(Debug, Clone, PartialEq)]
pub struct BadgeJob {
    pub user_id: Uuid,
    pub route_id: Uuid,
    pub stats: UserStats,
}

/// Hands a job to the badge engine without waiting.
///
/// Returns `false` when the job was dropped because the queue is full or the
/// engine has stopped. The route submission succeeds either way.
pub fn enqueue_badge_job(state: &AppState, job: BadgeJob) -> bool {
    // Counted before the send so the worker's decrement can never run first.
    state.metrics.badge_jobs_in_queue.inc();

    match state.badge_tx.try_send(job) {
        Ok(()) => true,
        Err(TrySendError::Full(job)) => {
            state.metrics.badge_jobs_in_queue.dec();
            warn!(user_id = %job.user_id, route_id = %job.route_id, "badge queue full; dropping job");
            state
                .metrics
                .badge_evaluations_total
                .with_label_values(&["dropped"])
                .inc();
            false
        }
        Err(TrySendError::Closed(job)) => {
            state.metrics.badge_jobs_in_queue.dec();
            warn!(user_id = %job.user_id, route_id = %job.route_id, "badge engine stopped; dropping job");
            state
                .metrics
                .badge_evaluations_total
                .with_label_values(&["dropped"])
                .inc();
            false
        }
    }
}
