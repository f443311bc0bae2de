use dashmap::DashMap;
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use crate::engine::queue::BadgeJob;
use crate::models::badge::{BadgeAward, BadgeId};
use crate::models::route::Route;
use crate::models::user::User;
use crate::observability::metrics::Metrics;

pub struct AppState {
    pub users: DashMap<Uuid, User>,
    pub routes: DashMap<Uuid, Route>,
    /// One award per (user, badge).
    pub badges: DashMap<(Uuid, BadgeId), BadgeAward>,
    pub badge_tx: mpsc::Sender<BadgeJob>,
    pub badge_events_tx: broadcast::Sender<BadgeAward>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        badge_queue_size: usize,
        event_buffer_size: usize,
    ) -> (Self, mpsc::Receiver<BadgeJob>) {
        let (badge_tx, badge_rx) = mpsc::channel(badge_queue_size);
        let (badge_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        (
            Self {
                users: DashMap::new(),
                routes: DashMap::new(),
                badges: DashMap::new(),
                badge_tx,
                badge_events_tx,
                metrics: Metrics::new(),
            },
            badge_rx,
        )
    }

    pub fn badges_for_user(&self, user_id: Uuid) -> Vec<BadgeAward> {
        let mut awards: Vec<BadgeAward> = self
            .badges
            .iter()
            .filter(|entry| entry.key().0 == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        awards.sort_by(|a, b| a.earned_at.cmp(&b.earned_at).then(a.badge_id.cmp(&b.badge_id)));
        awards
    }
}
