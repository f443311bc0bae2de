use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::engine::badges::evaluate_route_with_stats;
use crate::engine::queue::BadgeJob;
use crate::state::AppState;

/// Consumes badge jobs until every sender is dropped.
///
/// Failures are logged and counted; nothing is reported back to the route
/// submitter.
pub async fn run_badge_engine(state: Arc<AppState>, mut badge_rx: mpsc::Receiver<BadgeJob>) {
    info!("badge engine started");

    while let Some(job) = badge_rx.recv().await {
        state.metrics.badge_jobs_in_queue.dec();

        let start = Instant::now();
        let evaluation = evaluate_route_with_stats(&state, job.user_id, job.route_id, &job.stats);
        let outcome = match evaluation {
            Ok(earned) => {
                debug!(
                    user_id = %job.user_id,
                    route_id = %job.route_id,
                    earned = earned.len(),
                    "badge evaluation finished"
                );
                "success"
            }
            Err(err) => {
                error!(
                    user_id = %job.user_id,
                    route_id = %job.route_id,
                    error = %err,
                    "badge evaluation failed"
                );
                "error"
            }
        };

        let elapsed = start.elapsed().as_secs_f64();
        state
            .metrics
            .badge_evaluation_latency_seconds
            .with_label_values(&[outcome])
            .observe(elapsed);
        state
            .metrics
            .badge_evaluations_total
            .with_label_values(&[outcome])
            .inc();
    }

    warn!("badge engine stopped: queue channel closed");
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    use super::run_badge_engine;
    use crate::engine::badges::{award_badge, award_badges, evaluate_route};
    use crate::engine::queue::{enqueue_badge_job, BadgeJob};
    use crate::models::badge::BadgeId;
    use crate::models::route::{Route, Weather};
    use crate::models::user::{User, UserStats};
    use crate::state::AppState;

    fn seed(state: &AppState, packages: u32, weather: Weather) -> (Uuid, Uuid) {
        let user_id = Uuid::new_v4();
        let now = Utc::now();
        state.users.insert(
            user_id,
            User {
                id: user_id,
                email: "driver@example.com".to_string(),
                name: Some("Driver".to_string()),
                company: None,
                avatar_url: None,
                stats: UserStats {
                    total_routes: 1,
                    current_streak: 1,
                    longest_streak: 1,
                    ..UserStats::default()
                },
                created_at: now,
                updated_at: now,
            },
        );

        let route_id = Uuid::new_v4();
        state.routes.insert(
            route_id,
            Route {
                id: route_id,
                user_id,
                packages,
                stops: 40,
                miles: 20.0,
                duration_minutes: 240,
                weather,
                proof_image_url: "https://proofs.example/a.jpg".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
                finished_at: None,
                efficiency_score: 0.0,
                verified: true,
                created_at: now,
            },
        );

        (user_id, route_id)
    }

    #[test]
    fn evaluating_twice_never_duplicates_awards() {
        let (state, _rx) = AppState::new(8, 8);
        let (user_id, route_id) = seed(&state, 150, Weather::Rainy);

        let first = evaluate_route(&state, user_id, route_id).unwrap();
        assert_eq!(first, vec![BadgeId::CenturyClub, BadgeId::WeatherWarrior]);

        let second = evaluate_route(&state, user_id, route_id).unwrap();
        assert!(second.is_empty());
        assert_eq!(state.badges.len(), 2);
    }

    #[test]
    fn already_held_badge_is_not_reported_again() {
        let (state, _rx) = AppState::new(8, 8);
        let (user_id, route_id) = seed(&state, 150, Weather::Rainy);

        assert!(award_badge(&state, user_id, BadgeId::CenturyClub)
            .unwrap()
            .is_some());

        let earned = evaluate_route(&state, user_id, route_id).unwrap();
        assert_eq!(earned, vec![BadgeId::WeatherWarrior]);
    }

    #[test]
    fn other_users_route_is_not_found() {
        let (state, _rx) = AppState::new(8, 8);
        let (_owner, route_id) = seed(&state, 150, Weather::Sunny);

        assert!(evaluate_route(&state, Uuid::new_v4(), route_id).is_err());
    }

    #[test]
    fn award_for_unknown_user_is_skipped() {
        let (state, _rx) = AppState::new(8, 8);

        let earned = award_badges(
            &state,
            Uuid::new_v4(),
            &[BadgeId::CenturyClub, BadgeId::Speedster],
        );

        assert!(earned.is_empty());
        assert!(state.badges.is_empty());
        let awarded = &state.metrics.badges_awarded_total;
        assert_eq!(awarded.with_label_values(&["Century Club"]).get(), 0);
        assert_eq!(awarded.with_label_values(&["Speedster"]).get(), 0);
    }

    #[test]
    fn held_badge_does_not_stop_the_rest_of_the_list() {
        let (state, _rx) = AppState::new(8, 8);
        let (user_id, _route_id) = seed(&state, 150, Weather::Rainy);
        award_badge(&state, user_id, BadgeId::CenturyClub).unwrap();

        let earned = award_badges(
            &state,
            user_id,
            &[BadgeId::CenturyClub, BadgeId::WeatherWarrior, BadgeId::Speedster],
        );

        assert_eq!(earned, vec![BadgeId::WeatherWarrior, BadgeId::Speedster]);
        assert_eq!(state.badges.len(), 3);
        let awarded = &state.metrics.badges_awarded_total;
        assert_eq!(awarded.with_label_values(&["Century Club"]).get(), 1);
        assert_eq!(awarded.with_label_values(&["Weather Warrior"]).get(), 1);
    }

    #[test]
    fn full_queue_drops_without_blocking() {
        let (state, _rx) = AppState::new(1, 8);
        let job = BadgeJob {
            user_id: Uuid::new_v4(),
            route_id: Uuid::new_v4(),
            stats: UserStats::default(),
        };

        assert!(enqueue_badge_job(&state, job.clone()));
        assert!(!enqueue_badge_job(&state, job));
        assert_eq!(state.metrics.badge_jobs_in_queue.get(), 1);
    }

    #[test]
    fn closed_queue_leaves_the_gauge_untouched() {
        let (state, rx) = AppState::new(4, 8);
        drop(rx);

        let job = BadgeJob {
            user_id: Uuid::new_v4(),
            route_id: Uuid::new_v4(),
            stats: UserStats::default(),
        };

        assert!(!enqueue_badge_job(&state, job));
        assert_eq!(state.metrics.badge_jobs_in_queue.get(), 0);
        assert_eq!(
            state
                .metrics
                .badge_evaluations_total
                .with_label_values(&["dropped"])
                .get(),
            1
        );
    }

    #[tokio::test]
    async fn engine_awards_badges_in_the_background() {
        let (state, rx) = AppState::new(8, 8);
        let state = Arc::new(state);
        let (user_id, route_id) = seed(&state, 150, Weather::Sunny);
        let mut events = state.badge_events_tx.subscribe();

        tokio::spawn(run_badge_engine(state.clone(), rx));
        let stats = state.users.get(&user_id).unwrap().stats.clone();
        assert!(enqueue_badge_job(&state, BadgeJob { user_id, route_id, stats }));

        let award = events.recv().await.unwrap();
        assert_eq!(award.user_id, user_id);
        assert_eq!(award.badge_id, BadgeId::CenturyClub);
    }

    #[tokio::test]
    async fn engine_judges_streaks_by_the_submitted_totals() {
        let (state, rx) = AppState::new(8, 8);
        let state = Arc::new(state);
        let (user_id, route_id) = seed(&state, 10, Weather::Sunny);
        let mut events = state.badge_events_tx.subscribe();

        // The stored totals show a one-day streak; the job carries the seven
        // days the driver had when this route was recorded.
        let stats = UserStats {
            total_routes: 7,
            current_streak: 7,
            longest_streak: 7,
            ..UserStats::default()
        };

        tokio::spawn(run_badge_engine(state.clone(), rx));
        assert!(enqueue_badge_job(&state, BadgeJob { user_id, route_id, stats }));

        let award = events.recv().await.unwrap();
        assert_eq!(award.badge_id, BadgeId::WeekWarrior);
        assert_eq!(state.users.get(&user_id).unwrap().stats.current_streak, 1);
    }
}
