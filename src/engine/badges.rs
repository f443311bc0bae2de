use chrono::Utc;
use dashmap::mapref::entry::Entry;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::efficiency::minutes_per_stop;
use crate::error::AppError;
use crate::models::badge::{BadgeAward, BadgeId};
use crate::models::route::Route;
use crate::models::user::UserStats;
use crate::state::AppState;

const CENTURY_PACKAGES: u32 = 100;
const MARATHON_MILES: f64 = 100.0;
const SPEEDSTER_MAX_MINUTES_PER_STOP: f64 = 2.0;
const EARLY_BIRD_BEFORE_HOUR: u32 = 7;
const NIGHT_OWL_FROM_HOUR: u32 = 20;
const WEEK_STREAK_DAYS: u32 = 7;
const MONTH_STREAK_DAYS: u32 = 30;

#[derive(Debug, Clone, Serialize)]
pub struct BadgeDefinition {
    pub id: BadgeId,
    pub name: &'static str,
    pub description: &'static str,
    pub emoji: &'static str,
    pub criteria: &'static str,
}

pub static BADGES: &[BadgeDefinition] = &[
    BadgeDefinition {
        id: BadgeId::CenturyClub,
        name: "Century Club",
        description: "Delivered 100+ packages in a single route",
        emoji: "💯",
        criteria: "100+ packages in one route",
    },
    BadgeDefinition {
        id: BadgeId::MarathonRunner,
        name: "Marathon Runner",
        description: "Drove 100+ miles in a single route",
        emoji: "🏃",
        criteria: "100+ miles in one route",
    },
    BadgeDefinition {
        id: BadgeId::Speedster,
        name: "Speedster",
        description: "Averaged under 2 minutes per stop",
        emoji: "⚡",
        criteria: "< 2 min/stop average",
    },
    BadgeDefinition {
        id: BadgeId::EarlyBird,
        name: "Early Bird",
        description: "Finished a route before 7am",
        emoji: "🌅",
        criteria: "Route finished before 7am",
    },
    BadgeDefinition {
        id: BadgeId::NightOwl,
        name: "Night Owl",
        description: "Finished a route after 8pm",
        emoji: "🦉",
        criteria: "Route finished after 8pm",
    },
    BadgeDefinition {
        id: BadgeId::WeatherWarrior,
        name: "Weather Warrior",
        description: "Completed a route in bad weather",
        emoji: "🌧️",
        criteria: "Route in rain/snow/storm",
    },
    BadgeDefinition {
        id: BadgeId::RisingStar,
        name: "Rising Star",
        description: "Improved rank by 10+ positions in a week",
        emoji: "⭐",
        criteria: "Top 10 rank improvement weekly",
    },
    BadgeDefinition {
        id: BadgeId::WeekWarrior,
        name: "Week Warrior",
        description: "Maintained a 7-day streak",
        emoji: "🔥",
        criteria: "7 consecutive days",
    },
    BadgeDefinition {
        id: BadgeId::MonthMaster,
        name: "Month Master",
        description: "Maintained a 30-day streak",
        emoji: "👑",
        criteria: "30 consecutive days",
    },
    BadgeDefinition {
        id: BadgeId::SafetyFirst,
        name: "Safety First",
        description: "Prioritized safety over speed",
        emoji: "🛡️",
        criteria: "Manual award or behavior-based",
    },
];

pub fn badge_definition(id: BadgeId) -> Option<&'static BadgeDefinition> {
    BADGES.iter().find(|badge| badge.id == id)
}

/// Whether `route` (with `stats` already including it) satisfies the rule for `badge`.
pub fn qualifies(badge: BadgeId, route: &Route, stats: &UserStats) -> bool {
    match badge {
        BadgeId::CenturyClub => route.packages >= CENTURY_PACKAGES,
        BadgeId::MarathonRunner => route.miles >= MARATHON_MILES,
        BadgeId::Speedster => {
            route.stops > 0
                && minutes_per_stop(route.duration_minutes, route.stops)
                    < SPEEDSTER_MAX_MINUTES_PER_STOP
        }
        BadgeId::WeatherWarrior => route.weather.is_severe(),
        BadgeId::EarlyBird => route
            .local_hour()
            .is_some_and(|hour| hour < EARLY_BIRD_BEFORE_HOUR),
        BadgeId::NightOwl => route
            .local_hour()
            .is_some_and(|hour| hour >= NIGHT_OWL_FROM_HOUR),
        BadgeId::WeekWarrior => stats.current_streak >= WEEK_STREAK_DAYS,
        BadgeId::MonthMaster => stats.current_streak >= MONTH_STREAK_DAYS,
        // Not derivable from a single route.
        BadgeId::RisingStar | BadgeId::SafetyFirst => false,
    }
}

pub fn eligible_badges(route: &Route, stats: &UserStats) -> Vec<BadgeId> {
    BadgeId::ALL
        .into_iter()
        .filter(|badge| qualifies(*badge, route, stats))
        .collect()
}

/// Records `badge` for `user_id` unless already held.
///
/// Returns the new award, or `None` when the user already had the badge.
pub fn award_badge(
    state: &AppState,
    user_id: Uuid,
    badge: BadgeId,
) -> Result<Option<BadgeAward>, AppError> {
    if !state.users.contains_key(&user_id) {
        return Err(AppError::NotFound(format!("user {user_id} not found")));
    }

    let award = match state.badges.entry((user_id, badge)) {
        Entry::Occupied(_) => return Ok(None),
        Entry::Vacant(slot) => {
            let award = BadgeAward {
                id: Uuid::new_v4(),
                user_id,
                badge_id: badge,
                earned_at: Utc::now(),
            };
            slot.insert(award.clone());
            award
        }
    };

    state
        .metrics
        .badges_awarded_total
        .with_label_values(&[badge.as_str()])
        .inc();
    let _ = state.badge_events_tx.send(award.clone());

    info!(user_id = %user_id, badge = %badge, "badge awarded");
    Ok(Some(award))
}

/// Awards each badge independently; a failure on one never stops the rest.
pub fn award_badges(state: &AppState, user_id: Uuid, badges: &[BadgeId]) -> Vec<BadgeId> {
    let mut newly_earned = Vec::new();

    for badge in badges {
        match award_badge(state, user_id, *badge) {
            Ok(Some(_)) => newly_earned.push(*badge),
            Ok(None) => {}
            Err(err) => {
                warn!(user_id = %user_id, badge = %badge, error = %err, "failed to award badge");
            }
        }
    }

    newly_earned
}

/// Runs the rule set for one of the caller's routes against the caller's
/// current totals and records new awards.
pub fn evaluate_route(
    state: &AppState,
    user_id: Uuid,
    route_id: Uuid,
) -> Result<Vec<BadgeId>, AppError> {
    let stats = state
        .users
        .get(&user_id)
        .map(|user| user.stats.clone())
        .ok_or_else(|| AppError::NotFound(format!("user {user_id} not found")))?;

    evaluate_route_with_stats(state, user_id, route_id, &stats)
}

/// Same as [`evaluate_route`], judged against totals captured earlier.
pub fn evaluate_route_with_stats(
    state: &AppState,
    user_id: Uuid,
    route_id: Uuid,
    stats: &UserStats,
) -> Result<Vec<BadgeId>, AppError> {
    let route = state
        .routes
        .get(&route_id)
        .filter(|route| route.user_id == user_id)
        .map(|route| route.value().clone())
        .ok_or_else(|| AppError::NotFound(format!("route {route_id} not found")))?;

    let candidates = eligible_badges(&route, stats);
    Ok(award_badges(state, user_id, &candidates))
}
