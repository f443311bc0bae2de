//! Leaderboard aggregation.
//!
//! The all-time board ranks the running per-user totals. Windowed boards sum
//! raw routes dated on or after the window start, so a user with no routes
//! in the window does not appear at all.

use std::collections::HashMap;

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::route::Route;
use crate::models::user::UserStats;

pub const LEADERBOARD_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardMetric {
    TotalPackages,
    TotalMiles,
    TotalStops,
    #[default]
    TotalRoutes,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LeaderboardPeriod {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    #[default]
    AllTime,
}

impl LeaderboardPeriod {
    /// First date included in the window, or `None` for all time.
    pub fn window_start(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            LeaderboardPeriod::Daily => Some(today),
            LeaderboardPeriod::Weekly => today.checked_sub_days(Days::new(7)),
            LeaderboardPeriod::Monthly => today.checked_sub_months(Months::new(1)),
            LeaderboardPeriod::Yearly => today.checked_sub_months(Months::new(12)),
            LeaderboardPeriod::AllTime => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct Totals {
    pub total_routes: u64,
    pub total_packages: u64,
    pub total_miles: f64,
    pub total_stops: u64,
}

impl Totals {
    pub fn from_stats(stats: &UserStats) -> Self {
        Self {
            total_routes: stats.total_routes,
            total_packages: stats.total_packages,
            total_miles: stats.total_miles,
            total_stops: stats.total_stops,
        }
    }

    fn add_route(&mut self, route: &Route) {
        self.total_routes += 1;
        self.total_packages += route.packages as u64;
        self.total_miles += route.miles;
        self.total_stops += route.stops as u64;
    }

    pub fn value(&self, metric: LeaderboardMetric) -> f64 {
        match metric {
            LeaderboardMetric::TotalPackages => self.total_packages as f64,
            LeaderboardMetric::TotalMiles => self.total_miles,
            LeaderboardMetric::TotalStops => self.total_stops as f64,
            LeaderboardMetric::TotalRoutes => self.total_routes as f64,
        }
    }
}

/// Sums routes dated on or after `since`, grouped by user.
pub fn aggregate_routes<'a>(
    routes: impl IntoIterator<Item = &'a Route>,
    since: NaiveDate,
) -> HashMap<Uuid, Totals> {
    let mut by_user: HashMap<Uuid, Totals> = HashMap::new();

    for route in routes.into_iter().filter(|route| route.date >= since) {
        by_user.entry(route.user_id).or_default().add_route(route);
    }

    by_user
}

/// Orders users by `metric` descending, breaking ties by user id, and keeps
/// the top [`LEADERBOARD_LIMIT`].
pub fn rank_totals(
    totals: impl IntoIterator<Item = (Uuid, Totals)>,
    metric: LeaderboardMetric,
) -> Vec<(Uuid, Totals)> {
    let mut ranked: Vec<(Uuid, Totals)> = totals.into_iter().collect();

    ranked.sort_by(|(a_id, a), (b_id, b)| {
        b.value(metric)
            .total_cmp(&a.value(metric))
            .then_with(|| a_id.cmp(b_id))
    });
    ranked.truncate(LEADERBOARD_LIMIT);
    ranked
}
