use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::Json;
use axum::Router;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::rest::extract::ApiQuery;
use crate::engine::leaderboard::{
    aggregate_routes, rank_totals, LeaderboardMetric, LeaderboardPeriod, Totals,
};
use crate::models::route::Route;
use crate::models::user::Company;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/leaderboard", get(get_leaderboard))
}

#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardQuery {
    #[serde(default)]
    pub metric: LeaderboardMetric,
    #[serde(default)]
    pub period: LeaderboardPeriod,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: Uuid,
    pub name: Option<String>,
    pub company: Option<Company>,
    pub avatar_url: Option<String>,
    #[serde(flatten)]
    pub totals: Totals,
    pub value: f64,
}

#[derive(Serialize)]
pub struct LeaderboardResponse {
    pub metric: LeaderboardMetric,
    pub period: LeaderboardPeriod,
    pub leaderboard: Vec<LeaderboardEntry>,
}

async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<LeaderboardQuery>,
) -> Json<LeaderboardResponse> {
    let today = Local::now().date_naive();
    let leaderboard = build_leaderboard(&state, query.metric, query.period, today);

    Json(LeaderboardResponse {
        metric: query.metric,
        period: query.period,
        leaderboard,
    })
}

pub fn build_leaderboard(
    state: &AppState,
    metric: LeaderboardMetric,
    period: LeaderboardPeriod,
    today: NaiveDate,
) -> Vec<LeaderboardEntry> {
    let totals: Vec<(Uuid, Totals)> = match period.window_start(today) {
        None => state
            .users
            .iter()
            .map(|user| (user.id, Totals::from_stats(&user.stats)))
            .collect(),
        Some(since) => {
            let routes: Vec<Route> = state
                .routes
                .iter()
                .filter(|route| route.date >= since)
                .map(|route| route.value().clone())
                .collect();

            aggregate_routes(&routes, since)
                .into_iter()
                .filter(|(user_id, _)| state.users.contains_key(user_id))
                .collect()
        }
    };

    rank_totals(totals, metric)
        .into_iter()
        .filter_map(|(user_id, totals)| {
            let user = state.users.get(&user_id)?;
            Some(LeaderboardEntry {
                rank: 0,
                user_id,
                name: user.name.clone(),
                company: user.company,
                avatar_url: user.avatar_url.clone(),
                value: totals.value(metric),
                totals,
            })
        })
        .enumerate()
        .map(|(index, entry)| LeaderboardEntry {
            rank: index + 1,
            ..entry
        })
        .collect()
}
