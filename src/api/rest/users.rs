use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::api::rest::auth::CurrentUser;
use crate::api::rest::extract::ApiJson;
use crate::engine::badges::{badge_definition, BadgeDefinition};
use crate::engine::rank::{next_rank, progress_percent, rank_for_routes, RankDefinition, RANKS};
use crate::error::AppError;
use crate::models::badge::BadgeAward;
use crate::models::user::{Company, User, UserStats};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/:id", get(get_user))
        .route("/users/:id/badges", get(list_user_badges))
        .route("/ranks", get(list_ranks))
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: Option<String>,
    pub company: Option<Company>,
    pub avatar_url: Option<String>,
}

#[derive(Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub rank: &'static RankDefinition,
    pub next_rank: Option<&'static RankDefinition>,
    pub routes_to_next_rank: Option<u64>,
    pub progress_percent: f64,
}

impl UserProfile {
    pub fn new(user: User) -> Self {
        let total_routes = user.stats.total_routes;
        let rank = rank_for_routes(total_routes);
        let next = next_rank(rank);

        Self {
            rank,
            next_rank: next,
            routes_to_next_rank: next.map(|next| next.min_routes.saturating_sub(total_routes)),
            progress_percent: progress_percent(total_routes),
            user,
        }
    }
}

#[derive(Serialize)]
pub struct EarnedBadge {
    #[serde(flatten)]
    pub award: BadgeAward,
    pub badge: Option<&'static BadgeDefinition>,
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    ApiJson(payload): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let email = payload.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::BadRequest("a valid email is required".to_string()));
    }

    let name = payload
        .name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty());

    let now = Utc::now();
    let user = User {
        id: user_id,
        email: email.to_string(),
        name,
        company: payload.company,
        avatar_url: payload.avatar_url,
        stats: UserStats::default(),
        created_at: now,
        updated_at: now,
    };

    match state.users.entry(user_id) {
        Entry::Occupied(_) => {
            return Err(AppError::Conflict(format!("user {user_id} already exists")));
        }
        Entry::Vacant(slot) => {
            slot.insert(user.clone());
        }
    }

    info!(user_id = %user_id, "driver profile created");
    Ok((StatusCode::CREATED, Json(user)))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserProfile>, AppError> {
    let user = state
        .users
        .get(&id)
        .map(|user| user.value().clone())
        .ok_or_else(|| AppError::NotFound(format!("user {} not found", id)))?;

    Ok(Json(UserProfile::new(user)))
}

async fn list_user_badges(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<EarnedBadge>>, AppError> {
    if !state.users.contains_key(&id) {
        return Err(AppError::NotFound(format!("user {} not found", id)));
    }

    let badges = state
        .badges_for_user(id)
        .into_iter()
        .map(|award| EarnedBadge {
            badge: badge_definition(award.badge_id),
            award,
        })
        .collect();

    Ok(Json(badges))
}

async fn list_ranks() -> Json<&'static [RankDefinition]> {
    Json(RANKS)
}
