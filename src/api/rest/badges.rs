use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::rest::auth::CurrentUser;
use crate::api::rest::extract::ApiJson;
use crate::engine::badges::{evaluate_route, BadgeDefinition, BADGES};
use crate::error::AppError;
use crate::models::badge::BadgeId;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/badges", get(list_badges))
        .route("/badges/check", post(check_badges))
}

#[derive(Deserialize)]
pub struct CheckBadgesRequest {
    pub route_id: Option<Uuid>,
}

#[derive(Serialize)]
pub struct CheckBadgesResponse {
    pub earned_badges: Vec<BadgeId>,
}

async fn list_badges() -> Json<&'static [BadgeDefinition]> {
    Json(BADGES)
}

async fn check_badges(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    ApiJson(payload): ApiJson<CheckBadgesRequest>,
) -> Result<Json<CheckBadgesResponse>, AppError> {
    let route_id = payload
        .route_id
        .ok_or_else(|| AppError::BadRequest("route_id required".to_string()))?;

    let earned_badges = evaluate_route(&state, user_id, route_id)?;
    Ok(Json(CheckBadgesResponse { earned_badges }))
}
