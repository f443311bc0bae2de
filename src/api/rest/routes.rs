use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Json;
use axum::Router;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::api::rest::auth::CurrentUser;
use crate::api::rest::extract::{ApiJson, ApiQuery};
use crate::engine::efficiency::{efficiency_score, format_efficiency};
use crate::engine::queue::{enqueue_badge_job, BadgeJob};
use crate::engine::stats::record_route;
use crate::error::AppError;
use crate::models::route::{Route, Weather};
use crate::state::AppState;

const DEFAULT_ROUTE_LIMIT: usize = 10;
const MAX_ROUTE_LIMIT: usize = 100;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/routes", post(create_route).get(list_routes))
}

/// Raw submission. Every field is required; numbers arrive as JSON numbers
/// and are range-checked before anything is stored.
#[derive(Debug, Default, Deserialize)]
pub struct CreateRouteRequest {
    pub packages: Option<f64>,
    pub stops: Option<f64>,
    pub miles: Option<f64>,
    pub duration_minutes: Option<f64>,
    pub weather: Option<String>,
    pub proof_image_url: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteInput {
    pub packages: u32,
    pub stops: u32,
    pub miles: f64,
    pub duration_minutes: u32,
    pub weather: Weather,
    pub proof_image_url: String,
    pub date: NaiveDate,
    pub finished_at: Option<NaiveTime>,
}

impl CreateRouteRequest {
    pub fn validate(self) -> Result<RouteInput, AppError> {
        let packages = count("packages", self.packages)?;
        let stops = count("stops", self.stops)?;
        let duration_minutes = count("duration_minutes", self.duration_minutes)?;

        let miles = required("miles", self.miles)?;
        if !miles.is_finite() || miles < 0.0 {
            return Err(AppError::BadRequest(
                "miles must be a non-negative number".to_string(),
            ));
        }

        let weather = required("weather", self.weather)?
            .parse::<Weather>()
            .map_err(AppError::BadRequest)?;

        let proof_image_url = required("proof_image_url", self.proof_image_url)?;
        if proof_image_url.trim().is_empty() {
            return Err(AppError::BadRequest(
                "proof_image_url cannot be empty".to_string(),
            ));
        }

        let (date, finished_at) = parse_route_date(&required("date", self.date)?)?;

        Ok(RouteInput {
            packages,
            stops,
            miles,
            duration_minutes,
            weather,
            proof_image_url,
            date,
            finished_at,
        })
    }
}

fn required<T>(field: &str, value: Option<T>) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::BadRequest(format!("missing required field: {field}")))
}

fn count(field: &str, value: Option<f64>) -> Result<u32, AppError> {
    let value = required(field, value)?;
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(AppError::BadRequest(format!(
            "{field} must be a non-negative whole number"
        )));
    }

    Ok(value as u32)
}

/// Accepts a plain calendar date, a local date-time, or an RFC 3339
/// timestamp. A time component is kept as the driver's local finish time.
pub fn parse_route_date(raw: &str) -> Result<(NaiveDate, Option<NaiveTime>), AppError> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok((date, None));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok((datetime.date(), Some(datetime.time())));
        }
    }

    // The offset is the driver's own, so the wall-clock reading is what counts.
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        let local = datetime.naive_local();
        return Ok((local.date(), Some(local.time())));
    }

    Err(AppError::BadRequest(format!(
        "invalid date {raw:?}, expected YYYY-MM-DD"
    )))
}

#[derive(Serialize)]
pub struct RouteResponse {
    pub route: Route,
}

#[derive(Serialize)]
pub struct RouteListResponse {
    pub routes: Vec<Route>,
}

#[derive(Deserialize)]
pub struct ListRoutesQuery {
    pub limit: Option<usize>,
    pub user_id: Option<Uuid>,
}

async fn create_route(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    ApiJson(payload): ApiJson<CreateRouteRequest>,
) -> Result<(StatusCode, Json<RouteResponse>), AppError> {
    let input = payload.validate()?;

    let route = Route {
        id: Uuid::new_v4(),
        user_id,
        packages: input.packages,
        stops: input.stops,
        miles: input.miles,
        duration_minutes: input.duration_minutes,
        weather: input.weather,
        proof_image_url: input.proof_image_url,
        date: input.date,
        finished_at: input.finished_at,
        efficiency_score: efficiency_score(input.packages, input.miles, input.duration_minutes),
        verified: true,
        created_at: Utc::now(),
    };

    let stats = {
        // Holding the user's entry serializes concurrent submissions per user.
        let mut user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("user {} not found", user_id)))?;

        state.routes.insert(route.id, route.clone());
        record_route(&mut user.stats, &route);
        user.updated_at = Utc::now();
        user.stats.clone()
    };

    state.metrics.routes_submitted_total.inc();
    enqueue_badge_job(
        &state,
        BadgeJob {
            user_id,
            route_id: route.id,
            stats,
        },
    );

    info!(
        user_id = %user_id,
        route_id = %route.id,
        efficiency = %format_efficiency(route.efficiency_score),
        "route submitted"
    );

    Ok((StatusCode::CREATED, Json(RouteResponse { route })))
}

async fn list_routes(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    ApiQuery(query): ApiQuery<ListRoutesQuery>,
) -> Json<RouteListResponse> {
    let owner = query.user_id.unwrap_or(caller);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_ROUTE_LIMIT)
        .clamp(1, MAX_ROUTE_LIMIT);

    let mut routes: Vec<Route> = state
        .routes
        .iter()
        .filter(|entry| entry.user_id == owner)
        .map(|entry| entry.value().clone())
        .collect();

    routes.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    routes.truncate(limit);

    Json(RouteListResponse { routes })
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::{parse_route_date, CreateRouteRequest};
    use crate::models::route::Weather;

    fn complete() -> CreateRouteRequest {
        CreateRouteRequest {
            packages: Some(120.0),
            stops: Some(50.0),
            miles: Some(80.0),
            duration_minutes: Some(360.0),
            weather: Some("Rainy".to_string()),
            proof_image_url: Some("https://proofs.example/p.jpg".to_string()),
            date: Some("2024-05-10".to_string()),
        }
    }

    #[test]
    fn complete_request_validates() {
        let input = complete().validate().unwrap();
        assert_eq!(input.packages, 120);
        assert_eq!(input.weather, Weather::Rainy);
        assert_eq!(input.date, NaiveDate::from_ymd_opt(2024, 5, 10).unwrap());
        assert_eq!(input.finished_at, None);
    }

    #[test]
    fn zero_counts_are_allowed() {
        let request = CreateRouteRequest {
            packages: Some(0.0),
            stops: Some(0.0),
            miles: Some(0.0),
            duration_minutes: Some(0.0),
            ..complete()
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn missing_fields_are_rejected() {
        assert!(CreateRouteRequest { stops: None, ..complete() }.validate().is_err());
        assert!(CreateRouteRequest { weather: None, ..complete() }.validate().is_err());
        assert!(CreateRouteRequest { date: None, ..complete() }.validate().is_err());
        assert!(CreateRouteRequest {
            proof_image_url: Some("  ".to_string()),
            ..complete()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        assert!(CreateRouteRequest { packages: Some(-1.0), ..complete() }.validate().is_err());
        assert!(CreateRouteRequest { stops: Some(2.5), ..complete() }.validate().is_err());
        assert!(CreateRouteRequest { miles: Some(-0.1), ..complete() }.validate().is_err());
    }

    #[test]
    fn unknown_weather_is_rejected() {
        let request = CreateRouteRequest {
            weather: Some("Foggy".to_string()),
            ..complete()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn dates_with_time_keep_the_local_finish_time() {
        let (date, time) = parse_route_date("2024-05-10T21:15").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 10).unwrap());
        assert_eq!(time, NaiveTime::from_hms_opt(21, 15, 0));

        let (date, time) = parse_route_date("2024-05-10T05:30:00-07:00").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 10).unwrap());
        assert_eq!(time, NaiveTime::from_hms_opt(5, 30, 0));

        assert!(parse_route_date("10/05/2024").is_err());
    }
}
