use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Company {
    Amazon,
    FedEx,
    #[serde(rename = "UPS")]
    Ups,
    #[serde(rename = "DHL")]
    Dhl,
    #[serde(rename = "USPS")]
    Usps,
    Other,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserStats {
    pub total_routes: u64,
    pub total_packages: u64,
    pub total_miles: f64,
    pub total_stops: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_route_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub company: Option<Company>,
    pub avatar_url: Option<String>,
    #[serde(flatten)]
    pub stats: UserStats,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
