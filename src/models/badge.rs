use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BadgeId {
    #[serde(rename = "Century Club")]
    CenturyClub,
    #[serde(rename = "Marathon Runner")]
    MarathonRunner,
    #[serde(rename = "Speedster")]
    Speedster,
    #[serde(rename = "Early Bird")]
    EarlyBird,
    #[serde(rename = "Night Owl")]
    NightOwl,
    #[serde(rename = "Weather Warrior")]
    WeatherWarrior,
    #[serde(rename = "Rising Star")]
    RisingStar,
    #[serde(rename = "Week Warrior")]
    WeekWarrior,
    #[serde(rename = "Month Master")]
    MonthMaster,
    #[serde(rename = "Safety First")]
    SafetyFirst,
}

impl BadgeId {
    pub const ALL: [BadgeId; 10] = [
        BadgeId::CenturyClub,
        BadgeId::MarathonRunner,
        BadgeId::Speedster,
        BadgeId::EarlyBird,
        BadgeId::NightOwl,
        BadgeId::WeatherWarrior,
        BadgeId::RisingStar,
        BadgeId::WeekWarrior,
        BadgeId::MonthMaster,
        BadgeId::SafetyFirst,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeId::CenturyClub => "Century Club",
            BadgeId::MarathonRunner => "Marathon Runner",
            BadgeId::Speedster => "Speedster",
            BadgeId::EarlyBird => "Early Bird",
            BadgeId::NightOwl => "Night Owl",
            BadgeId::WeatherWarrior => "Weather Warrior",
            BadgeId::RisingStar => "Rising Star",
            BadgeId::WeekWarrior => "Week Warrior",
            BadgeId::MonthMaster => "Month Master",
            BadgeId::SafetyFirst => "Safety First",
        }
    }
}

impl std::fmt::Display for BadgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgeAward {
    pub id: Uuid,
    pub user_id: Uuid,
    pub badge_id: BadgeId,
    pub earned_at: DateTime<Utc>,
}
