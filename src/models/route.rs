use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Weather {
    Sunny,
    Rainy,
    Snowy,
    Stormy,
}

impl Weather {
    pub const ALL: [Weather; 4] = [Weather::Sunny, Weather::Rainy, Weather::Snowy, Weather::Stormy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weather::Sunny => "Sunny",
            Weather::Rainy => "Rainy",
            Weather::Snowy => "Snowy",
            Weather::Stormy => "Stormy",
        }
    }

    /// Rain, snow and storms count as bad weather for badge purposes.
    pub fn is_severe(&self) -> bool {
        match self {
            Weather::Sunny => false,
            Weather::Rainy | Weather::Snowy | Weather::Stormy => true,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Weather::Sunny => "☀️",
            Weather::Rainy => "🌧️",
            Weather::Snowy => "❄️",
            Weather::Stormy => "⛈️",
        }
    }
}

impl std::str::FromStr for Weather {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Weather::ALL
            .into_iter()
            .find(|weather| weather.as_str() == raw)
            .ok_or_else(|| {
                format!("unknown weather: {raw}, expected Sunny/Rainy/Snowy/Stormy")
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub id: Uuid,
    pub user_id: Uuid,
    pub packages: u32,
    pub stops: u32,
    pub miles: f64,
    pub duration_minutes: u32,
    pub weather: Weather,
    pub proof_image_url: String,
    pub date: NaiveDate,
    /// Local time of day the route finished, when the driver supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<NaiveTime>,
    pub efficiency_score: f64,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

impl Route {
    pub fn local_hour(&self) -> Option<u32> {
        self.finished_at.map(|time| time.hour())
    }
}

#[cfg(test)]
mod tests {
    use super::Weather;

    #[test]
    fn weather_round_trips_through_its_name() {
        for weather in Weather::ALL {
            assert_eq!(weather.as_str().parse::<Weather>(), Ok(weather));
        }
        assert!("sunny".parse::<Weather>().is_err());
    }

    #[test]
    fn every_weather_has_an_emoji() {
        assert_eq!(Weather::Sunny.emoji(), "☀️");
        assert_eq!(Weather::Stormy.emoji(), "⛈️");
    }
}
