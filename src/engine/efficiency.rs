const MINUTES_PER_HOUR: f64 = 60.0;

/// Packages delivered per combined mile-and-hour of effort.
///
/// A route with neither distance nor duration scores 0.
pub fn efficiency_score(packages: u32, miles: f64, duration_minutes: u32) -> f64 {
    let duration_hours = duration_minutes as f64 / MINUTES_PER_HOUR;
    let denominator = miles + duration_hours;

    if denominator <= 0.0 {
        return 0.0;
    }

    packages as f64 / denominator
}

pub fn minutes_per_stop(duration_minutes: u32, stops: u32) -> f64 {
    if stops == 0 {
        return 0.0;
    }

    duration_minutes as f64 / stops as f64
}

pub fn format_efficiency(score: f64) -> String {
    format!("{score:.2}")
}
