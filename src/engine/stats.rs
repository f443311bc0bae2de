use crate::engine::streak::apply_route_date;
use crate::models::route::Route;
use crate::models::user::UserStats;

/// Folds a newly stored route into the owner's running totals and streak.
pub fn record_route(stats: &mut UserStats, route: &Route) {
    stats.total_routes += 1;
    stats.total_packages += route.packages as u64;
    stats.total_miles += route.miles;
    stats.total_stops += route.stops as u64;
    apply_route_date(stats, route.date);
}
