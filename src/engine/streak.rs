//! Daily streak bookkeeping.
//!
//! A streak counts consecutive calendar days with at least one route. The
//! new route is compared against the most recent route date recorded before
//! it.

use chrono::NaiveDate;

use crate::models::user::UserStats;

/// Applies a route dated `route_date` to the streak fields of `stats`.
pub fn apply_route_date(stats: &mut UserStats, route_date: NaiveDate) {
    let current = match stats.last_route_date {
        None => 1,
        Some(last) => match (route_date - last).num_days() {
            1 => stats.current_streak.saturating_add(1),
            // Same day, or a back-dated route: the streak neither grows nor breaks.
            days if days <= 0 => stats.current_streak.max(1),
            _ => 1,
        },
    };

    stats.current_streak = current;
    stats.longest_streak = stats.longest_streak.max(current);
    stats.last_route_date = Some(match stats.last_route_date {
        Some(last) => last.max(route_date),
        None => route_date,
    });
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::apply_route_date;
    use crate::models::user::UserStats;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn stats_after(days: &[u32]) -> UserStats {
        let mut stats = UserStats::default();
        for d in days {
            apply_route_date(&mut stats, day(*d));
        }
        stats
    }

    #[test]
    fn first_route_starts_a_streak() {
        let stats = stats_after(&[1]);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.longest_streak, 1);
        assert_eq!(stats.last_route_date, Some(day(1)));
    }

    #[test]
    fn consecutive_days_extend_the_streak() {
        let stats = stats_after(&[1, 2, 3, 4]);
        assert_eq!(stats.current_streak, 4);
        assert_eq!(stats.longest_streak, 4);
    }

    #[test]
    fn second_route_on_the_same_day_does_not_count_twice() {
        let stats = stats_after(&[1, 2, 2, 2]);
        assert_eq!(stats.current_streak, 2);
    }

    #[test]
    fn gap_resets_current_but_keeps_longest() {
        let stats = stats_after(&[1, 2, 3, 6, 7]);
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.longest_streak, 3);
    }

    #[test]
    fn back_dated_route_leaves_streak_and_last_date_alone() {
        let stats = stats_after(&[10, 11, 3]);
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.last_route_date, Some(day(11)));
    }

    #[test]
    fn month_boundary_is_consecutive() {
        let mut stats = UserStats::default();
        apply_route_date(&mut stats, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        apply_route_date(&mut stats, day(1));
        assert_eq!(stats.current_streak, 2);
    }
}
