use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum RankTier {
    Rookie,
    Driver,
    Pro,
    Expert,
    Elite,
    Master,
    Champion,
    Hero,
    Legend,
    Mythic,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankDefinition {
    pub tier: RankTier,
    pub min_routes: u64,
    pub gradient: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

/// Tier table, ascending by `min_routes` and starting at 0.
pub static RANKS: &[RankDefinition] = &[
    RankDefinition {
        tier: RankTier::Rookie,
        min_routes: 0,
        gradient: "gradient-rookie",
        icon: "🌱",
        color: "#64748b",
    },
    RankDefinition {
        tier: RankTier::Driver,
        min_routes: 50,
        gradient: "gradient-driver",
        icon: "🚗",
        color: "#3b82f6",
    },
    RankDefinition {
        tier: RankTier::Pro,
        min_routes: 150,
        gradient: "gradient-pro",
        icon: "⚡",
        color: "#06b6d4",
    },
    RankDefinition {
        tier: RankTier::Expert,
        min_routes: 300,
        gradient: "gradient-expert",
        icon: "🎯",
        color: "#8b5cf6",
    },
    RankDefinition {
        tier: RankTier::Elite,
        min_routes: 500,
        gradient: "gradient-elite",
        icon: "💎",
        color: "#ec4899",
    },
    RankDefinition {
        tier: RankTier::Master,
        min_routes: 750,
        gradient: "gradient-master",
        icon: "👑",
        color: "#f97316",
    },
    RankDefinition {
        tier: RankTier::Champion,
        min_routes: 1000,
        gradient: "gradient-champion",
        icon: "🏆",
        color: "#ef4444",
    },
    RankDefinition {
        tier: RankTier::Hero,
        min_routes: 1500,
        gradient: "gradient-hero",
        icon: "🦸",
        color: "#f59e0b",
    },
    RankDefinition {
        tier: RankTier::Legend,
        min_routes: 2500,
        gradient: "gradient-legend",
        icon: "🌟",
        color: "#eab308",
    },
    RankDefinition {
        tier: RankTier::Mythic,
        min_routes: 5000,
        gradient: "gradient-mythic",
        icon: "✨",
        color: "#6366f1",
    },
];

/// Highest tier whose threshold the route count has reached.
pub fn rank_for_routes(total_routes: u64) -> &'static RankDefinition {
    RANKS
        .iter()
        .rev()
        .find(|rank| total_routes >= rank.min_routes)
        .unwrap_or(&RANKS[0])
}

pub fn next_rank(current: &RankDefinition) -> Option<&'static RankDefinition> {
    let index = RANKS.iter().position(|rank| rank.tier == current.tier)?;
    RANKS.get(index + 1)
}

/// Percentage of the way from the current tier to the next, in `[0, 100]`.
/// Drivers at the top tier are always at 100.
pub fn progress_percent(total_routes: u64) -> f64 {
    let current = rank_for_routes(total_routes);
    let Some(next) = next_rank(current) else {
        return 100.0;
    };

    let span = (next.min_routes - current.min_routes) as f64;
    let done = total_routes.saturating_sub(current.min_routes) as f64;

    (done / span * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::{next_rank, progress_percent, rank_for_routes, RankTier, RANKS};

    #[test]
    fn table_is_strictly_ascending_from_zero() {
        assert_eq!(RANKS[0].min_routes, 0);
        assert!(RANKS.windows(2).all(|pair| pair[0].min_routes < pair[1].min_routes));
    }

    #[test]
    fn zero_routes_is_the_base_tier() {
        assert_eq!(rank_for_routes(0).tier, RankTier::Rookie);
    }

    #[test]
    fn threshold_is_inclusive() {
        assert_eq!(rank_for_routes(49).tier, RankTier::Rookie);
        assert_eq!(rank_for_routes(50).tier, RankTier::Driver);
        assert_eq!(rank_for_routes(4_999).tier, RankTier::Legend);
        assert_eq!(rank_for_routes(1_000_000).tier, RankTier::Mythic);
    }

    #[test]
    fn next_rank_stops_at_the_top() {
        assert_eq!(
            next_rank(rank_for_routes(0)).map(|rank| rank.tier),
            Some(RankTier::Driver)
        );
        assert!(next_rank(rank_for_routes(5_000)).is_none());
    }

    #[test]
    fn progress_between_tiers() {
        assert_eq!(progress_percent(0), 0.0);
        assert!((progress_percent(25) - 50.0).abs() < 1e-9);
        assert!((progress_percent(100) - 50.0).abs() < 1e-9);
        assert_eq!(progress_percent(5_000), 100.0);
        assert_eq!(progress_percent(9_999), 100.0);
    }
}
