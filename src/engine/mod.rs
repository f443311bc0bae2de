pub mod badges;
pub mod efficiency;
pub mod evaluator;
pub mod leaderboard;
pub mod queue;
pub mod rank;
pub mod stats;
pub mod streak;
