pub mod engine;
pub mod levels;
pub mod progression;
pub mod withdrawals;

pub use levels::{payout, upgrade_cost, LevelSpec, LEVELS, MAX_LEVEL};
pub use progression::GameRules;
