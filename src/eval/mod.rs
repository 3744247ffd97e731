pub mod eval_stats;
pub mod evaluate;

pub use eval_stats::EvalStats;
pub use evaluate::evaluate;
