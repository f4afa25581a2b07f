//! Interest Engine - tiered bank interest calculation and allocation search
//!
//! This library provides:
//! - Rate table loading and normalization (percent strings, Y/N flags, open caps)
//! - Per-bank tier evaluation with an itemized interest breakdown
//! - Single-bank comparison across all supported banks
//! - Deposit allocation search over a coarse increment grid (top-K)
//! - Card spend allocation across the banks of a chosen deposit split

pub mod error;
pub mod schedule;
pub mod requirements;
pub mod evaluator;
pub mod comparator;
pub mod optimizer;

// Re-export commonly used types
pub use error::{EngineError, ErrorKind};
pub use schedule::{Bank, BankSchedule, BankSchedules, RateTier};
pub use requirements::{CalculationRequest, RequirementProfile};
pub use evaluator::{evaluate, Evaluation, QualificationPolicy, TierEvaluator};
pub use comparator::{compare_banks, Comparison};
pub use optimizer::{
    optimize_spend, optimize_with_spend, AllocationSolution, DepositOptimizer, OptimizerConfig,
    RankedSolutions, SpendPlan,
};
