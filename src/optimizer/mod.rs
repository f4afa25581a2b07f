//! Allocation optimizers
//!
//! The deposit optimizer splits a lump sum across banks on a coarse grid and
//! keeps the best few splits. The spend optimizer then routes a monthly card
//! budget across the banks of one split.

mod config;
mod deposit;
mod grid;
mod progress;
mod ranking;
mod spend;

pub use config::OptimizerConfig;
pub use deposit::{DepositOptimizer, SearchPass};
pub use grid::DistributionGrid;
pub use progress::{pass_name, LogProgress, ProgressObserver, SearchEvent, Silent};
pub use ranking::{AllocationSolution, RankedSolutions};
pub use spend::{optimize_spend, SpendPlan};

use serde::Serialize;

use crate::error::EngineError;
use crate::requirements::RequirementProfile;
use crate::schedule::BankSchedules;

/// A deposit split with the spend routing that suits it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedSolution {
    #[serde(flatten)]
    pub solution: AllocationSolution,

    /// Absent when there was no spend budget to route
    #[serde(rename = "spend_allocation", skip_serializing_if = "Option::is_none")]
    pub spend_plan: Option<SpendPlan>,
}

/// Optimize the deposit split, then plan spend for every split found
///
/// Placeholder slots are dropped, so an infeasible search gives an empty list.
pub fn optimize_with_spend(
    optimizer: &DepositOptimizer,
    total_amount: f64,
    total_spend: f64,
    schedules: &BankSchedules,
    requirements: &RequirementProfile,
    observer: &dyn ProgressObserver,
) -> Result<Vec<PlannedSolution>, EngineError> {
    let ranked = optimizer.optimize(total_amount, schedules, requirements, observer)?;

    ranked
        .into_found()
        .into_iter()
        .map(|solution| {
            let spend_plan = if total_spend > 0.0 {
                Some(optimize_spend(total_spend, schedules, &solution, requirements)?)
            } else {
                None
            };
            Ok(PlannedSolution { solution, spend_plan })
        })
        .collect()
}
