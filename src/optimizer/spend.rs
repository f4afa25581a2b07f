//! Spend allocation search over a fixed deposit split
//!
//! Only crossing a spend threshold changes a bank's rate, so each eligible
//! bank is either skipped or given exactly one of its thresholds. The tree
//! is small (a handful of banks, one to three branches each) and is searched
//! exhaustively.

use std::collections::BTreeMap;

use serde::Serialize;

use super::ranking::AllocationSolution;
use crate::error::EngineError;
use crate::evaluator::{evaluate, Evaluation};
use crate::requirements::{check_amount, RequirementProfile};
use crate::schedule::{Bank, BankSchedules};

/// Best split of a monthly card-spend budget
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpendPlan {
    /// Spend routed to each bank; skipped banks are absent
    pub allocation: BTreeMap<Bank, f64>,

    /// Annual interest across every bank holding a deposit
    pub total_interest: f64,

    pub breakdown: BTreeMap<Bank, Evaluation>,

    /// Budget left over after the chosen thresholds
    pub unallocated: f64,
}

impl SpendPlan {
    pub fn allocated(&self) -> f64 {
        self.allocation.values().sum()
    }
}

struct SpendSearch<'a> {
    schedules: &'a BankSchedules,
    deposit: &'a AllocationSolution,
    requirements: &'a RequirementProfile,
    /// Banks with a deposit and spend thresholds, with those thresholds
    eligible: Vec<(Bank, Vec<f64>)>,
}

impl SpendSearch<'_> {
    /// Best plan reachable from `index` with `chosen` already decided
    fn best(
        &self,
        index: usize,
        remaining: f64,
        chosen: BTreeMap<Bank, f64>,
    ) -> Result<SpendPlan, EngineError> {
        let rest = &self.eligible[index..];
        let smallest = rest
            .iter()
            .filter_map(|(_, thresholds)| thresholds.first().copied())
            .fold(f64::INFINITY, f64::min);

        if rest.is_empty() || remaining < smallest {
            return self.score(chosen, remaining);
        }

        let (bank, thresholds) = &rest[0];
        let mut best = self.best(index + 1, remaining, chosen.clone())?;

        for &threshold in thresholds.iter().filter(|&&t| t <= remaining) {
            let mut next = chosen.clone();
            next.insert(*bank, threshold);
            let candidate = self.best(index + 1, remaining - threshold, next)?;
            if candidate.total_interest > best.total_interest {
                best = candidate;
            }
        }
        Ok(best)
    }

    /// Interest across every deposit bank with `allocation` as their spend
    fn score(
        &self,
        allocation: BTreeMap<Bank, f64>,
        unallocated: f64,
    ) -> Result<SpendPlan, EngineError> {
        let mut breakdown = BTreeMap::new();

        for (&bank, &amount) in &self.deposit.distribution {
            if amount <= 0.0 {
                continue;
            }
            let schedule = self.schedules.require(bank)?;
            let spend = allocation.get(&bank).copied().unwrap_or(0.0);
            let profile = self
                .requirements
                .for_bank(bank, self.deposit.salary_bank)
                .with_spend(spend);
            breakdown.insert(bank, evaluate(amount, schedule, &profile)?);
        }

        let total_interest = breakdown.values().map(Evaluation::total_interest).sum();
        Ok(SpendPlan {
            allocation,
            total_interest,
            breakdown,
            unallocated,
        })
    }
}

/// Split `total_spend` across the banks of `deposit` to maximize interest
///
/// Skipping every bank is always a candidate, so the result never earns
/// less than routing no spend at all.
pub fn optimize_spend(
    total_spend: f64,
    schedules: &BankSchedules,
    deposit: &AllocationSolution,
    requirements: &RequirementProfile,
) -> Result<SpendPlan, EngineError> {
    check_amount("total_spend", total_spend)?;
    requirements.validate()?;

    let mut eligible = Vec::new();
    for (&bank, &amount) in &deposit.distribution {
        if amount <= 0.0 {
            continue;
        }
        let thresholds = schedules.require(bank)?.spend_thresholds();
        if !thresholds.is_empty() {
            eligible.push((bank, thresholds));
        }
    }
    log::debug!(
        "splitting {:.2} spend over {} eligible banks",
        total_spend,
        eligible.len()
    );

    let search = SpendSearch {
        schedules,
        deposit,
        requirements,
        eligible,
    };
    let plan = search.best(0, total_spend, BTreeMap::new())?;

    log::debug!(
        "spend plan {:?} earns {:.2}/yr ({:.2} unallocated)",
        plan.allocation,
        plan.total_interest,
        plan.unallocated
    );
    Ok(plan)
}
