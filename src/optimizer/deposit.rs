//! Deposit allocation search
//!
//! Each pass fixes which bank (if any) receives salary credit and walks the
//! full increment grid. A bank's interest depends only on its own amount,
//! so every pass evaluates each bank once per grid step up front and scores
//! distributions by lookup.

use std::collections::BTreeMap;

use rayon::prelude::*;

use super::config::OptimizerConfig;
use super::grid::{whole_steps, DistributionGrid};
use super::progress::{pass_name, ProgressObserver, SearchEvent};
use super::ranking::{AllocationSolution, RankedSolutions};
use crate::error::EngineError;
use crate::evaluator::{evaluate, Evaluation};
use crate::requirements::{check_amount, RequirementProfile};
use crate::schedule::{Bank, BankSchedules};

/// One sweep of the grid with a fixed salary assignment
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPass {
    pub salary_bank: Option<Bank>,
    /// Search order; the salary bank, when set, comes first
    pub banks: Vec<Bank>,
}

/// Interest for every grid step of one bank within a pass
struct StepTable {
    bank: Bank,
    evaluations: Vec<Evaluation>,
    totals: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct DepositOptimizer {
    config: OptimizerConfig,
}

impl DepositOptimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Salary passes in bank order, then the pass with no salary credit
    ///
    /// Only banks that reward salary credit get a salary pass, and only when
    /// the profile declares salary at all.
    pub fn passes(
        &self,
        schedules: &BankSchedules,
        requirements: &RequirementProfile,
    ) -> Vec<SearchPass> {
        let all: Vec<Bank> = schedules.banks().collect();
        let mut passes = Vec::new();

        if requirements.has_salary {
            for salary_bank in schedules.salary_banks() {
                let mut banks = vec![salary_bank];
                banks.extend(all.iter().copied().filter(|&b| b != salary_bank));
                passes.push(SearchPass {
                    salary_bank: Some(salary_bank),
                    banks,
                });
            }
        }

        passes.push(SearchPass {
            salary_bank: None,
            banks: all,
        });
        passes
    }

    /// Best `top_k` splits of `total_amount` across the loaded banks
    ///
    /// An amount too small for any admissible distribution is not an error:
    /// the returned list holds only placeholders.
    pub fn optimize(
        &self,
        total_amount: f64,
        schedules: &BankSchedules,
        requirements: &RequirementProfile,
        observer: &dyn ProgressObserver,
    ) -> Result<RankedSolutions, EngineError> {
        self.config.validate()?;
        check_amount("total_amount", total_amount)?;
        requirements.validate()?;

        let passes = self.passes(schedules, requirements);
        log::info!(
            "optimizing {:.2} across {} banks in {} passes",
            total_amount,
            schedules.len(),
            passes.len()
        );

        let results: Vec<RankedSolutions> = passes
            .par_iter()
            .map(|pass| self.run_pass(total_amount, pass, schedules, requirements, observer))
            .collect::<Result<_, _>>()?;

        let mut ranked = RankedSolutions::new(self.config.top_k);
        for result in results {
            ranked.merge(result);
        }

        match ranked.best() {
            Some(best) => log::info!("best split earns {:.2}/yr", best.total_interest),
            None => log::info!("no admissible distribution for {:.2}", total_amount),
        }
        Ok(ranked)
    }

    fn run_pass(
        &self,
        total_amount: f64,
        pass: &SearchPass,
        schedules: &BankSchedules,
        requirements: &RequirementProfile,
        observer: &dyn ProgressObserver,
    ) -> Result<RankedSolutions, EngineError> {
        let increment = self.config.increment;
        let tables = self.step_tables(total_amount, pass, schedules, requirements)?;

        // A salary bank with nothing allocated repeats the no-salary pass
        let min_first = u64::from(pass.salary_bank.is_some());
        let limits = tables.iter().map(|t| t.totals.len() as u64 - 1).collect();
        let grid = DistributionGrid::new(total_amount, increment, limits, min_first);
        let salary_pays = match pass.salary_bank {
            Some(_) => Some(self.salary_steps(&tables[0], schedules, requirements)?),
            None => None,
        };

        log::info!("pass {} started", pass_name(pass.salary_bank));
        observer.on_event(&SearchEvent::PassStarted {
            salary_bank: pass.salary_bank,
            estimated_candidates: grid.estimated_size(),
        });

        let mut ranked = RankedSolutions::new(self.config.top_k);
        let mut checked = 0u64;
        let mut admissible = 0u64;

        for steps in grid {
            checked += 1;
            if checked % self.config.progress_interval.max(1) == 0 {
                observer.on_event(&SearchEvent::Checked {
                    salary_bank: pass.salary_bank,
                    checked,
                    admissible,
                });
            }

            let remaining = total_amount - increment * steps.iter().sum::<u64>() as f64;
            if remaining >= self.config.tolerance {
                continue;
            }
            // Salary that earns nothing here repeats the no-salary pass
            if let Some(pays) = &salary_pays {
                if !pays[steps[0] as usize] {
                    continue;
                }
            }
            admissible += 1;

            let total_interest: f64 = tables
                .iter()
                .zip(&steps)
                .map(|(table, &step)| table.totals[step as usize])
                .sum();
            if !ranked.accepts(total_interest) {
                continue;
            }

            let previous_best = ranked.entries()[0].total_interest;
            ranked.insert(self.solution(&tables, &steps, total_interest, pass.salary_bank));
            if total_interest > previous_best {
                observer.on_event(&SearchEvent::NewBest {
                    salary_bank: pass.salary_bank,
                    total_interest,
                });
            }
        }

        log::info!(
            "pass {} finished: {} checked, {} admissible",
            pass_name(pass.salary_bank),
            checked,
            admissible
        );
        observer.on_event(&SearchEvent::PassFinished {
            salary_bank: pass.salary_bank,
            checked,
            admissible,
        });
        Ok(ranked)
    }

    /// Evaluate every reachable grid step for each bank in the pass
    fn step_tables(
        &self,
        total_amount: f64,
        pass: &SearchPass,
        schedules: &BankSchedules,
        requirements: &RequirementProfile,
    ) -> Result<Vec<StepTable>, EngineError> {
        let increment = self.config.increment;
        let total_steps = whole_steps(total_amount, increment);

        pass.banks
            .iter()
            .map(|&bank| {
                let schedule = schedules.require(bank)?;
                let profile = requirements.for_bank(bank, pass.salary_bank);
                let steps = whole_steps(self.config.bonus_cap(bank), increment).min(total_steps);

                let evaluations = (0..=steps)
                    .map(|step| evaluate(step as f64 * increment, schedule, &profile))
                    .collect::<Result<Vec<_>, _>>()?;
                let totals = evaluations.iter().map(Evaluation::total_interest).collect();

                Ok(StepTable {
                    bank,
                    evaluations,
                    totals,
                })
            })
            .collect()
    }

    /// Steps at which salary credit raises the salary bank's interest
    fn salary_steps(
        &self,
        table: &StepTable,
        schedules: &BankSchedules,
        requirements: &RequirementProfile,
    ) -> Result<Vec<bool>, EngineError> {
        let schedule = schedules.require(table.bank)?;
        let profile = requirements.for_bank(table.bank, None);

        table
            .totals
            .iter()
            .enumerate()
            .map(|(step, &with_salary)| {
                let amount = step as f64 * self.config.increment;
                let without = evaluate(amount, schedule, &profile)?;
                Ok(with_salary > without.total_interest())
            })
            .collect()
    }

    fn solution(
        &self,
        tables: &[StepTable],
        steps: &[u64],
        total_interest: f64,
        salary_bank: Option<Bank>,
    ) -> AllocationSolution {
        let mut distribution = BTreeMap::new();
        let mut breakdown = BTreeMap::new();

        for (table, &step) in tables.iter().zip(steps) {
            if step == 0 {
                continue;
            }
            distribution.insert(table.bank, step as f64 * self.config.increment);
            breakdown.insert(table.bank, table.evaluations[step as usize].clone());
        }

        AllocationSolution {
            distribution,
            total_interest,
            breakdown,
            salary_bank,
        }
    }
}

impl Default for DepositOptimizer {
    fn default() -> Self {
        Self::new(OptimizerConfig::default())
    }
}
