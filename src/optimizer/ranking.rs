//! Allocation solutions and top-K retention

use std::collections::BTreeMap;

use serde::Serialize;

use crate::evaluator::Evaluation;
use crate::schedule::Bank;

/// One candidate split of a deposit across banks
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AllocationSolution {
    /// Amount placed at each bank; banks with nothing allocated are absent
    pub distribution: BTreeMap<Bank, f64>,

    /// Annual interest summed across the distribution
    pub total_interest: f64,

    /// Per-bank evaluation behind `total_interest`
    pub breakdown: BTreeMap<Bank, Evaluation>,

    /// Bank credited with salary, if any
    pub salary_bank: Option<Bank>,
}

impl AllocationSolution {
    /// The "nothing found yet" slot
    pub fn placeholder() -> Self {
        Self::default()
    }

    pub fn is_placeholder(&self) -> bool {
        self.distribution.is_empty()
    }

    pub fn allocated(&self) -> f64 {
        self.distribution.values().sum()
    }

    pub fn monthly_interest(&self) -> f64 {
        self.total_interest / 12.0
    }
}

/// Fixed-size list of the best solutions, strongest first
///
/// Starts full of placeholders. A solution is inserted ahead of the first
/// entry it strictly beats, pushing the weakest out, so among equal totals
/// the earlier arrival ranks higher. Each distribution is held at most once,
/// with the best total it arrived with.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RankedSolutions {
    entries: Vec<AllocationSolution>,
}

impl RankedSolutions {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: vec![AllocationSolution::placeholder(); capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Whether a solution with this total would be retained
    pub fn accepts(&self, total_interest: f64) -> bool {
        self.entries.iter().any(|e| total_interest > e.total_interest)
    }

    /// Insert in ranked position; returns the rank taken, if any
    ///
    /// A distribution already held is replaced only by a strictly higher total.
    pub fn insert(&mut self, solution: AllocationSolution) -> Option<usize> {
        let held = self
            .entries
            .iter()
            .position(|e| !e.is_placeholder() && e.distribution == solution.distribution);
        if let Some(index) = held {
            if solution.total_interest <= self.entries[index].total_interest {
                return None;
            }
            self.entries.remove(index);
            self.entries.push(AllocationSolution::placeholder());
        }

        let rank = self
            .entries
            .iter()
            .position(|e| solution.total_interest > e.total_interest)?;
        self.entries.insert(rank, solution);
        self.entries.pop();
        Some(rank)
    }

    /// Fold another list in, as if its solutions had arrived after ours
    pub fn merge(&mut self, other: RankedSolutions) {
        for solution in other.entries.into_iter().filter(|s| !s.is_placeholder()) {
            self.insert(solution);
        }
    }

    /// All slots, placeholders included
    pub fn entries(&self) -> &[AllocationSolution] {
        &self.entries
    }

    /// Real solutions only
    pub fn found(&self) -> impl Iterator<Item = &AllocationSolution> {
        self.entries.iter().filter(|s| !s.is_placeholder())
    }

    pub fn best(&self) -> Option<&AllocationSolution> {
        self.found().next()
    }

    /// True when the search produced no admissible distribution
    pub fn is_infeasible(&self) -> bool {
        self.best().is_none()
    }

    pub fn into_found(self) -> Vec<AllocationSolution> {
        self.entries.into_iter().filter(|s| !s.is_placeholder()).collect()
    }
}
