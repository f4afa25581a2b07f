//! One qualification path out of several, chosen by priority
//!
//! The base rate applies to the whole deposit. The first path whose
//! conditions are all met contributes its bonus tiers, walked as ascending
//! balance slices; every other path is ignored.

use super::{stacked_slices, Condition, Evaluation, Ledger, TierEvaluator};
use crate::error::EngineError;
use crate::requirements::RequirementProfile;
use crate::schedule::BankSchedule;

/// A tier group and the conditions that select it
#[derive(Debug, Clone, PartialEq)]
pub struct PathRule {
    pub tier_type: &'static str,
    pub conditions: Vec<Condition>,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExclusivePath {
    pub base_tier: &'static str,
    /// Paths in priority order
    pub paths: Vec<PathRule>,
}

impl Default for ExclusivePath {
    fn default() -> Self {
        Self {
            base_tier: "base",
            paths: vec![
                PathRule {
                    tier_type: "salary",
                    conditions: vec![Condition::Spend, Condition::Salary],
                    label: "Salary + Spend",
                },
                PathRule {
                    tier_type: "giro",
                    conditions: vec![Condition::Spend, Condition::Giro],
                    label: "GIRO + Spend",
                },
                PathRule {
                    tier_type: "spend_only",
                    conditions: vec![Condition::Spend],
                    label: "Spend Only",
                },
            ],
        }
    }
}

impl TierEvaluator for ExclusivePath {
    fn evaluate(
        &self,
        deposit: f64,
        schedule: &BankSchedule,
        requirements: &RequirementProfile,
    ) -> Result<Evaluation, EngineError> {
        let mut ledger = Ledger::new();

        let base = schedule.require(self.base_tier)?;
        ledger.accrue(deposit, base.interest_rate, "Base Interest");

        for path in &self.paths {
            if !path.conditions.iter().all(|c| c.declared(requirements)) {
                continue;
            }

            let slices = stacked_slices(schedule.bank, schedule.require_all(path.tier_type)?)?;
            // Thresholds are shared by every slice of a path
            let entry = slices[0].tier;
            if !path.conditions.iter().all(|c| c.met(entry, requirements)) {
                log::debug!("{}: {} path not met", schedule.bank, path.label);
                continue;
            }

            log::debug!("{}: using {} path", schedule.bank, path.label);
            for slice in &slices {
                ledger.accrue(
                    slice.portion(deposit),
                    slice.tier.interest_rate,
                    format!("{} ({})", path.label, slice.tier.balance_tier),
                );
            }
            break;
        }

        Ok(ledger.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::evaluate;
    use crate::schedule::{Bank, BankSchedules};
    use approx::assert_relative_eq;

    fn uob() -> BankSchedule {
        BankSchedules::published()
            .unwrap()
            .require(Bank::UobOne)
            .unwrap()
            .clone()
    }

    #[test]
    fn test_spend_only_path() {
        let profile = RequirementProfile {
            spend_amount: 600.0,
            ..Default::default()
        };
        let result = evaluate(150_000.0, &uob(), &profile).unwrap();

        let expected = 150_000.0 * 0.0005 + 75_000.0 * 0.006 + 75_000.0 * 0.0095;
        assert_relative_eq!(result.total_interest(), expected, epsilon = 1e-9);
        assert!(result.has_entry("Spend Only"));
        assert!(!result.has_entry("Salary + Spend"));
        assert!(!result.has_entry("GIRO + Spend"));
    }

    #[test]
    fn test_salary_path_wins_over_giro() {
        let profile = RequirementProfile {
            has_salary: true,
            salary_amount: 2000.0,
            spend_amount: 500.0,
            giro_count: 3,
            ..Default::default()
        };
        let result = evaluate(200_000.0, &uob(), &profile).unwrap();

        // Slices stop at $150K; the rest earns base only
        let expected = 200_000.0 * 0.0005
            + 75_000.0 * 0.0145
            + 50_000.0 * 0.0295
            + 25_000.0 * 0.0445;
        assert_relative_eq!(result.total_interest(), expected, epsilon = 1e-9);
        assert!(result.has_entry("Salary + Spend"));
        assert!(!result.has_entry("GIRO + Spend"));
        assert!(!result.has_entry("Spend Only"));
    }

    #[test]
    fn test_giro_path_when_salary_too_low() {
        let profile = RequirementProfile {
            has_salary: true,
            salary_amount: 1000.0,
            spend_amount: 800.0,
            giro_count: 3,
            ..Default::default()
        };
        let result = evaluate(100_000.0, &uob(), &profile).unwrap();

        let expected = 100_000.0 * 0.0005 + 75_000.0 * 0.006 + 25_000.0 * 0.0095;
        assert_relative_eq!(result.total_interest(), expected, epsilon = 1e-9);
        assert!(result.has_entry("GIRO + Spend"));
    }

    #[test]
    fn test_no_spend_earns_base_only() {
        let profile = RequirementProfile {
            has_salary: true,
            salary_amount: 5000.0,
            spend_amount: 499.0,
            giro_count: 3,
            ..Default::default()
        };
        let result = evaluate(100_000.0, &uob(), &profile).unwrap();
        assert_eq!(result.breakdown().len(), 1);
        assert_relative_eq!(result.total_interest(), 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_path_tiers_fail() {
        let mut schedule = uob();
        schedule.tiers.retain(|t| t.tier_type != "salary");
        let profile = RequirementProfile {
            has_salary: true,
            salary_amount: 5000.0,
            spend_amount: 500.0,
            ..Default::default()
        };

        let err = evaluate(100_000.0, &schedule, &profile).unwrap_err();
        assert_eq!(err.field(), Some("salary"));
    }
}
