//! Category bonuses applied per balance bracket
//!
//! The base rate applies to the whole deposit. Every satisfied category
//! adds its own rate for each bracket (e.g. first $75K, next $25K), so
//! bonuses stack, but only within their bracket.

use super::{stacked_slices, BonusRule, Condition, Evaluation, Ledger, TierEvaluator};
use crate::error::EngineError;
use crate::requirements::RequirementProfile;
use crate::schedule::BankSchedule;

#[derive(Debug, Clone, PartialEq)]
pub struct SplitBracket {
    pub base_tier: &'static str,
    pub categories: Vec<BonusRule>,
}

impl Default for SplitBracket {
    fn default() -> Self {
        Self {
            base_tier: "base",
            categories: vec![
                BonusRule::new("salary", Condition::Salary, "Salary"),
                BonusRule::new("save", Condition::IncreasedBalance, "Save"),
                BonusRule::new("spend", Condition::Spend, "Spend"),
                BonusRule::new("insure", Condition::Insurance, "Insure"),
                BonusRule::new("invest", Condition::Investments, "Invest"),
                BonusRule::new("grow", Condition::GrewWealth, "Grow"),
            ],
        }
    }
}

impl TierEvaluator for SplitBracket {
    fn evaluate(
        &self,
        deposit: f64,
        schedule: &BankSchedule,
        requirements: &RequirementProfile,
    ) -> Result<Evaluation, EngineError> {
        let mut ledger = Ledger::new();

        let base = schedule.require(self.base_tier)?;
        ledger.accrue(deposit, base.interest_rate, "Base Interest");

        for category in &self.categories {
            if !category.condition.declared(requirements) {
                continue;
            }

            let tiers = schedule.require_all(category.tier_type)?;
            let brackets = stacked_slices(schedule.bank, tiers)?;
            if !category.condition.met(brackets[0].tier, requirements) {
                log::debug!("{}: {} bonus not met", schedule.bank, category.label);
                continue;
            }

            for bracket in &brackets {
                ledger.accrue(
                    bracket.portion(deposit),
                    bracket.tier.interest_rate,
                    format!("{} Bonus ({})", category.label, bracket.tier.balance_tier),
                );
            }
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

    fn ocbc() -> BankSchedule {
        BankSchedules::published()
            .unwrap()
            .require(Bank::Ocbc360)
            .unwrap()
            .clone()
    }

    #[test]
    fn test_salary_and_spend_stack_per_bracket() {
        let profile = RequirementProfile {
            has_salary: true,
            salary_amount: 2000.0,
            spend_amount: 500.0,
            ..Default::default()
        };
        let result = evaluate(100_000.0, &ocbc(), &profile).unwrap();

        let expected = 100_000.0 * 0.0005
            + 75_000.0 * 0.016
            + 25_000.0 * 0.032
            + 75_000.0 * 0.005
            + 25_000.0 * 0.005;
        assert_relative_eq!(result.total_interest(), expected, epsilon = 1e-9);
        assert_eq!(result.breakdown().len(), 5);
    }

    #[test]
    fn test_brackets_stop_at_second_cap() {
        let profile = RequirementProfile {
            has_insurance: true,
            ..Default::default()
        };
        let result = evaluate(300_000.0, &ocbc(), &profile).unwrap();

        let expected = 300_000.0 * 0.0005 + 75_000.0 * 0.012 + 25_000.0 * 0.024;
        assert_relative_eq!(result.total_interest(), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_second_bracket_skipped_below_first_cap() {
        let profile = RequirementProfile {
            grew_wealth: true,
            increased_balance: true,
            ..Default::default()
        };
        let result = evaluate(60_000.0, &ocbc(), &profile).unwrap();

        assert!(result.has_entry("Grow Bonus (First $75K)"));
        assert!(!result.has_entry("Grow Bonus (Next $25K)"));
        assert!(result.has_entry("Save Bonus (First $75K)"));
        let expected = 60_000.0 * (0.0005 + 0.022 + 0.006);
        assert_relative_eq!(result.total_interest(), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_salary_below_minimum() {
        let profile = RequirementProfile {
            has_salary: true,
            salary_amount: 1799.0,
            ..Default::default()
        };
        let result = evaluate(80_000.0, &ocbc(), &profile).unwrap();
        assert_eq!(result.breakdown().len(), 1);
    }
}
