//! Base rate on the whole deposit plus independent, additive capped bonuses

use super::{BonusRule, Condition, Evaluation, Ledger, TierEvaluator};
use crate::error::EngineError;
use crate::requirements::{format_amount, RequirementProfile};
use crate::schedule::BankSchedule;

#[derive(Debug, Clone, PartialEq)]
pub struct AlwaysBase {
    pub base_tier: &'static str,
    /// Each satisfied bonus adds its rate on min(deposit, bonus cap)
    pub bonuses: Vec<BonusRule>,
}

impl Default for AlwaysBase {
    fn default() -> Self {
        Self {
            base_tier: "base",
            bonuses: vec![
                BonusRule::new("salary", Condition::Salary, "Salary Credit Bonus"),
                BonusRule::new("spend", Condition::Spend, "Card Spend Bonus"),
                BonusRule::new("invest", Condition::Investments, "Investment Bonus"),
                BonusRule::new("insure", Condition::Insurance, "Insurance Bonus"),
            ],
        }
    }
}

impl TierEvaluator for AlwaysBase {
    fn evaluate(
        &self,
        deposit: f64,
        schedule: &BankSchedule,
        requirements: &RequirementProfile,
    ) -> Result<Evaluation, EngineError> {
        let mut ledger = Ledger::new();

        let base = schedule.require(self.base_tier)?;
        ledger.accrue(deposit, base.interest_rate, "Base Interest");

        for rule in &self.bonuses {
            if !rule.condition.declared(requirements) {
                continue;
            }
            let tier = schedule.require(rule.tier_type)?;
            if !rule.condition.met(tier, requirements) {
                log::debug!("{}: {} not met", schedule.bank, rule.label);
                continue;
            }

            let description = match rule.condition {
                Condition::Salary => {
                    format!("{} (>= {})", rule.label, format_amount(tier.min_salary))
                }
                Condition::Spend => {
                    format!("{} (>= {})", rule.label, format_amount(tier.min_spend))
                }
                _ => rule.label.to_string(),
            };
            ledger.accrue(tier.eligible(deposit), tier.interest_rate, description);
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

    fn sc() -> BankSchedule {
        BankSchedules::published()
            .unwrap()
            .require(Bank::ScBonusSaver)
            .unwrap()
            .clone()
    }

    #[test]
    fn test_salary_only_scenario() {
        // Salary credited above the minimum, spend below its minimum
        let profile = RequirementProfile {
            has_salary: true,
            salary_amount: 5000.0,
            spend_amount: 500.0,
            ..Default::default()
        };
        let result = evaluate(50_000.0, &sc(), &profile).unwrap();

        assert_relative_eq!(result.total_interest(), 50_000.0 * 0.0005 + 50_000.0 * 0.01);
        assert!(result.has_entry("Base Interest"));
        assert!(result.has_entry("Salary Credit Bonus"));
        assert!(!result.has_entry("Card Spend Bonus"));
        assert!(!result.has_entry("Insurance Bonus"));
        assert!(!result.has_entry("Investment Bonus"));
        assert_eq!(result.breakdown().len(), 2);
    }

    #[test]
    fn test_bonuses_are_additive_and_capped() {
        let profile = RequirementProfile {
            has_salary: true,
            salary_amount: 3000.0,
            spend_amount: 1000.0,
            has_insurance: true,
            has_investments: true,
            ..Default::default()
        };
        let result = evaluate(250_000.0, &sc(), &profile).unwrap();

        // Base on the full balance, four bonuses on the first $100K
        let expected = 250_000.0 * 0.0005 + 100_000.0 * (0.01 + 0.01 + 0.02 + 0.02);
        assert_relative_eq!(result.total_interest(), expected, epsilon = 1e-9);
        assert_eq!(result.breakdown().len(), 5);
    }

    #[test]
    fn test_salary_below_minimum() {
        let profile = RequirementProfile {
            has_salary: true,
            salary_amount: 2999.0,
            ..Default::default()
        };
        let result = evaluate(10_000.0, &sc(), &profile).unwrap();
        assert!(!result.has_entry("Salary Credit Bonus"));
    }

    #[test]
    fn test_missing_declared_tier_fails() {
        let mut schedule = sc();
        schedule.tiers.retain(|t| t.tier_type != "insure");
        let profile = RequirementProfile {
            has_insurance: true,
            ..Default::default()
        };

        let err = evaluate(10_000.0, &schedule, &profile).unwrap_err();
        assert_eq!(err.field(), Some("insure"));

        // Undeclared facts never touch the missing tier
        assert!(evaluate(10_000.0, &schedule, &RequirementProfile::default()).is_ok());
    }
}
