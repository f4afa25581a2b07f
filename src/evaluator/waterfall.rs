//! Waterfall base rate plus flat, capped bonuses
//!
//! Base interest walks ascending caps, each cap absorbing only the amount
//! above the previous one. Bonuses apply their flat rate to
//! min(deposit, bonus cap) once the minimum balance is met, and an extra
//! rate covers the balance above the first base cap when any bonus applied.

use super::{stacked_slices, BonusRule, Condition, Evaluation, Ledger, TierEvaluator};
use crate::error::EngineError;
use crate::requirements::{format_amount, RequirementProfile};
use crate::schedule::BankSchedule;

#[derive(Debug, Clone, PartialEq)]
pub struct WaterfallFlatBonus {
    pub base_tier: &'static str,
    /// Balance below which no bonus is considered
    pub min_balance: f64,
    pub bonuses: Vec<BonusRule>,
    /// Spend tiers; the highest threshold met applies
    pub spend_tier: &'static str,
    pub extra_tier: Option<&'static str>,
}

impl Default for WaterfallFlatBonus {
    fn default() -> Self {
        Self {
            base_tier: "base",
            min_balance: 1_500.0,
            bonuses: vec![
                BonusRule::new("wealth", Condition::Insurance, "Wealth Bonus (Insurance)"),
                BonusRule::new("salary", Condition::Salary, "Salary Credit Bonus"),
                BonusRule::new("payment", Condition::Giro, "Bill Payment Bonus"),
            ],
            spend_tier: "spend",
            extra_tier: Some("extra"),
        }
    }
}

impl TierEvaluator for WaterfallFlatBonus {
    fn evaluate(
        &self,
        deposit: f64,
        schedule: &BankSchedule,
        requirements: &RequirementProfile,
    ) -> Result<Evaluation, EngineError> {
        let mut ledger = Ledger::new();

        let base = stacked_slices(schedule.bank, schedule.require_all(self.base_tier)?)?;
        for slice in &base {
            ledger.accrue(
                slice.portion(deposit),
                slice.tier.interest_rate,
                format!("Base Interest ({})", slice.tier.balance_tier),
            );
        }

        if deposit < self.min_balance {
            log::debug!(
                "{}: balance {:.2} below {:.2}, no bonus",
                schedule.bank,
                deposit,
                self.min_balance
            );
            return Ok(ledger.finish());
        }

        let mut any_bonus = false;

        for rule in &self.bonuses {
            if !rule.condition.declared(requirements) {
                continue;
            }
            let tier = schedule.require(rule.tier_type)?;
            if rule.condition.met(tier, requirements) {
                ledger.accrue(tier.eligible(deposit), tier.interest_rate, rule.label);
                any_bonus = true;
            }
        }

        if Condition::Spend.declared(requirements) {
            let spend_tiers = schedule.require_all(self.spend_tier)?;
            let best = spend_tiers
                .into_iter()
                .filter(|t| Condition::Spend.met(t, requirements))
                .max_by(|a, b| a.min_spend.total_cmp(&b.min_spend));
            if let Some(tier) = best {
                ledger.accrue(
                    tier.eligible(deposit),
                    tier.interest_rate,
                    format!("Card Spend Bonus (>= {})", format_amount(tier.min_spend)),
                );
                any_bonus = true;
            }
        }

        if let (true, Some(extra_type)) = (any_bonus, self.extra_tier) {
            let extra = schedule.require(extra_type)?;
            let floor = base[0].ceiling;
            let amount = (deposit.min(extra.cap()) - floor).max(0.0);
            ledger.accrue(
                amount,
                extra.interest_rate,
                format!("Extra Savings Bonus ({})", extra.balance_tier),
            );
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

    fn boc() -> BankSchedule {
        BankSchedules::published()
            .unwrap()
            .require(Bank::BocSmartSaver)
            .unwrap()
            .clone()
    }

    #[test]
    fn test_base_waterfall() {
        let result = evaluate(1_200_000.0, &boc(), &RequirementProfile::default()).unwrap();

        let expected = 100_000.0 * 0.0015 + 900_000.0 * 0.002 + 200_000.0 * 0.001;
        assert_relative_eq!(result.total_interest(), expected, epsilon = 1e-9);
        assert_eq!(result.breakdown().len(), 3);
    }

    #[test]
    fn test_higher_spend_tier_and_extra_bonus() {
        let profile = RequirementProfile {
            spend_amount: 1500.0,
            ..Default::default()
        };
        let result = evaluate(150_000.0, &boc(), &profile).unwrap();

        let expected = 100_000.0 * 0.0015 + 50_000.0 * 0.002 + 100_000.0 * 0.008 + 50_000.0 * 0.006;
        assert_relative_eq!(result.total_interest(), expected, epsilon = 1e-9);
        assert!(result.has_entry("Card Spend Bonus (>= $1,500)"));
        assert!(result.has_entry("Extra Savings Bonus"));
    }

    #[test]
    fn test_lower_spend_tier() {
        let profile = RequirementProfile {
            spend_amount: 1499.0,
            ..Default::default()
        };
        let result = evaluate(80_000.0, &boc(), &profile).unwrap();

        assert!(result.has_entry("Card Spend Bonus (>= $500)"));
        // Nothing above the first base cap, so no extra bonus line
        assert!(!result.has_entry("Extra Savings Bonus"));
        assert_relative_eq!(result.total_interest(), 80_000.0 * (0.0015 + 0.005), epsilon = 1e-9);
    }

    #[test]
    fn test_minimum_balance_gate() {
        let profile = RequirementProfile {
            spend_amount: 500.0,
            has_insurance: true,
            giro_count: 3,
            ..Default::default()
        };
        let result = evaluate(1_000.0, &boc(), &profile).unwrap();

        assert_eq!(result.breakdown().len(), 1);
        assert_relative_eq!(result.total_interest(), 1.5, epsilon = 1e-9);
    }

    #[test]
    fn test_flat_bonuses_are_capped() {
        let profile = RequirementProfile {
            has_salary: true,
            salary_amount: 2000.0,
            giro_count: 3,
            has_insurance: true,
            ..Default::default()
        };
        let result = evaluate(200_000.0, &boc(), &profile).unwrap();

        let expected = 100_000.0 * 0.0015
            + 100_000.0 * 0.002
            + 100_000.0 * (0.024 + 0.019 + 0.009)
            + 100_000.0 * 0.006;
        assert_relative_eq!(result.total_interest(), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_payment_bonus_needs_three_payments() {
        let profile = RequirementProfile {
            giro_count: 2,
            ..Default::default()
        };
        let result = evaluate(50_000.0, &boc(), &profile).unwrap();
        assert!(!result.has_entry("Bill Payment Bonus"));
    }
}
