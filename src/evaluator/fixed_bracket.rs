//! Flat rates per balance bracket, no behavioral conditions

use super::{stacked_slices, Evaluation, Ledger, TierEvaluator};
use crate::error::EngineError;
use crate::requirements::RequirementProfile;
use crate::schedule::BankSchedule;

#[derive(Debug, Clone, PartialEq)]
pub struct FixedBracket {
    pub tier_type: &'static str,
}

impl Default for FixedBracket {
    fn default() -> Self {
        Self { tier_type: "base" }
    }
}

impl TierEvaluator for FixedBracket {
    fn evaluate(
        &self,
        deposit: f64,
        schedule: &BankSchedule,
        _requirements: &RequirementProfile,
    ) -> Result<Evaluation, EngineError> {
        let mut ledger = Ledger::new();
        for bracket in stacked_slices(schedule.bank, schedule.require_all(self.tier_type)?)? {
            ledger.accrue(
                bracket.portion(deposit),
                bracket.tier.interest_rate,
                bracket.tier.balance_tier.clone(),
            );
        }
        Ok(ledger.finish())
    }
}
