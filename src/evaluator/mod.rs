//! Tier evaluators: deposit amount + bank schedule + requirements -> interest
//!
//! Each bank combines its tiers differently, so evaluation is split into one
//! evaluator per qualification family:
//! - [`AlwaysBase`]: base rate on the whole deposit plus additive capped bonuses
//! - [`ExclusivePath`]: exactly one qualification path, walked slice by slice
//! - [`SplitBracket`]: per-category bonus rates applied to fixed brackets
//! - [`WaterfallFlatBonus`]: waterfall base rate plus flat capped bonuses
//! - [`FixedBracket`]: flat rates per bracket with no conditions
//!
//! Which family a bank belongs to is configured by
//! [`QualificationPolicy::for_bank`].

mod breakdown;
mod always_base;
mod exclusive_path;
mod split_bracket;
mod waterfall;
mod fixed_bracket;

pub use breakdown::{BreakdownEntry, Evaluation};
pub use always_base::AlwaysBase;
pub use exclusive_path::{ExclusivePath, PathRule};
pub use split_bracket::SplitBracket;
pub use waterfall::WaterfallFlatBonus;
pub use fixed_bracket::FixedBracket;

pub(crate) use breakdown::Ledger;

use crate::error::EngineError;
use crate::requirements::{check_amount, RequirementProfile};
use crate::schedule::{Bank, BankSchedule, RateTier};

/// Capability shared by all evaluator variants
pub trait TierEvaluator {
    fn evaluate(
        &self,
        deposit: f64,
        schedule: &BankSchedule,
        requirements: &RequirementProfile,
    ) -> Result<Evaluation, EngineError>;
}

/// A qualifying behavior tested against a tier's thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// Salary credited, at least the tier's `min_salary`
    Salary,
    /// Card spend of at least the tier's `min_spend`
    Spend,
    /// At least the tier's `giro_count` GIRO / bill payments
    Giro,
    Insurance,
    Investments,
    IncreasedBalance,
    GrewWealth,
}

impl Condition {
    /// Whether the profile claims the fact this condition tests at all
    ///
    /// A tier whose condition is declared must exist in the schedule;
    /// otherwise evaluation fails with `MissingTier`.
    pub fn declared(self, requirements: &RequirementProfile) -> bool {
        match self {
            Condition::Salary => requirements.has_salary,
            Condition::Spend => requirements.spend_amount > 0.0,
            Condition::Giro => requirements.giro_count > 0,
            Condition::Insurance => requirements.has_insurance,
            Condition::Investments => requirements.has_investments,
            Condition::IncreasedBalance => requirements.increased_balance,
            Condition::GrewWealth => requirements.grew_wealth,
        }
    }

    /// Whether the profile meets this condition at `tier`'s thresholds
    pub fn met(self, tier: &RateTier, requirements: &RequirementProfile) -> bool {
        if !self.declared(requirements) {
            return false;
        }
        match self {
            Condition::Salary => requirements.salary_at_least(tier.min_salary),
            Condition::Spend => requirements.spend_at_least(tier.min_spend),
            Condition::Giro => requirements.giro_at_least(tier.giro_count),
            _ => true,
        }
    }
}

/// A bonus tier type and the condition that unlocks it
#[derive(Debug, Clone, PartialEq)]
pub struct BonusRule {
    pub tier_type: &'static str,
    pub condition: Condition,
    pub label: &'static str,
}

impl BonusRule {
    pub const fn new(tier_type: &'static str, condition: Condition, label: &'static str) -> Self {
        Self {
            tier_type,
            condition,
            label,
        }
    }
}

/// Bank to evaluator mapping, with any bank-specific parameters
#[derive(Debug, Clone, PartialEq)]
pub enum QualificationPolicy {
    AlwaysBase(AlwaysBase),
    ExclusivePath(ExclusivePath),
    SplitBracket(SplitBracket),
    WaterfallFlatBonus(WaterfallFlatBonus),
    FixedBracket(FixedBracket),
}

impl QualificationPolicy {
    pub fn for_bank(bank: Bank) -> Self {
        match bank {
            Bank::UobOne => QualificationPolicy::ExclusivePath(ExclusivePath::default()),
            Bank::ScBonusSaver => QualificationPolicy::AlwaysBase(AlwaysBase::default()),
            Bank::Ocbc360 => QualificationPolicy::SplitBracket(SplitBracket::default()),
            Bank::BocSmartSaver => {
                QualificationPolicy::WaterfallFlatBonus(WaterfallFlatBonus::default())
            }
            Bank::Chocolate => QualificationPolicy::FixedBracket(FixedBracket::default()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            QualificationPolicy::AlwaysBase(_) => "always-base",
            QualificationPolicy::ExclusivePath(_) => "exclusive-path",
            QualificationPolicy::SplitBracket(_) => "split-bracket",
            QualificationPolicy::WaterfallFlatBonus(_) => "waterfall-flat-bonus",
            QualificationPolicy::FixedBracket(_) => "fixed-bracket",
        }
    }
}

impl TierEvaluator for QualificationPolicy {
    fn evaluate(
        &self,
        deposit: f64,
        schedule: &BankSchedule,
        requirements: &RequirementProfile,
    ) -> Result<Evaluation, EngineError> {
        match self {
            QualificationPolicy::AlwaysBase(e) => e.evaluate(deposit, schedule, requirements),
            QualificationPolicy::ExclusivePath(e) => e.evaluate(deposit, schedule, requirements),
            QualificationPolicy::SplitBracket(e) => e.evaluate(deposit, schedule, requirements),
            QualificationPolicy::WaterfallFlatBonus(e) => {
                e.evaluate(deposit, schedule, requirements)
            }
            QualificationPolicy::FixedBracket(e) => e.evaluate(deposit, schedule, requirements),
        }
    }
}

/// Evaluate a deposit against a bank schedule using the schedule's policy
pub fn evaluate(
    deposit: f64,
    schedule: &BankSchedule,
    requirements: &RequirementProfile,
) -> Result<Evaluation, EngineError> {
    check_amount("deposit_amount", deposit)?;
    requirements.validate()?;
    log::debug!(
        "evaluating {} for {:.2} ({})",
        schedule.bank,
        deposit,
        schedule.policy.name()
    );
    schedule.policy.evaluate(deposit, schedule, requirements)
}

/// A balance range `[floor, ceiling)` served by one tier
#[derive(Debug, Clone, Copy)]
pub(crate) struct Slice<'a> {
    pub floor: f64,
    pub ceiling: f64,
    pub tier: &'a RateTier,
}

impl Slice<'_> {
    /// Part of `deposit` falling inside this slice
    pub fn portion(&self, deposit: f64) -> f64 {
        (deposit.min(self.ceiling) - self.floor).max(0.0)
    }
}

/// Order tiers by ascending cap and turn them into contiguous slices
///
/// Caps must strictly increase; only the last tier may be unbounded.
pub(crate) fn stacked_slices<'a>(
    bank: Bank,
    mut tiers: Vec<&'a RateTier>,
) -> Result<Vec<Slice<'a>>, EngineError> {
    tiers.sort_by(|a, b| a.cap().total_cmp(&b.cap()));

    let mut floor = 0.0;
    let mut slices = Vec::with_capacity(tiers.len());
    for tier in tiers {
        let ceiling = tier.cap();
        if ceiling <= floor {
            return Err(EngineError::MalformedSchedule {
                bank,
                reason: format!(
                    "'{}' tier caps must strictly increase (found {} after {})",
                    tier.tier_type, ceiling, floor
                ),
            });
        }
        slices.push(Slice { floor, ceiling, tier });
        floor = ceiling;
    }
    Ok(slices)
}
