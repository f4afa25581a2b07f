//! Rate schedule data structures matching the interest_rates.csv format

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::evaluator::QualificationPolicy;

/// Supported savings schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Bank {
    #[serde(rename = "UOB One")]
    UobOne,
    #[serde(rename = "SC BonusSaver")]
    ScBonusSaver,
    #[serde(rename = "OCBC 360")]
    Ocbc360,
    #[serde(rename = "BOC SmartSaver")]
    BocSmartSaver,
    #[serde(rename = "Chocolate")]
    Chocolate,
}

impl Bank {
    /// All supported banks in display order
    pub const ALL: [Bank; 5] = [
        Bank::UobOne,
        Bank::ScBonusSaver,
        Bank::Ocbc360,
        Bank::BocSmartSaver,
        Bank::Chocolate,
    ];

    /// Name as it appears in the rate table
    pub fn as_str(&self) -> &'static str {
        match self {
            Bank::UobOne => "UOB One",
            Bank::ScBonusSaver => "SC BonusSaver",
            Bank::Ocbc360 => "OCBC 360",
            Bank::BocSmartSaver => "BOC SmartSaver",
            Bank::Chocolate => "Chocolate",
        }
    }
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Bank {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Bank::ALL
            .iter()
            .copied()
            .find(|bank| bank.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| EngineError::UnknownBank(name.to_string()))
    }
}

/// One row of a bank's published schedule, normalized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTier {
    /// Category tag (base, salary, spend, giro, spend_only, invest, ...)
    pub tier_type: String,

    /// Label of the balance slice ("First $75K") or an ordering discriminator
    pub balance_tier: String,

    /// Annual rate as a fraction (1.60% -> 0.016)
    pub interest_rate: f64,

    /// Free-text requirement tag
    pub requirement_type: String,

    /// Minimum monthly card spend to qualify (0 = no spend condition)
    pub min_spend: f64,

    /// Minimum monthly salary credit to qualify (0 = no salary condition)
    pub min_salary: f64,

    /// Minimum GIRO / bill payment count (0 = no payment condition)
    pub giro_count: u32,

    /// Whether the tier requires salary to be credited to this bank
    pub salary_credit: bool,

    /// Upper bound of the balance this tier applies to (None = unbounded)
    pub cap_amount: Option<f64>,

    pub remarks: String,
}

impl RateTier {
    /// Upper bound of the tier, treating an open cap as unbounded
    pub fn cap(&self) -> f64 {
        self.cap_amount.unwrap_or(f64::INFINITY)
    }

    /// Amount of `deposit` eligible for this tier's rate when applied flat
    pub fn eligible(&self, deposit: f64) -> f64 {
        deposit.min(self.cap())
    }
}

/// Full set of rate tiers for one bank
#[derive(Debug, Clone)]
pub struct BankSchedule {
    pub bank: Bank,

    /// How this bank's tiers combine
    pub policy: QualificationPolicy,

    /// Tiers in table order
    pub tiers: Vec<RateTier>,
}

impl BankSchedule {
    /// Create a schedule using the configured policy for the bank
    pub fn new(bank: Bank, tiers: Vec<RateTier>) -> Self {
        Self {
            bank,
            policy: QualificationPolicy::for_bank(bank),
            tiers,
        }
    }

    /// Replace the qualification policy
    pub fn with_policy(mut self, policy: QualificationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// All tiers of one category, in table order
    pub fn tiers_of<'a>(&'a self, tier_type: &'a str) -> impl Iterator<Item = &'a RateTier> + 'a {
        self.tiers.iter().filter(move |t| t.tier_type == tier_type)
    }

    pub fn tier(&self, tier_type: &str) -> Option<&RateTier> {
        self.tiers.iter().find(|t| t.tier_type == tier_type)
    }

    /// First tier of a category, or a `MissingTier` error
    pub fn require(&self, tier_type: &str) -> Result<&RateTier, EngineError> {
        self.tier(tier_type)
            .ok_or_else(|| EngineError::missing_tier(self.bank, tier_type))
    }

    /// All tiers of a category, failing if there are none
    pub fn require_all(&self, tier_type: &str) -> Result<Vec<&RateTier>, EngineError> {
        let tiers: Vec<_> = self.tiers.iter().filter(|t| t.tier_type == tier_type).collect();
        if tiers.is_empty() {
            return Err(EngineError::missing_tier(self.bank, tier_type));
        }
        Ok(tiers)
    }

    /// Whether any tier rewards salary credited to this bank
    pub fn rewards_salary_credit(&self) -> bool {
        self.tiers.iter().any(|t| t.salary_credit)
    }

    /// Distinct card-spend breakpoints, ascending
    ///
    /// Only crossing one of these changes the rate, so they are the only
    /// spend amounts worth trying when splitting a spend budget.
    pub fn spend_thresholds(&self) -> Vec<f64> {
        let mut thresholds: Vec<f64> = self
            .tiers
            .iter()
            .map(|t| t.min_spend)
            .filter(|&s| s > 0.0)
            .collect();
        thresholds.sort_by(|a, b| a.total_cmp(b));
        thresholds.dedup();
        thresholds
    }
}

/// Schedules for every loaded bank, ordered by [`Bank`]
#[derive(Debug, Clone, Default)]
pub struct BankSchedules {
    schedules: Vec<BankSchedule>,
}

impl BankSchedules {
    /// Build from schedules in any order; later duplicates replace earlier ones
    pub fn new(schedules: Vec<BankSchedule>) -> Self {
        let mut ordered: Vec<BankSchedule> = Vec::with_capacity(schedules.len());
        for schedule in schedules {
            match ordered.iter_mut().find(|s| s.bank == schedule.bank) {
                Some(existing) => *existing = schedule,
                None => ordered.push(schedule),
            }
        }
        ordered.sort_by_key(|s| s.bank);
        Self { schedules: ordered }
    }

    /// The rate table shipped with the crate
    pub fn published() -> Result<Self, EngineError> {
        super::loader::load_schedules_from_reader(super::loader::PUBLISHED_RATES.as_bytes())
    }

    pub fn get(&self, bank: Bank) -> Option<&BankSchedule> {
        self.schedules.iter().find(|s| s.bank == bank)
    }

    pub fn require(&self, bank: Bank) -> Result<&BankSchedule, EngineError> {
        self.get(bank)
            .ok_or_else(|| EngineError::UnknownBank(bank.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &BankSchedule> {
        self.schedules.iter()
    }

    pub fn banks(&self) -> impl Iterator<Item = Bank> + '_ {
        self.schedules.iter().map(|s| s.bank)
    }

    /// Banks that can receive salary credit, in bank order
    pub fn salary_banks(&self) -> Vec<Bank> {
        self.schedules
            .iter()
            .filter(|s| s.rewards_salary_credit())
            .map(|s| s.bank)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.schedules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_names_round_trip() {
        for bank in Bank::ALL {
            assert_eq!(bank.as_str().parse::<Bank>().unwrap(), bank);
        }
        assert_eq!("ocbc 360".parse::<Bank>().unwrap(), Bank::Ocbc360);
        assert!("DBS Multiplier".parse::<Bank>().is_err());
    }

    #[test]
    fn test_published_schedules() {
        let schedules = BankSchedules::published().unwrap();
        assert_eq!(schedules.len(), 5);
        assert_eq!(schedules.banks().collect::<Vec<_>>(), Bank::ALL.to_vec());

        let boc = schedules.require(Bank::BocSmartSaver).unwrap();
        assert_eq!(boc.spend_thresholds(), vec![500.0, 1500.0]);
        assert_eq!(boc.tiers_of("base").count(), 3);

        let chocolate = schedules.require(Bank::Chocolate).unwrap();
        assert!(chocolate.spend_thresholds().is_empty());
    }

    #[test]
    fn test_salary_banks() {
        let schedules = BankSchedules::published().unwrap();
        assert_eq!(
            schedules.salary_banks(),
            vec![Bank::UobOne, Bank::ScBonusSaver, Bank::Ocbc360, Bank::BocSmartSaver]
        );
    }

    #[test]
    fn test_tiers_outlive_lookup_key() {
        let schedules = BankSchedules::published().unwrap();
        let ocbc = schedules.require(Bank::Ocbc360).unwrap();

        let (first, brackets) = {
            let key = String::from("salary");
            (ocbc.tier(&key).unwrap(), ocbc.require_all(&key).unwrap())
        };
        assert_eq!(first.balance_tier, "First $75K");
        assert_eq!(brackets.len(), 2);
        assert_eq!(ocbc.tiers_of("salary").count(), 2);
    }

    #[test]
    fn test_require_missing_tier() {
        let schedule = BankSchedule::new(Bank::Chocolate, Vec::new());
        let err = schedule.require("base").unwrap_err();
        assert_eq!(err.field(), Some("base"));
    }
}
