//! Single-bank comparison: every bank, one deposit, ranked by interest

use serde::Serialize;

use crate::error::EngineError;
use crate::evaluator::{evaluate, Evaluation};
use crate::requirements::RequirementProfile;
use crate::schedule::{Bank, BankSchedules};

/// Interest for one bank
#[derive(Debug, Clone, Serialize)]
pub struct BankQuote {
    pub bank: Bank,
    #[serde(flatten)]
    pub evaluation: Evaluation,
}

impl BankQuote {
    pub fn annual_interest(&self) -> f64 {
        self.evaluation.total_interest()
    }

    pub fn monthly_interest(&self) -> f64 {
        self.evaluation.monthly_interest()
    }
}

/// A bank whose evaluation failed
#[derive(Debug, Serialize)]
pub struct BankFailure {
    pub bank: Bank,
    #[serde(serialize_with = "serialize_error")]
    pub error: EngineError,
}

fn serialize_error<S>(error: &EngineError, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&error.to_string())
}

/// Ranked comparison across all loaded banks
#[derive(Debug, Serialize)]
pub struct Comparison {
    pub deposit_amount: f64,
    /// Descending by annual interest; ties keep bank order
    pub ranked: Vec<BankQuote>,
    pub failures: Vec<BankFailure>,
}

impl Comparison {
    pub fn best(&self) -> Option<&BankQuote> {
        self.ranked.first()
    }
}

/// Evaluate `deposit` at every bank in `schedules`
///
/// A bank that fails to evaluate is reported in `failures` and does not
/// affect the others.
pub fn compare_banks(
    deposit: f64,
    schedules: &BankSchedules,
    requirements: &RequirementProfile,
) -> Comparison {
    let mut ranked = Vec::with_capacity(schedules.len());
    let mut failures = Vec::new();

    for schedule in schedules.iter() {
        match evaluate(deposit, schedule, requirements) {
            Ok(evaluation) => ranked.push(BankQuote {
                bank: schedule.bank,
                evaluation,
            }),
            Err(error) => {
                log::warn!("{} evaluation failed: {}", schedule.bank, error);
                failures.push(BankFailure {
                    bank: schedule.bank,
                    error,
                });
            }
        }
    }

    // Stable sort keeps input order for ties
    ranked.sort_by(|a, b| b.annual_interest().total_cmp(&a.annual_interest()));

    Comparison {
        deposit_amount: deposit,
        ranked,
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::BankSchedule;

    #[test]
    fn test_ranked_descending() {
        let schedules = BankSchedules::published().unwrap();
        let profile = RequirementProfile {
            spend_amount: 600.0,
            ..Default::default()
        };
        let comparison = compare_banks(40_000.0, &schedules, &profile);

        assert_eq!(comparison.ranked.len(), 5);
        assert!(comparison.failures.is_empty());
        for pair in comparison.ranked.windows(2) {
            assert!(pair[0].annual_interest() >= pair[1].annual_interest());
        }
        // Chocolate's flat brackets beat the others at this size
        assert_eq!(comparison.best().unwrap().bank, Bank::Chocolate);
    }

    #[test]
    fn test_ties_keep_bank_order() {
        let schedules = BankSchedules::published().unwrap();
        let comparison = compare_banks(0.0, &schedules, &RequirementProfile::default());

        let banks: Vec<_> = comparison.ranked.iter().map(|q| q.bank).collect();
        assert_eq!(banks, Bank::ALL.to_vec());
    }

    #[test]
    fn test_failing_bank_is_isolated() {
        let published = BankSchedules::published().unwrap();
        let mut schedules: Vec<BankSchedule> = published.iter().cloned().collect();
        for schedule in &mut schedules {
            if schedule.bank == Bank::Ocbc360 {
                schedule.tiers.retain(|t| t.tier_type != "salary");
            }
        }
        let schedules = BankSchedules::new(schedules);

        let profile = RequirementProfile {
            has_salary: true,
            salary_amount: 4000.0,
            ..Default::default()
        };
        let comparison = compare_banks(50_000.0, &schedules, &profile);

        assert_eq!(comparison.ranked.len(), 4);
        assert_eq!(comparison.failures.len(), 1);
        assert_eq!(comparison.failures[0].bank, Bank::Ocbc360);
        assert_eq!(comparison.failures[0].error.field(), Some("salary"));
    }

    #[test]
    fn test_serializes_monthly_and_annual() {
        let schedules = BankSchedules::published().unwrap();
        let comparison = compare_banks(10_000.0, &schedules, &RequirementProfile::default());
        let json = serde_json::to_value(&comparison).unwrap();

        let first = &json["ranked"][0];
        assert_eq!(first["bank"], "Chocolate");
        assert!(first["annual_interest"].as_f64().unwrap() > 0.0);
        assert!(first["monthly_interest"].is_number());
        assert!(first["breakdown"].is_array());
    }
}
