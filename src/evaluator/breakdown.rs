//! Interest breakdown output for a single evaluation

use serde::ser::{Serialize, SerializeStruct, Serializer};

/// One line of an interest calculation
#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownEntry {
    /// Amount of the deposit subjected to `tier_rate`
    pub amount_in_tier: f64,
    /// Annual rate as a fraction
    pub tier_rate: f64,
    /// Annual interest for this line
    pub tier_interest: f64,
    /// Which tier / requirement produced the line
    pub description: String,
}

impl BreakdownEntry {
    pub fn monthly_interest(&self) -> f64 {
        self.tier_interest / 12.0
    }
}

impl Serialize for BreakdownEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("BreakdownEntry", 5)?;
        state.serialize_field("amount_in_tier", &self.amount_in_tier)?;
        state.serialize_field("tier_rate", &self.tier_rate)?;
        state.serialize_field("tier_interest", &self.tier_interest)?;
        state.serialize_field("monthly_interest", &self.monthly_interest())?;
        state.serialize_field("description", &self.description)?;
        state.end()
    }
}

/// Result of evaluating one deposit against one bank schedule
///
/// The total is always the sum of the breakdown, so the two can never
/// disagree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    breakdown: Vec<BreakdownEntry>,
}

impl Evaluation {
    pub fn breakdown(&self) -> &[BreakdownEntry] {
        &self.breakdown
    }

    pub fn total_interest(&self) -> f64 {
        self.breakdown.iter().map(|e| e.tier_interest).sum()
    }

    pub fn monthly_interest(&self) -> f64 {
        self.total_interest() / 12.0
    }

    /// Whether a line with this description prefix was produced
    pub fn has_entry(&self, description_prefix: &str) -> bool {
        self.breakdown
            .iter()
            .any(|e| e.description.starts_with(description_prefix))
    }
}

impl Serialize for Evaluation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Evaluation", 3)?;
        state.serialize_field("annual_interest", &self.total_interest())?;
        state.serialize_field("monthly_interest", &self.monthly_interest())?;
        state.serialize_field("breakdown", &self.breakdown)?;
        state.end()
    }
}

/// Append-only builder used by the evaluators
#[derive(Debug, Default)]
pub(crate) struct Ledger {
    breakdown: Vec<BreakdownEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `amount` at `rate`; non-positive amounts contribute nothing
    pub fn accrue(&mut self, amount: f64, rate: f64, description: impl Into<String>) {
        if amount <= 0.0 {
            return;
        }
        let entry = BreakdownEntry {
            amount_in_tier: amount,
            tier_rate: rate,
            tier_interest: amount * rate,
            description: description.into(),
        };
        log::debug!(
            "accrue {:.2} at {:.4}% -> {:.4} ({})",
            entry.amount_in_tier,
            entry.tier_rate * 100.0,
            entry.tier_interest,
            entry.description
        );
        self.breakdown.push(entry);
    }

    pub fn finish(self) -> Evaluation {
        Evaluation {
            breakdown: self.breakdown,
        }
    }
}
