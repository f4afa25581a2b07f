//! Requirement profiles and calculation requests

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::schedule::Bank;

/// The depositor's declared qualifying facts for one calculation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequirementProfile {
    /// Salary is credited (to whichever bank the caller routes it to)
    pub has_salary: bool,

    /// Monthly salary amount
    pub salary_amount: f64,

    /// Monthly card spend
    pub spend_amount: f64,

    /// Number of GIRO / bill payments per month
    pub giro_count: u32,

    pub has_insurance: bool,

    pub has_investments: bool,

    /// Average daily balance increased month on month
    pub increased_balance: bool,

    /// Maintained the wealth balance threshold
    pub grew_wealth: bool,
}

impl RequirementProfile {
    /// Salary is credited and at least `min_salary`
    pub fn salary_at_least(&self, min_salary: f64) -> bool {
        self.has_salary && self.salary_amount >= min_salary
    }

    pub fn spend_at_least(&self, min_spend: f64) -> bool {
        self.spend_amount >= min_spend
    }

    pub fn giro_at_least(&self, count: u32) -> bool {
        self.giro_count >= count
    }

    /// Copy of this profile as seen by `bank` when salary goes to `salary_bank`
    pub fn for_bank(&self, bank: Bank, salary_bank: Option<Bank>) -> Self {
        Self {
            has_salary: self.has_salary && salary_bank == Some(bank),
            ..self.clone()
        }
    }

    /// Copy of this profile with a different card spend
    pub fn with_spend(&self, spend_amount: f64) -> Self {
        Self {
            spend_amount,
            ..self.clone()
        }
    }

    /// Reject negative or non-finite amounts
    pub fn validate(&self) -> Result<(), EngineError> {
        check_amount("salary_amount", self.salary_amount)?;
        check_amount("spend_amount", self.spend_amount)?;
        Ok(())
    }
}

/// A calculation request as received from a caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub deposit_amount: f64,

    #[serde(flatten)]
    pub requirements: RequirementProfile,
}

impl CalculationRequest {
    pub fn validate(&self) -> Result<(), EngineError> {
        check_amount("deposit_amount", self.deposit_amount)?;
        self.requirements.validate()
    }
}

/// Check that an amount is a finite, non-negative number
pub fn check_amount(field: &'static str, value: f64) -> Result<f64, EngineError> {
    if !value.is_finite() {
        return Err(EngineError::invalid_request(field, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(EngineError::invalid_request(field, "must not be negative"));
    }
    Ok(value)
}

/// Parse a user-entered amount such as "10,000" or "$5,000.50"
pub fn parse_amount(field: &'static str, input: &str) -> Result<f64, EngineError> {
    let cleaned: String = input
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();

    let value: f64 = cleaned.parse().map_err(|_| {
        EngineError::invalid_request(field, format!("'{}' is not a number", input.trim()))
    })?;
    check_amount(field, value)
}

/// Format an amount for display: "$3,000" or "$1,234.50"
pub fn format_amount(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.abs();
    let digits = (cents / 100).to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match cents % 100 {
        0 => format!("{sign}${grouped}"),
        frac => format!("{sign}${grouped}.{frac:02}"),
    }
}
