//! Load bank rate schedules from interest_rates.csv

use super::{Bank, BankSchedule, BankSchedules, RateTier};
use crate::error::EngineError;
use csv::Reader;
use std::path::Path;

/// Default path to the rate table
pub const DEFAULT_RATES_PATH: &str = "data/interest_rates.csv";

/// Rate table compiled into the crate
pub(crate) const PUBLISHED_RATES: &str = include_str!("../../data/interest_rates.csv");

/// Raw CSV row matching interest_rates.csv columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    bank: String,
    tier_type: String,
    balance_tier: String,
    interest_rate: String,
    #[serde(default)]
    requirement_type: Option<String>,
    #[serde(default)]
    min_spend: Option<f64>,
    #[serde(default)]
    min_salary: Option<f64>,
    #[serde(default)]
    giro_count: Option<u32>,
    #[serde(default)]
    salary_credit: Option<String>,
    #[serde(default)]
    cap_amount: Option<f64>,
    #[serde(default)]
    remarks: Option<String>,
}

impl CsvRow {
    fn into_tier(self) -> Result<(Bank, RateTier), EngineError> {
        let bank: Bank = self.bank.parse()?;

        let cap_amount = match self.cap_amount {
            Some(cap) if !cap.is_finite() || cap <= 0.0 => {
                return Err(EngineError::MalformedField {
                    field: "cap_amount",
                    value: cap.to_string(),
                })
            }
            other => other,
        };

        let tier = RateTier {
            tier_type: self.tier_type.trim().to_string(),
            balance_tier: self.balance_tier.trim().to_string(),
            interest_rate: parse_rate(&self.interest_rate)?,
            requirement_type: self.requirement_type.unwrap_or_default(),
            min_spend: non_negative("min_spend", self.min_spend.unwrap_or(0.0))?,
            min_salary: non_negative("min_salary", self.min_salary.unwrap_or(0.0))?,
            giro_count: self.giro_count.unwrap_or(0),
            salary_credit: parse_flag(self.salary_credit.as_deref().unwrap_or(""))?,
            cap_amount,
            remarks: self.remarks.unwrap_or_default(),
        };

        Ok((bank, tier))
    }
}

/// Convert a percentage string ("1.60%") to a fraction (0.016)
pub fn parse_rate(value: &str) -> Result<f64, EngineError> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();

    match number.parse::<f64>() {
        Ok(pct) if pct.is_finite() && pct >= 0.0 => Ok(pct / 100.0),
        _ => Err(EngineError::MalformedField {
            field: "interest_rate",
            value: value.to_string(),
        }),
    }
}

/// Map a Y/N column to a boolean; blank reads as N
pub fn parse_flag(value: &str) -> Result<bool, EngineError> {
    match value.trim() {
        "Y" | "y" => Ok(true),
        "N" | "n" | "" => Ok(false),
        other => Err(EngineError::MalformedField {
            field: "salary_credit",
            value: other.to_string(),
        }),
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<f64, EngineError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(EngineError::MalformedField {
            field,
            value: value.to_string(),
        })
    }
}

fn collect_schedules<R: std::io::Read>(
    mut reader: Reader<R>,
) -> Result<BankSchedules, EngineError> {
    let mut grouped: Vec<(Bank, Vec<RateTier>)> = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        let (bank, tier) = row.into_tier()?;
        match grouped.iter_mut().find(|(b, _)| *b == bank) {
            Some((_, tiers)) => tiers.push(tier),
            None => grouped.push((bank, vec![tier])),
        }
    }

    let schedules = grouped
        .into_iter()
        .map(|(bank, tiers)| {
            log::debug!("loaded {} tiers for {}", tiers.len(), bank);
            BankSchedule::new(bank, tiers)
        })
        .collect();

    Ok(BankSchedules::new(schedules))
}

/// Load all bank schedules from a CSV file
pub fn load_schedules<P: AsRef<Path>>(path: P) -> Result<BankSchedules, EngineError> {
    let file = std::fs::File::open(path)?;
    load_schedules_from_reader(file)
}

/// Load schedules from any reader (e.g., string buffer, request body)
pub fn load_schedules_from_reader<R: std::io::Read>(
    reader: R,
) -> Result<BankSchedules, EngineError> {
    let csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    collect_schedules(csv_reader)
}

/// Load schedules from the default data/interest_rates.csv location
pub fn load_default_schedules() -> Result<BankSchedules, EngineError> {
    load_schedules(DEFAULT_RATES_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use approx::assert_relative_eq;

    const HEADER: &str = "bank,tier_type,balance_tier,interest_rate,requirement_type,\
                          min_spend,min_salary,giro_count,salary_credit,cap_amount,remarks\n";

    #[test]
    fn test_parse_rate() {
        assert_relative_eq!(parse_rate("1.60%").unwrap(), 0.016);
        assert_relative_eq!(parse_rate(" 0.05% ").unwrap(), 0.0005);
        assert_relative_eq!(parse_rate("3.2").unwrap(), 0.032);
        assert!(parse_rate("abc%").is_err());
        assert!(parse_rate("-1%").is_err());
        assert!(parse_rate("").is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("Y").unwrap());
        assert!(!parse_flag("N").unwrap());
        assert!(!parse_flag("").unwrap());
        assert_eq!(parse_flag("maybe").unwrap_err().field(), Some("salary_credit"));
    }

    #[test]
    fn test_load_default_schedules() {
        let schedules = load_default_schedules().expect("Failed to load rate table");
        assert_eq!(schedules.len(), 5);

        let uob = schedules.require(Bank::UobOne).unwrap();
        assert_eq!(uob.tiers_of("salary").count(), 3);
        let first = uob.tier("salary").unwrap();
        assert_relative_eq!(first.interest_rate, 0.0145);
        assert_eq!(first.cap_amount, Some(75_000.0));
        assert_eq!(first.min_salary, 1600.0);
        assert!(first.salary_credit);

        // Blank cap reads as unbounded
        assert_eq!(uob.require("base").unwrap().cap_amount, None);
    }

    #[test]
    fn test_empty_thresholds_default_to_zero() {
        let data = format!("{HEADER}Chocolate,base,First $20K,3.60%,none,,,,,20000,\n");
        let schedules = load_schedules_from_reader(data.as_bytes()).unwrap();
        let tier = schedules.require(Bank::Chocolate).unwrap().require("base").unwrap();
        assert_eq!(tier.min_spend, 0.0);
        assert_eq!(tier.giro_count, 0);
        assert!(!tier.salary_credit);
    }

    #[test]
    fn test_malformed_rate_is_rejected() {
        let data = format!("{HEADER}Chocolate,base,First $20K,three%,none,,,,N,20000,\n");
        let err = load_schedules_from_reader(data.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedData);
        assert_eq!(err.field(), Some("interest_rate"));
    }

    #[test]
    fn test_unknown_bank_is_rejected() {
        let data = format!("{HEADER}Big Bank,base,All,1.00%,none,,,,N,,\n");
        let err = load_schedules_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, EngineError::UnknownBank(ref name) if name == "Big Bank"));
    }
}
