//! Search settings for the allocation optimizers

use std::collections::BTreeMap;
use std::env;

use crate::error::EngineError;
use crate::schedule::Bank;

/// Configuration for a deposit optimization run
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerConfig {
    /// Grid step for per-bank allocations
    pub increment: f64,

    /// Unallocated remainder accepted for a distribution to count
    pub tolerance: f64,

    /// Number of ranked solutions retained
    pub top_k: usize,

    /// Largest balance per bank that still earns bonus interest;
    /// bounds the search for that bank
    pub bonus_caps: BTreeMap<Bank, f64>,

    /// Candidates between progress updates
    pub progress_interval: u64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        let bonus_caps = BTreeMap::from([
            (Bank::UobOne, 150_000.0),
            (Bank::ScBonusSaver, 100_000.0),
            (Bank::Ocbc360, 100_000.0),
            (Bank::BocSmartSaver, 100_000.0),
            (Bank::Chocolate, 50_000.0),
        ]);

        Self {
            increment: 5_000.0,
            tolerance: 5_000.0,
            top_k: 3,
            bonus_caps,
            progress_interval: 10_000,
        }
    }
}

impl OptimizerConfig {
    /// Defaults overridden by OPTIMIZER_INCREMENT, OPTIMIZER_TOLERANCE and
    /// OPTIMIZER_TOP_K when set
    pub fn from_env() -> Result<Self, EngineError> {
        let mut config = Self::default();

        if let Some(value) = env_value::<f64>("OPTIMIZER_INCREMENT")? {
            config.increment = value;
        }
        if let Some(value) = env_value::<f64>("OPTIMIZER_TOLERANCE")? {
            config.tolerance = value;
        }
        if let Some(value) = env_value::<usize>("OPTIMIZER_TOP_K")? {
            config.top_k = value;
        }

        config.validate()?;
        Ok(config)
    }

    /// Search bound for a bank; banks without a configured cap are bounded
    /// only by the total
    pub fn bonus_cap(&self, bank: Bank) -> f64 {
        self.bonus_caps.get(&bank).copied().unwrap_or(f64::INFINITY)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.increment.is_finite() && self.increment > 0.0) {
            return Err(EngineError::InvalidConfig {
                field: "increment",
                reason: format!("must be positive, got {}", self.increment),
            });
        }
        // Admissibility is a strict comparison, so zero would admit nothing
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(EngineError::InvalidConfig {
                field: "tolerance",
                reason: format!("must be positive, got {}", self.tolerance),
            });
        }
        if self.top_k == 0 {
            return Err(EngineError::InvalidConfig {
                field: "top_k",
                reason: "must retain at least one solution".to_string(),
            });
        }
        if self.bonus_caps.values().any(|cap| cap.is_nan() || *cap < 0.0) {
            return Err(EngineError::InvalidConfig {
                field: "bonus_caps",
                reason: "caps must not be negative".to_string(),
            });
        }
        Ok(())
    }
}

fn env_value<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, EngineError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map(Some).map_err(|_| EngineError::InvalidConfig {
            field: name,
            reason: format!("'{}' is not a valid value", raw),
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OptimizerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.top_k, 3);
        assert_eq!(config.bonus_cap(Bank::UobOne), 150_000.0);
        assert_eq!(config.bonus_cap(Bank::Chocolate), 50_000.0);
    }

    #[test]
    fn test_validation() {
        let config = OptimizerConfig {
            increment: 0.0,
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().field(), Some("increment"));

        let config = OptimizerConfig {
            top_k: 0,
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().field(), Some("top_k"));

        let config = OptimizerConfig {
            tolerance: 0.0,
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().field(), Some("tolerance"));
    }

    #[test]
    fn test_uncapped_bank() {
        let mut config = OptimizerConfig::default();
        config.bonus_caps.remove(&Bank::Chocolate);
        assert!(config.bonus_cap(Bank::Chocolate).is_infinite());
    }
}
