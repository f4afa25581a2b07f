//! Error types shared by the loader, evaluators and optimizers

use crate::schedule::Bank;
use thiserror::Error;

/// Broad category of an [`EngineError`], for callers that only need to
/// decide how to surface a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The rate table is unusable (bad percentages, missing or disordered tiers)
    MalformedData,
    /// A calculation request carried a value the engine cannot accept
    InvalidRequest,
    /// Optimizer configuration is out of range
    InvalidConfig,
    /// Reading the rate table failed
    Io,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("malformed value '{value}' in column {field}")]
    MalformedField { field: &'static str, value: String },

    #[error("{bank} schedule is malformed: {reason}")]
    MalformedSchedule { bank: Bank, reason: String },

    #[error("{bank} schedule has no '{tier_type}' tier")]
    MissingTier { bank: Bank, tier_type: String },

    #[error("unknown bank '{0}'")]
    UnknownBank(String),

    #[error("invalid value for {field}: {reason}")]
    InvalidRequest { field: &'static str, reason: String },

    #[error("invalid optimizer setting {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("failed to read rate table: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to open rate table: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::MalformedField { .. }
            | EngineError::MalformedSchedule { .. }
            | EngineError::MissingTier { .. }
            | EngineError::UnknownBank(_) => ErrorKind::MalformedData,
            EngineError::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            EngineError::InvalidConfig { .. } => ErrorKind::InvalidConfig,
            EngineError::Csv(_) | EngineError::Io(_) => ErrorKind::Io,
        }
    }

    /// The column, request field or tier type the error is about, if known
    pub fn field(&self) -> Option<&str> {
        match self {
            EngineError::MalformedField { field, .. } => Some(*field),
            EngineError::MissingTier { tier_type, .. } => Some(tier_type.as_str()),
            EngineError::UnknownBank(_) => Some("bank"),
            EngineError::InvalidRequest { field, .. } => Some(*field),
            EngineError::InvalidConfig { field, .. } => Some(*field),
            EngineError::MalformedSchedule { .. }
            | EngineError::Csv(_)
            | EngineError::Io(_) => None,
        }
    }

    pub(crate) fn missing_tier(bank: Bank, tier_type: &str) -> Self {
        EngineError::MissingTier {
            bank,
            tier_type: tier_type.to_string(),
        }
    }

    pub(crate) fn invalid_request(field: &'static str, reason: impl Into<String>) -> Self {
        EngineError::InvalidRequest {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_field() {
        let err = EngineError::missing_tier(Bank::Ocbc360, "salary");
        assert_eq!(err.kind(), ErrorKind::MalformedData);
        assert_eq!(err.field(), Some("salary"));
        assert_eq!(err.to_string(), "OCBC 360 schedule has no 'salary' tier");

        let err = EngineError::invalid_request("deposit_amount", "must not be negative");
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert_eq!(err.field(), Some("deposit_amount"));
    }
}
