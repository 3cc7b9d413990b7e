use thiserror::Error;

use crate::core::config::ConfigError;
use crate::core::types::PlayerId;
use crate::catalog::regions::Country;

/// Coarse grouping of failures, used by front ends to pick a reply tone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed or out-of-range input
    Validation,
    /// Well-formed request that the current state does not allow
    Precondition,
    /// Caller lacks the privilege for the operation
    Authorization,
    /// Persistence failure; no state was changed
    Storage,
}

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Invalid country: {0}")]
    InvalidCountry(String),

    #[error("Invalid political system: {0}")]
    InvalidSystem(String),

    #[error("Unknown unit type: {0}")]
    UnknownUnit(String),

    #[error("Unknown region: {0}")]
    UnknownRegion(String),

    #[error("Amount must be positive, got {0}")]
    InvalidAmount(i64),

    #[error("Damage level must be between 0 and 4, got {0}")]
    InvalidDamageLevel(i64),

    #[error("Country already chosen: {0}")]
    AlreadySet(Country),

    #[error("Player has not chosen a country")]
    NoCountry,

    #[error("Target has not chosen a country")]
    TargetNoCountry,

    #[error("Cannot attack yourself")]
    SelfTarget,

    #[error("Attacker has no forces")]
    NoForces,

    #[error("Insufficient funds: need {required}, have {available}")]
    InsufficientFunds { required: i64, available: i64 },

    #[error("Insufficient munitions: need {required}, have {available}")]
    InsufficientResource { required: u64, available: u64 },

    #[error("Region not controlled: {0}")]
    NotControlled(String),

    #[error("Player {0} is not authorized for this operation")]
    Unauthorized(PlayerId),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),
}

impl GameError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GameError::InvalidCountry(_)
            | GameError::InvalidSystem(_)
            | GameError::UnknownUnit(_)
            | GameError::UnknownRegion(_)
            | GameError::InvalidAmount(_)
            | GameError::InvalidDamageLevel(_)
            | GameError::ConfigError(_) => ErrorCategory::Validation,
            GameError::AlreadySet(_)
            | GameError::NoCountry
            | GameError::TargetNoCountry
            | GameError::SelfTarget
            | GameError::NoForces
            | GameError::InsufficientFunds { .. }
            | GameError::InsufficientResource { .. }
            | GameError::NotControlled(_) => ErrorCategory::Precondition,
            GameError::Unauthorized(_) => ErrorCategory::Authorization,
            GameError::IoError(_) | GameError::SerdeError(_) => ErrorCategory::Storage,
        }
    }
}

pub type Result<T> = std::result::Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(GameError::InvalidAmount(0).category(), ErrorCategory::Validation);
        assert_eq!(GameError::NoForces.category(), ErrorCategory::Precondition);
        assert_eq!(
            GameError::Unauthorized(PlayerId(3)).category(),
            ErrorCategory::Authorization
        );
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        assert_eq!(GameError::from(io).category(), ErrorCategory::Storage);
    }

    #[test]
    fn test_insufficient_funds_message() {
        let err = GameError::InsufficientFunds {
            required: 2000,
            available: 1500,
        };
        assert_eq!(err.to_string(), "Insufficient funds: need 2000, have 1500");
    }
}
