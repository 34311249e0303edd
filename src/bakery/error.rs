use std::num::ParseIntError;

use thiserror::Error;

use super::Cookies;

/// Rejected economy operations. A rejected operation never mutates state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EconomyError {
    #[error("Not enough cookies: need {cost}, have {available}")]
    InsufficientFunds { cost: Cookies, available: Cookies },

    #[error("No producer named '{id}'")]
    UnknownTarget { id: String },

    #[error("No shop item named '{id}'")]
    UnknownShopItem { id: String },

    #[error("Shop item '{id}' was already purchased")]
    AlreadyPurchased { id: String },

    #[error("Boost multiplier must be at least 1")]
    InvalidMultiplier,

    #[error("Producer '{id}' is at its maximum level")]
    MaxLevel { id: String },
}

pub type EconomyResult<T> = Result<T, EconomyError>;

/// Persistence failures. The save gateway logs these and recovers; they never
/// reach the game session.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Corrupt snapshot: '{key}' is not valid JSON: {source}")]
    CorruptSnapshot {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Corrupt snapshot: '{key}' is not an integer: {source}")]
    CorruptNumber {
        key: String,
        #[source]
        source: ParseIntError,
    },

    #[error("Corrupt snapshot: '{key}' claims level {level}, above {max}")]
    LevelOutOfRange { key: String, level: u32, max: u32 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage write failed for '{key}': {reason}")]
    Write { key: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_funds_message_names_amounts() {
        let err = EconomyError::InsufficientFunds {
            cost: 50,
            available: 12,
        };
        assert_eq!(err.to_string(), "Not enough cookies: need 50, have 12");
    }

    #[test]
    fn corrupt_number_keeps_source() {
        let source = "abc".parse::<u64>().unwrap_err();
        let err = SnapshotError::CorruptNumber {
            key: "score".into(),
            source,
        };
        assert!(err.to_string().contains("'score'"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
