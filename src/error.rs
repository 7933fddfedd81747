use thiserror::Error;

/// Every way a game or ledger operation can fail.
///
/// Validation and business-rule variants are expected outcomes and carry
/// enough detail for the mini-app to update its UI without re-querying.
#[derive(Error, Debug)]
pub enum GameError {
    #[error("player id is missing or invalid")]
    InvalidPlayerId,

    #[error("{0}")]
    Validation(String),

    #[error("mining is on cooldown, {remaining_ms} ms left")]
    Cooldown { remaining_ms: i64 },

    #[error("rig is already at the maximum level {level}")]
    MaxLevel { level: i64 },

    #[error("not enough oil: need {cost}, have {oil}")]
    InsufficientOil { cost: f64, oil: f64 },

    #[error("not enough black oil: requested {requested}, have {available}")]
    InsufficientBlackOil { requested: i64, available: i64 },

    #[error("already checked in today, next check-in in {remaining_ms} ms")]
    AlreadyCheckedIn { remaining_ms: i64 },

    #[error("minimum withdrawal is {minimum} xu")]
    WithdrawalTooSmall { amount: i64, minimum: i64 },

    #[error("phone number must look like {prefix}xxxxxxxxx")]
    InvalidContact { prefix: &'static str },

    #[error("{field} value {value} is implausibly large")]
    ImplausibleValue {
        field: &'static str,
        value: f64,
        max: f64,
    },

    #[error("identity signature is missing or does not match")]
    InvalidSignature,

    #[error("too many concurrent updates for this player, try again")]
    Contended,

    #[error("storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}

impl GameError {
    pub fn code(&self) -> &'static str {
        match self {
            GameError::InvalidPlayerId => "INVALID_PLAYER_ID",
            GameError::Validation(_) => "VALIDATION_ERROR",
            GameError::Cooldown { .. } => "COOLDOWN",
            GameError::MaxLevel { .. } => "MAX_LEVEL",
            GameError::InsufficientOil { .. } => "INSUFFICIENT_OIL",
            GameError::InsufficientBlackOil { .. } => "INSUFFICIENT_BLACK_OIL",
            GameError::AlreadyCheckedIn { .. } => "ALREADY_CHECKED_IN",
            GameError::WithdrawalTooSmall { .. } => "WITHDRAWAL_TOO_SMALL",
            GameError::InvalidContact { .. } => "INVALID_CONTACT",
            GameError::ImplausibleValue { .. } => "IMPLAUSIBLE_VALUE",
            GameError::InvalidSignature => "INVALID_SIGNATURE",
            GameError::Contended => "CONTENDED",
            GameError::Storage(_) => "INTERNAL_ERROR",
        }
    }

    /// Amount of oil still missing for an `InsufficientOil` rejection.
    pub fn shortfall(&self) -> Option<f64> {
        match self {
            GameError::InsufficientOil { cost, oil } => Some((cost - oil).max(0.0)),
            _ => None,
        }
    }
}

pub type GameResult<T> = Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortfall_only_for_insufficient_oil() {
        let err = GameError::InsufficientOil {
            cost: 5000.0,
            oil: 100.0,
        };
        assert_eq!(err.shortfall(), Some(4900.0));
        assert_eq!(GameError::Cooldown { remaining_ms: 5 }.shortfall(), None);
    }

    #[test]
    fn test_checkin_and_black_oil_codes() {
        assert_eq!(
            GameError::AlreadyCheckedIn { remaining_ms: 1 }.code(),
            "ALREADY_CHECKED_IN"
        );
        let err = GameError::InsufficientBlackOil {
            requested: 5,
            available: 2,
        };
        assert_eq!(err.code(), "INSUFFICIENT_BLACK_OIL");
        assert_eq!(err.shortfall(), None);
    }

    #[test]
    fn test_storage_error_wraps_anyhow() {
        let err: GameError = anyhow::anyhow!("disk gone").into();
        assert_eq!(err.code(), "INTERNAL_ERROR");
        assert!(err.to_string().contains("disk gone"));
    }
}
