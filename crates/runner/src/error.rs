use bourse_core::{MarketError, Money, Quantity};
use bourse_ports::StoreError;
use thiserror::Error;

/// Engine errors
///
/// Structural errors (duplicate/unknown/invalid) are hard failures with
/// nothing applied. Trading errors (insufficient funds/holdings, zero
/// quantity) are declines that strategies ignore.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Instrument already exists: {0}")]
    DuplicateInstrument(String),

    #[error("Instrument not found: {0}")]
    UnknownInstrument(String),

    #[error("Invalid instrument {code}: {reason}")]
    InvalidInstrument { code: String, reason: String },

    #[error("Account already exists: {0}")]
    DuplicateAccount(String),

    #[error("Account not found: {0}")]
    UnknownAccount(String),

    #[error(
        "Insufficient funds for {account}: need {required}, available {available}"
    )]
    InsufficientFunds {
        account: String,
        required: Money,
        available: Money,
    },

    #[error(
        "Insufficient holdings for {account} in {instrument}: need {required}, held {held}"
    )]
    InsufficientHoldings {
        account: String,
        instrument: String,
        required: Quantity,
        held: Quantity,
    },

    #[error("Order quantity must be positive")]
    InvalidQuantity,

    #[error("Persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

impl EngineError {
    /// Whether this is an expected trading decline rather than a failure
    pub fn is_decline(&self) -> bool {
        matches!(
            self,
            EngineError::InsufficientFunds { .. }
                | EngineError::InsufficientHoldings { .. }
                | EngineError::InvalidQuantity
        )
    }
}

impl From<MarketError> for EngineError {
    fn from(err: MarketError) -> Self {
        match err {
            MarketError::DuplicateInstrument(code) => EngineError::DuplicateInstrument(code),
            MarketError::UnknownInstrument(code) => EngineError::UnknownInstrument(code),
            MarketError::InvalidInstrument { code, reason } => {
                EngineError::InvalidInstrument { code, reason }
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
