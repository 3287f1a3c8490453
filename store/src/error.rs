use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("insufficient funds in {account}: need {needed} {denom}, have {available}")]
    InsufficientFunds {
        account: String,
        denom: String,
        needed: u128,
        available: u128,
    },

    #[error("key not found: {0}")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}
