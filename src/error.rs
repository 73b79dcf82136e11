use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::account::AccountId;

/// Errors surfaced by the event core through command completions.
#[derive(Error, Debug, PartialEq)]
pub enum TransferError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("account {0} not present in storage")]
    NotFound(AccountId),
    #[error("insufficient funds on account {account}: available {available}, requested {requested}")]
    InsufficientFunds {
        account: AccountId,
        available: Decimal,
        requested: Decimal,
    },
    #[error("not enough resource capacity to process request")]
    Overloaded,
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, TransferError>;
