//! Error taxonomy of the ledger engine. Nothing here is fatal to the process:
//! every variant is a value the front end renders as a message.

use std::io;

use thiserror::Error;

/// Why a single record line could not be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected 3 fields, found {0}")]
    FieldCount(usize),

    #[error("balance {0:?} is not a decimal number")]
    Balance(String),
}

/// A business rule refused the requested amount; the account is untouched.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("amount must be greater than zero")]
    NonPositiveAmount,

    #[error("amount must be a multiple of 50,000")]
    InvalidDenomination,

    #[error("insufficient balance")]
    InsufficientFunds,

    #[error("balance would exceed the largest amount the ledger can hold")]
    BalanceOverflow,
}

#[derive(Error, Debug)]
pub enum Error {
    /// Unknown PIN and name mismatch deliberately share one message.
    #[error("wrong PIN or user not found")]
    AuthFailure,

    #[error("transaction rejected: {0}")]
    Rejected(#[from] Rejection),

    #[error("could not update user data: {0}")]
    Persist(#[source] io::Error),

    #[error("could not print receipt: {0}")]
    Receipt(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
