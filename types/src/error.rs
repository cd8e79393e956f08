//! Parse errors for the fundamental types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid account id: {0}")]
    InvalidAccountId(String),

    #[error("invalid rate: {0}")]
    InvalidRate(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}
