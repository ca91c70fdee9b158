//! Curve errors

use thiserror::Error;

use crate::{
    math::fixed_point::AmountError,
    types::{Lamports, Shares},
};

#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),
    #[error("invalid curve constants: {reason}")]
    InvalidConstants { reason: String },
    #[error("cannot sell {requested} shares: only {available} minted")]
    InsufficientSupply {
        requested: Shares,
        available: Shares,
    },
    #[error("refund {requested} exceeds vault balance {available}")]
    InsufficientReserves {
        requested: Lamports,
        available: Lamports,
    },
    #[error(
        "invalid outcome index {index}: market has {count} outcomes"
    )]
    InvalidOutcome { index: usize, count: usize },
    #[error(
        "binary search did not converge after {iterations} iterations \
         (bracket width {bracket} shares)"
    )]
    NonConvergent { iterations: u32, bracket: Shares },
    #[error("proceeds {actual} below minimum {minimum}")]
    ProceedsBelowMinimum { minimum: Lamports, actual: Lamports },
    #[error("shares out {actual} below minimum {minimum}")]
    SharesBelowMinimum { minimum: Shares, actual: Shares },
    #[error(
        "trade was simulated against supply {expected} but market supply is \
         {actual}"
    )]
    StaleSnapshot { expected: Shares, actual: Shares },
    #[error(
        "net amount {requested} exceeds {max_cost} needed to buy the \
         remaining {available} shares"
    )]
    SupplyExhausted {
        requested: Lamports,
        max_cost: Lamports,
        available: Shares,
    },
    #[error("supply {supply} outside [0, {total}]")]
    SupplyOutOfRange { supply: Shares, total: Shares },
    #[error("a market needs at least two outcomes, got {count}")]
    TooFewOutcomes { count: usize },
}
