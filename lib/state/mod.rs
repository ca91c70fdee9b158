//! Per-outcome market state, owned by the caller.

use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    math::constants::CurveConstants,
    trade::{Side, TradeResult},
    types::{Lamports, Shares},
};

pub mod markets;

pub use markets::Market;

/// Supply snapshot of one outcome.
///
/// Only `total_shares_minted` feeds pricing. The reserve fields mirror the
/// on-chain account layout; the curve ignores the virtual ones.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize,
)]
#[serde(default)]
pub struct MarketState {
    pub total_shares_minted: Shares,
    pub virtual_sol_reserves: Lamports,
    pub virtual_share_reserves: Shares,
    /// Settlement asset held in the vault for this outcome.
    pub real_sol_reserves: Lamports,
}

impl MarketState {
    pub fn new(total_shares_minted: Shares) -> Self {
        Self {
            total_shares_minted,
            ..Self::default()
        }
    }

    /// Apply a simulated trade.
    ///
    /// Rejects results simulated against a different supply, which is the
    /// lost update two unserialized writers would otherwise produce. Buys
    /// add the net amount to the vault; sells remove the gross proceeds and
    /// fail if the vault cannot cover them.
    pub fn apply(
        &mut self,
        constants: &CurveConstants,
        result: &TradeResult,
    ) -> Result<(), Error> {
        self.check(constants, result)?;
        self.real_sol_reserves = match result.side {
            Side::Buy => self.real_sol_reserves.saturating_add(result.net_amount),
            Side::Sell => withdraw(self.real_sol_reserves, result.gross_amount)?,
        };
        self.total_shares_minted = result.supply_after;
        Ok(())
    }

    /// Move supply only, leaving reserves to a vault held elsewhere.
    pub(crate) fn apply_supply(
        &mut self,
        constants: &CurveConstants,
        result: &TradeResult,
    ) -> Result<(), Error> {
        self.check(constants, result)?;
        self.total_shares_minted = result.supply_after;
        Ok(())
    }

    fn check(
        &self,
        constants: &CurveConstants,
        result: &TradeResult,
    ) -> Result<(), Error> {
        if result.supply_before != self.total_shares_minted {
            return Err(Error::StaleSnapshot {
                expected: result.supply_before,
                actual: self.total_shares_minted,
            });
        }
        if result.supply_after > constants.total_supply {
            return Err(Error::SupplyOutOfRange {
                supply: result.supply_after,
                total: constants.total_supply,
            });
        }
        Ok(())
    }
}

/// Take a sell's gross proceeds out of `vault`.
pub(crate) fn withdraw(
    vault: Lamports,
    refund: Lamports,
) -> Result<Lamports, Error> {
    vault.checked_sub(refund).ok_or(Error::InsufficientReserves {
        requested: refund,
        available: vault,
    })
}
