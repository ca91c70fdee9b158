//! Multi-outcome market with one lock per outcome.

use parking_lot::Mutex;

use crate::{
    error::Error,
    math::curve::BondingCurve,
    state::{MarketState, withdraw},
    trade::TradeResult,
    types::{Lamports, Shares},
};

/// A market of two or more outcomes priced on the same curve.
///
/// Each outcome's state sits behind its own mutex, so trades on different
/// outcomes proceed in parallel while trades on one outcome are
/// simulate-then-apply atomic. All outcomes settle against one vault.
/// Locks are taken outcome first, then vault.
#[derive(Debug)]
pub struct Market {
    curve: BondingCurve,
    outcomes: Vec<Mutex<MarketState>>,
    vault: Mutex<Lamports>,
}

impl Market {
    /// A fresh market with `outcome_count` empty outcomes.
    pub fn new(curve: BondingCurve, outcome_count: usize) -> Result<Self, Error> {
        Self::from_states(curve, vec![MarketState::default(); outcome_count])
    }

    /// Restore a market from persisted outcome states.
    ///
    /// Each state's `real_sol_reserves` is pooled into the market vault,
    /// and the states held by the market carry zero reserves from then on.
    pub fn from_states(
        curve: BondingCurve,
        mut states: Vec<MarketState>,
    ) -> Result<Self, Error> {
        if states.len() < 2 {
            return Err(Error::TooFewOutcomes {
                count: states.len(),
            });
        }
        let total = curve.constants().total_supply;
        if let Some(state) =
            states.iter().find(|state| state.total_shares_minted > total)
        {
            return Err(Error::SupplyOutOfRange {
                supply: state.total_shares_minted,
                total,
            });
        }
        let vault = states.iter_mut().fold(Lamports::ZERO, |vault, state| {
            let reserves = std::mem::take(&mut state.real_sol_reserves);
            vault.saturating_add(reserves)
        });
        Ok(Self {
            curve,
            outcomes: states.into_iter().map(Mutex::new).collect(),
            vault: Mutex::new(vault),
        })
    }

    pub fn curve(&self) -> &BondingCurve {
        &self.curve
    }

    pub fn outcome_count(&self) -> usize {
        self.outcomes.len()
    }

    fn outcome(&self, index: usize) -> Result<&Mutex<MarketState>, Error> {
        self.outcomes.get(index).ok_or(Error::InvalidOutcome {
            index,
            count: self.outcomes.len(),
        })
    }

    /// Buy into `outcome`, failing if fewer than `min_shares_out` shares
    /// would be minted.
    pub fn buy(
        &self,
        outcome: usize,
        amount: Lamports,
        min_shares_out: Shares,
    ) -> Result<TradeResult, Error> {
        let mut state = self.outcome(outcome)?.lock();
        let result = self.curve.simulate_buy(amount, &state)?;
        result.ensure_min_shares(min_shares_out)?;
        let mut vault = self.vault.lock();
        state.apply_supply(self.curve.constants(), &result)?;
        *vault = vault.saturating_add(result.net_amount);
        tracing::debug!(
            outcome,
            shares = %result.shares,
            supply = %state.total_shares_minted,
            "applied buy"
        );
        Ok(result)
    }

    /// Sell out of `outcome`, failing if the net proceeds fall below
    /// `min_proceeds` or the vault cannot pay the gross proceeds.
    pub fn sell(
        &self,
        outcome: usize,
        shares: Shares,
        min_proceeds: Lamports,
    ) -> Result<TradeResult, Error> {
        let mut state = self.outcome(outcome)?.lock();
        let result = self.curve.simulate_sell(shares, &state)?;
        result.ensure_min_proceeds(min_proceeds)?;
        let mut vault = self.vault.lock();
        let remaining = withdraw(*vault, result.gross_amount)?;
        state.apply_supply(self.curve.constants(), &result)?;
        *vault = remaining;
        tracing::debug!(
            outcome,
            net_amount = %result.net_amount,
            vault = %remaining,
            supply = %state.total_shares_minted,
            "applied sell"
        );
        Ok(result)
    }

    pub fn snapshot(&self, outcome: usize) -> Result<MarketState, Error> {
        Ok(*self.outcome(outcome)?.lock())
    }

    /// Copies of every outcome's state, in outcome order.
    pub fn states(&self) -> Vec<MarketState> {
        self.outcomes.iter().map(|state| *state.lock()).collect()
    }

    /// Each outcome's spot price over the sum of spot prices.
    pub fn implied_probabilities(&self) -> Vec<f64> {
        let prices: Vec<f64> = self
            .states()
            .iter()
            .map(|state| self.curve.spot_price(state.total_shares_minted).to_sol())
            .collect();
        let sum: f64 = prices.iter().sum();
        prices.iter().map(|price| price / sum).collect()
    }

    /// Settlement asset held across all outcomes.
    pub fn vault_balance(&self) -> Lamports {
        *self.vault.lock()
    }
}
