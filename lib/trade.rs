//! Trade previews: fee extraction, curve cost and derived metrics.
//!
//! Simulations never touch the state they are given. A caller applies the
//! result with [`MarketState::apply`] while holding exclusive access to
//! that outcome.

use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    math::{
        constants::{ENDGAME_SUPPLY_PCT, HIGH_SLIPPAGE_IMPACT_PCT},
        curve::BondingCurve,
        ignition::IgnitionStage,
    },
    state::MarketState,
    types::{Lamports, Price, Shares},
};

#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    Hash,
    PartialEq,
    Serialize,
    strum::Display,
)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Side {
    Buy,
    Sell,
}

/// Trading fee and its accounting split. The core moves no funds.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct FeeBreakdown {
    pub total: Lamports,
    pub protocol: Lamports,
    pub creator: Lamports,
}

impl FeeBreakdown {
    /// Split 50/50; an odd lamport goes to the creator.
    pub fn split(total: Lamports) -> Self {
        let protocol = Lamports::new(total.get() / 2);
        Self {
            total,
            protocol,
            creator: total.saturating_sub(protocol),
        }
    }
}

/// Preview of one trade against a supply snapshot.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TradeResult {
    pub side: Side,
    /// Supply the trade was simulated against.
    pub supply_before: Shares,
    pub supply_after: Shares,
    /// Shares minted (buy) or burned (sell).
    pub shares: Shares,
    /// Amount paid on a buy, curve proceeds before fees on a sell.
    pub gross_amount: Lamports,
    pub fees: FeeBreakdown,
    /// Net invested on a buy, net returned on a sell.
    pub net_amount: Lamports,
    pub average_price: Price,
    pub start_price: Price,
    pub end_price: Price,
    pub price_impact_pct: f64,
    pub market_cap: Lamports,
    pub endgame: bool,
    pub high_slippage: bool,
    pub ignition_stage: IgnitionStage,
    pub ignition_progress: f64,
    pub solver_iterations: u32,
    pub converged: bool,
}

impl TradeResult {
    /// Slippage guard for buys, as the program's `min_shares_out`.
    pub fn ensure_min_shares(&self, minimum: Shares) -> Result<(), Error> {
        if self.shares < minimum {
            return Err(Error::SharesBelowMinimum {
                minimum,
                actual: self.shares,
            });
        }
        Ok(())
    }

    /// Slippage guard for sells.
    pub fn ensure_min_proceeds(&self, minimum: Lamports) -> Result<(), Error> {
        if self.net_amount < minimum {
            return Err(Error::ProceedsBelowMinimum {
                minimum,
                actual: self.net_amount,
            });
        }
        Ok(())
    }

    pub fn is_noop(&self) -> bool {
        self.shares.is_zero() && self.gross_amount.is_zero()
    }
}

/// Amounts settled by a trade before metrics are derived.
struct Fill {
    side: Side,
    supply_before: Shares,
    supply_after: Shares,
    shares: Shares,
    gross_amount: Lamports,
    fees: FeeBreakdown,
    net_amount: Lamports,
    average_price: Price,
    solver_iterations: u32,
    converged: bool,
}

impl BondingCurve {
    fn check_supply(&self, supply: Shares) -> Result<(), Error> {
        let total = self.constants().total_supply;
        if supply > total {
            return Err(Error::SupplyOutOfRange { supply, total });
        }
        Ok(())
    }

    fn finish(&self, fill: Fill) -> TradeResult {
        let total_supply = self.constants().total_supply;
        let start_price = self.spot_price(fill.supply_before);
        let end_price = self.spot_price(fill.supply_after);
        let price_impact_pct = start_price.percent_change_to(end_price);
        let endgame = fill.supply_after.units().saturating_mul(100)
            > total_supply.units().saturating_mul(ENDGAME_SUPPLY_PCT);
        TradeResult {
            side: fill.side,
            supply_before: fill.supply_before,
            supply_after: fill.supply_after,
            shares: fill.shares,
            gross_amount: fill.gross_amount,
            fees: fill.fees,
            net_amount: fill.net_amount,
            average_price: fill.average_price,
            start_price,
            end_price,
            price_impact_pct,
            market_cap: self.market_cap(fill.supply_after),
            endgame,
            high_slippage: price_impact_pct.abs() > HIGH_SLIPPAGE_IMPACT_PCT,
            ignition_stage: self.classify(fill.supply_after),
            ignition_progress: self.ignition_progress(fill.supply_after),
            solver_iterations: fill.solver_iterations,
            converged: fill.converged,
        }
    }

    fn unchanged(&self, side: Side, supply: Shares) -> TradeResult {
        self.finish(Fill {
            side,
            supply_before: supply,
            supply_after: supply,
            shares: Shares::ZERO,
            gross_amount: Lamports::ZERO,
            fees: FeeBreakdown::default(),
            net_amount: Lamports::ZERO,
            average_price: Price::ZERO,
            solver_iterations: 0,
            converged: true,
        })
    }

    /// Preview spending `amount` (fee included) on shares.
    ///
    /// A zero amount yields a zero-effect result. An amount whose net part
    /// exceeds the cost of every remaining share is rejected with
    /// [`Error::SupplyExhausted`] rather than reported as partly invested.
    pub fn simulate_buy(
        &self,
        amount: Lamports,
        state: &MarketState,
    ) -> Result<TradeResult, Error> {
        let supply = state.total_shares_minted;
        self.check_supply(supply)?;
        if amount.is_zero() {
            return Ok(self.unchanged(Side::Buy, supply));
        }

        let fees = FeeBreakdown::split(amount.bps(self.constants().fees.entry_bps));
        let net_amount = amount.saturating_sub(fees.total);

        let total_supply = self.constants().total_supply;
        let max_cost = self.cost(supply, total_supply);
        if net_amount > max_cost {
            return Err(Error::SupplyExhausted {
                requested: net_amount,
                max_cost,
                available: total_supply.saturating_sub(supply),
            });
        }

        let solution = self.shares_for(supply, net_amount);
        let result = self.finish(Fill {
            side: Side::Buy,
            supply_before: supply,
            supply_after: supply.saturating_add(solution.shares),
            shares: solution.shares,
            gross_amount: amount,
            fees,
            net_amount,
            average_price: Price::average(amount, solution.shares),
            solver_iterations: solution.iterations,
            converged: solution.converged,
        });
        tracing::debug!(
            %amount,
            shares = %result.shares,
            supply_after = %result.supply_after,
            impact_pct = result.price_impact_pct,
            "simulated buy"
        );
        Ok(result)
    }

    /// Preview burning `shares` back into the curve.
    ///
    /// Proceeds are the trapezoid cost of the supply being removed, less
    /// the exit fee.
    pub fn simulate_sell(
        &self,
        shares: Shares,
        state: &MarketState,
    ) -> Result<TradeResult, Error> {
        let supply = state.total_shares_minted;
        self.check_supply(supply)?;
        if shares.is_zero() {
            return Ok(self.unchanged(Side::Sell, supply));
        }
        let Some(supply_after) = supply.checked_sub(shares) else {
            return Err(Error::InsufficientSupply {
                requested: shares,
                available: supply,
            });
        };

        let gross_amount = self.cost(supply_after, supply);
        let fees =
            FeeBreakdown::split(gross_amount.bps(self.constants().fees.exit_bps));
        let net_amount = gross_amount.saturating_sub(fees.total);
        let result = self.finish(Fill {
            side: Side::Sell,
            supply_before: supply,
            supply_after,
            shares,
            gross_amount,
            fees,
            net_amount,
            average_price: Price::average(net_amount, shares),
            solver_iterations: 0,
            converged: true,
        });
        tracing::debug!(
            %shares,
            %gross_amount,
            %net_amount,
            supply_after = %result.supply_after,
            "simulated sell"
        );
        Ok(result)
    }
}

/// [`BondingCurve::simulate_buy`] on the deployed curve.
pub fn simulate_buy(
    amount: Lamports,
    state: &MarketState,
) -> Result<TradeResult, Error> {
    BondingCurve::DEFAULT.simulate_buy(amount, state)
}

/// [`BondingCurve::simulate_sell`] on the deployed curve.
pub fn simulate_sell(
    shares: Shares,
    state: &MarketState,
) -> Result<TradeResult, Error> {
    BondingCurve::DEFAULT.simulate_sell(shares, state)
}
