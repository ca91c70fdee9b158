//! Shares-from-SOL solver.
//!
//! Inverts [`BondingCurve::cost`] by bisection over the end supply. Valid
//! because the cost is non-decreasing in its second argument, which holds
//! as long as the spot price is non-decreasing in supply.

use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    math::curve::BondingCurve,
    types::{Lamports, Shares},
};

/// Iteration cap of the on-chain search.
pub const SOLVER_MAX_ITERATIONS: u32 = 50;

/// Bracket width at which the search stops: 0.001 share.
pub const SOLVER_TOLERANCE: Shares = Shares::from_units(1_000_000);

/// Search bounds, exposed so agreement with the program can be asserted
/// at a chosen precision.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct SolverConfig {
    pub max_iterations: u32,
    pub tolerance: Shares,
}

impl SolverConfig {
    pub const DEFAULT: Self = Self {
        max_iterations: SOLVER_MAX_ITERATIONS,
        tolerance: SOLVER_TOLERANCE,
    };
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Outcome of a solve.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Solution {
    /// Shares obtainable for at most the requested amount.
    pub shares: Shares,
    /// Bisection steps taken.
    pub iterations: u32,
    /// The bracket shrank below tolerance (or no search was needed).
    pub converged: bool,
    /// The amount buys out the remaining supply; `shares` is clamped to it.
    pub exhausted: bool,
    /// Final bracket width.
    pub bracket: Shares,
}

impl Solution {
    fn exact(shares: Shares, exhausted: bool) -> Self {
        Self {
            shares,
            iterations: 0,
            converged: true,
            exhausted,
            bracket: Shares::ZERO,
        }
    }

    /// Strict view: a non-converged search becomes
    /// [`Error::NonConvergent`].
    pub fn into_result(self) -> Result<Shares, Error> {
        if self.converged {
            Ok(self.shares)
        } else {
            Err(Error::NonConvergent {
                iterations: self.iterations,
                bracket: self.bracket,
            })
        }
    }
}

/// Bisect for the largest end supply whose cost from `supply` stays below
/// `net_amount`.
///
/// Never fails. When the iteration cap is hit first the best bracket
/// estimate is kept and `converged` is false.
pub fn solve(
    curve: &BondingCurve,
    supply: Shares,
    net_amount: Lamports,
) -> Solution {
    let total_supply = curve.constants().total_supply;
    let config = curve.solver_config();

    if net_amount.is_zero() {
        return Solution::exact(Shares::ZERO, false);
    }
    if supply >= total_supply {
        return Solution::exact(Shares::ZERO, true);
    }
    if curve.cost(supply, total_supply) < net_amount {
        tracing::warn!(
            %supply,
            %net_amount,
            "net amount buys out the remaining supply"
        );
        return Solution::exact(total_supply.saturating_sub(supply), true);
    }

    let mut low = supply.units();
    let mut high = total_supply.units();
    let tolerance = config.tolerance.units();
    let mut iterations = 0;

    // Bisect before testing the bracket, so a narrow one still moves `low`
    while iterations < config.max_iterations {
        iterations += 1;
        let mid = low + (high - low) / 2;
        if curve.cost(supply, Shares::from_units(mid)) < net_amount {
            low = mid;
        } else {
            high = mid;
        }
        if high - low < tolerance {
            break;
        }
    }
    let converged = high - low < tolerance;

    let solution = Solution {
        shares: Shares::from_units(low - supply.units()),
        iterations,
        converged,
        exhausted: false,
        bracket: Shares::from_units(high - low),
    };
    if converged {
        tracing::trace!(
            %supply,
            %net_amount,
            shares = %solution.shares,
            iterations,
            "solved shares for amount"
        );
    } else {
        tracing::warn!(
            %supply,
            %net_amount,
            iterations,
            bracket = %solution.bracket,
            "share search hit the iteration cap; using bracket estimate"
        );
    }
    solution
}
