//! Three-phase ignition bonding curve.
//!
//! ```text
//! price
//!   ^                                        ___--- price_max (asymptote)
//!   |                                  __---
//!   |                            __---          phase 3: clamped sigmoid
//!   |                      __---
//!   |                  _--
//!   |               _-'   P90                   phase 2: quadratic bridge
//!   |            .-'
//!   |     ___.--' P50                           phase 1: linear ramp
//!   | .--'
//!   +---------+-----------+----------------------------> effective supply
//!   0     phase1_end   phase2_end
//! ```
//!
//! All evaluation happens in `u128` fixed point with floor rounding, the
//! way the on-chain program evaluates it.

use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    math::{
        constants::{CurveConstants, SIGMOID_CLAMP, STEEPNESS_SCALE},
        fixed_point::mul_div,
        ignition::{self, IgnitionStage},
        solver::{self, Solution, SolverConfig},
    },
    types::{EffectiveSupply, Lamports, PRICE_SCALE, Price, SHARE_SCALE, Shares},
};

/// Fixed-point scale of the bridge-phase interpolation ratio.
const RATIO_SCALE: u128 = 1_000_000_000_000_000_000;

/// Normalized sigmoid exponent at which the price reaches `price_max`.
const SIGMOID_FULL: u128 = SIGMOID_CLAMP * STEEPNESS_SCALE;

/// Pricing phase of an effective supply.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Phase {
    Linear,
    Bridge,
    Sigmoid,
}

/// The pricing engine: validated constants plus solver settings.
///
/// Stateless and cheap to copy; every method is a pure function of its
/// arguments.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BondingCurve {
    constants: CurveConstants,
    solver: SolverConfig,
}

impl Default for BondingCurve {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl BondingCurve {
    /// The deployed curve.
    pub const DEFAULT: Self = Self {
        constants: CurveConstants::DEFAULT,
        solver: SolverConfig::DEFAULT,
    };

    pub fn new(constants: CurveConstants) -> Result<Self, Error> {
        constants.validate()?;
        Ok(Self {
            constants,
            solver: SolverConfig::DEFAULT,
        })
    }

    pub fn with_solver(self, solver: SolverConfig) -> Self {
        Self { solver, ..self }
    }

    pub fn constants(&self) -> &CurveConstants {
        &self.constants
    }

    pub fn solver_config(&self) -> &SolverConfig {
        &self.solver
    }

    /// Marginal price of the next share at raw `supply`.
    pub fn spot_price(&self, supply: Shares) -> Price {
        self.price_at(self.constants.effective_supply(supply))
    }

    /// Marginal price at an effective supply.
    pub fn price_at(&self, effective: EffectiveSupply) -> Price {
        let c = &self.constants;
        let supply = effective.units();
        let phase1_end = c.phase1_end.units();
        let phase2_end = c.phase2_end.units();
        let start = c.price_start.units();
        let p50 = c.price_phase1_end.units();
        let p90 = c.price_phase2_end.units();

        let price = match self.phase_of(effective) {
            Phase::Linear => {
                // P = P_START + (P50 - P_START) * s / phase1_end
                start + mul_div(p50 - start, supply, phase1_end)
            }
            Phase::Bridge => {
                // P = P50 + (P90 - P50) * t^2
                let width = phase2_end - phase1_end;
                let progress = supply - phase1_end;
                let partial = mul_div(p90 - p50, progress, width);
                p50 + mul_div(partial, progress, width)
            }
            Phase::Sigmoid => {
                // P = P90 + (P_MAX - P90) * min(k, 1e9) / 1e9
                let x = supply - phase2_end;
                let k = mul_div(x, c.sigmoid_steepness_nanos, SHARE_SCALE)
                    .min(SIGMOID_FULL);
                p90 + mul_div(c.price_max.units() - p90, k, SIGMOID_FULL)
            }
        };
        Price::from_units(price)
    }

    pub fn phase_of(&self, effective: EffectiveSupply) -> Phase {
        let supply = effective.units();
        if supply <= self.constants.phase1_end.units() {
            Phase::Linear
        } else if supply <= self.constants.phase2_end.units() {
            Phase::Bridge
        } else {
            Phase::Sigmoid
        }
    }

    /// Cost of moving supply from `supply_old` to `supply_new`.
    ///
    /// Two-point trapezoid, exactly as the program computes it:
    /// `floor((P(old) + P(new)) / 2) * (new - old)`. Returns zero when
    /// `supply_new <= supply_old`.
    pub fn cost(&self, supply_old: Shares, supply_new: Shares) -> Lamports {
        if supply_new <= supply_old {
            return Lamports::ZERO;
        }
        let p_old = self.spot_price(supply_old).units();
        let p_new = self.spot_price(supply_new).units();
        let avg_price = p_old.saturating_add(p_new) / 2;
        let delta = supply_new.units() - supply_old.units();
        Lamports::saturating_from_u128(mul_div(avg_price, delta, PRICE_SCALE))
    }

    /// Shares that `net_amount` buys starting from `supply`.
    pub fn shares_for(&self, supply: Shares, net_amount: Lamports) -> Solution {
        solver::solve(self, supply, net_amount)
    }

    /// Raw supply at which the spot price reaches `price`.
    ///
    /// Advisory only, never used to settle a trade. Prices below the
    /// price at zero raw supply map to zero; prices at or above the cap
    /// map to the total supply.
    pub fn supply_for_price(&self, price: Price) -> Shares {
        let c = &self.constants;
        let target = price.units();
        let start = c.price_start.units();
        let p50 = c.price_phase1_end.units();
        let p90 = c.price_phase2_end.units();
        let max = c.price_max.units();

        if target < start {
            return Shares::ZERO;
        }
        if target >= max {
            return c.total_supply;
        }

        let effective = if target <= p50 {
            mul_div(target - start, c.phase1_end.units(), p50 - start)
        } else if target <= p90 {
            let width = c.phase2_end.units() - c.phase1_end.units();
            let ratio = mul_div(target - p50, RATIO_SCALE, p90 - p50);
            let t = (ratio * RATIO_SCALE).isqrt();
            c.phase1_end.units() + mul_div(t, width, RATIO_SCALE)
        } else {
            let k = mul_div(target - p90, SIGMOID_FULL, max - p90);
            let x = mul_div(k, SHARE_SCALE, c.sigmoid_steepness_nanos);
            c.phase2_end.units().saturating_add(x)
        };

        let raw = effective.saturating_sub(c.virtual_offset.units());
        Shares::from_units(raw).min(c.total_supply)
    }

    /// Stage label of a raw supply.
    pub fn classify(&self, supply: Shares) -> IgnitionStage {
        ignition::classify(&self.constants, supply)
    }

    /// Percent of the way from zero to phase 3, on raw supply.
    pub fn ignition_progress(&self, supply: Shares) -> f64 {
        ignition::progress(&self.constants, supply)
    }

    /// Value of `supply` at the current spot price.
    pub fn market_cap(&self, supply: Shares) -> Lamports {
        self.spot_price(supply).value_of(supply)
    }
}

/// [`BondingCurve::spot_price`] on the deployed curve.
pub fn spot_price(supply: Shares) -> Price {
    BondingCurve::DEFAULT.spot_price(supply)
}

/// [`BondingCurve::cost`] on the deployed curve.
pub fn cost(supply_old: Shares, supply_new: Shares) -> Lamports {
    BondingCurve::DEFAULT.cost(supply_old, supply_new)
}

/// [`BondingCurve::supply_for_price`] on the deployed curve.
pub fn supply_for_price(price: Price) -> Shares {
    BondingCurve::DEFAULT.supply_for_price(price)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::math::constants::{
        PHASE1_END, PHASE2_END, PRICE_MAX, PRICE_PHASE1_END,
        PRICE_PHASE2_END, PRICE_START, TOTAL_SUPPLY, VIRTUAL_OFFSET,
    };

    fn whole(shares: u64) -> Shares {
        Shares::from_whole(shares)
    }

    #[test]
    fn test_spot_price_at_zero_supply() {
        let price = spot_price(Shares::ZERO);
        assert_eq!(price, Price::from_units(1_080_000_000_000));
        assert_relative_eq!(price.to_sol(), 0.00000108, max_relative = 1e-12);
    }

    #[test]
    fn test_spot_price_phase_boundaries_are_exact() {
        let p1 = PHASE1_END.checked_sub(VIRTUAL_OFFSET).unwrap();
        let p2 = PHASE2_END.checked_sub(VIRTUAL_OFFSET).unwrap();
        assert_eq!(p1, whole(80_000_000));
        assert_eq!(p2, whole(180_000_000));
        assert_eq!(spot_price(p1), PRICE_PHASE1_END);
        assert_eq!(spot_price(p2), PRICE_PHASE2_END);
    }

    #[test]
    fn test_spot_price_sigmoid_regime() {
        let price = spot_price(whole(980_000_000));
        assert_relative_eq!(price.to_sol(), 0.000382, max_relative = 1e-4);
        // 0.000025 + 0.949975 * 0.000376
        assert_eq!(price, Price::from_units(382_190_600_000_000));
    }

    #[test]
    fn test_spot_price_is_continuous_across_boundaries() {
        let curve = BondingCurve::DEFAULT;
        for boundary in [PHASE1_END, PHASE2_END] {
            let raw = boundary.checked_sub(VIRTUAL_OFFSET).unwrap();
            let at = curve.spot_price(raw);
            let after = curve.spot_price(Shares::from_units(raw.units() + 1));
            let before = curve.spot_price(Shares::from_units(raw.units() - 1));
            assert!(before <= at && at <= after);
            // One share unit moves the price by far less than a nano-SOL
            assert!(after.units() - at.units() < 1_000_000);
        }
    }

    #[test]
    fn test_spot_price_is_monotonic_on_a_grid() {
        let curve = BondingCurve::DEFAULT;
        let step = TOTAL_SUPPLY.units() / 10_000;
        let mut prev = curve.spot_price(Shares::ZERO);
        for i in 1..=10_000 {
            let price = curve.spot_price(Shares::from_units(i * step));
            assert!(price >= prev, "price fell at step {i}");
            prev = price;
        }
    }

    #[test]
    fn test_spot_price_never_exceeds_cap() {
        let price = spot_price(Shares::from_units(u128::MAX / 2));
        assert_eq!(price, PRICE_MAX);
        assert!(spot_price(Shares::ZERO) >= PRICE_START);
    }

    #[test]
    fn test_phase_of_effective_supply() {
        let curve = BondingCurve::DEFAULT;
        let c = curve.constants();
        assert_eq!(
            curve.phase_of(c.effective_supply(Shares::ZERO)),
            Phase::Linear
        );
        assert_eq!(
            curve.phase_of(c.effective_supply(whole(80_000_000))),
            Phase::Linear
        );
        assert_eq!(
            curve.phase_of(c.effective_supply(whole(80_000_001))),
            Phase::Bridge
        );
        assert_eq!(
            curve.phase_of(c.effective_supply(whole(180_000_001))),
            Phase::Sigmoid
        );
    }

    #[test]
    fn test_cost_trapezoid_matches_hand_computation() {
        // P(0) = 1.08e-6, P(1M) = 1.129e-6, avg 1.1045e-6 * 1M shares
        assert_eq!(
            cost(Shares::ZERO, whole(1_000_000)),
            Lamports::new(1_104_500_000)
        );
    }

    #[test]
    fn test_cost_is_zero_when_supply_does_not_grow() {
        assert_eq!(cost(whole(10), whole(10)), Lamports::ZERO);
        assert_eq!(cost(whole(10), whole(5)), Lamports::ZERO);
    }

    #[test]
    fn test_cost_uses_two_points_only() {
        // Across the bridge the trapezoid over-estimates the convex
        // integral; a split evaluation differs from a single one.
        let a = whole(70_000_000);
        let b = whole(130_000_000);
        let c = whole(190_000_000);
        let whole_span = cost(a, c);
        let split = cost(a, b).get() + cost(b, c).get();
        assert_ne!(whole_span.get(), split);
    }

    #[test]
    fn test_supply_for_price_round_trips_in_phases_one_and_two() {
        let curve = BondingCurve::DEFAULT;
        let lowest = curve.spot_price(Shares::ZERO).units();
        let highest = PRICE_PHASE2_END.units();
        let step = (highest - lowest) / 500;
        for i in 0..=500 {
            let price = Price::from_units(lowest + i * step);
            let round_trip = curve.spot_price(curve.supply_for_price(price));
            assert_relative_eq!(
                round_trip.to_sol(),
                price.to_sol(),
                max_relative = 1e-9
            );
        }
    }

    #[test]
    fn test_supply_for_price_sigmoid_has_bounded_error() {
        let curve = BondingCurve::DEFAULT;
        let price = Price::from_sol(0.0002).unwrap();
        let round_trip = curve.spot_price(curve.supply_for_price(price));
        assert_relative_eq!(round_trip.to_sol(), 0.0002, max_relative = 1e-6);
    }

    #[test]
    fn test_supply_for_price_clamps() {
        assert_eq!(supply_for_price(Price::ZERO), Shares::ZERO);
        assert_eq!(supply_for_price(PRICE_START), Shares::ZERO);
        assert_eq!(supply_for_price(PRICE_MAX), TOTAL_SUPPLY);
        // Reachable only past the total supply
        assert_eq!(supply_for_price(Price::from_sol(0.5).unwrap()), TOTAL_SUPPLY);
    }

    #[test]
    fn test_supply_for_price_at_anchors() {
        assert_eq!(supply_for_price(PRICE_PHASE1_END), whole(80_000_000));
        assert_eq!(supply_for_price(PRICE_PHASE2_END), whole(180_000_000));
    }

    #[test]
    fn test_new_rejects_invalid_constants() {
        let constants = CurveConstants {
            price_start: Price::ZERO,
            ..CurveConstants::default()
        };
        assert!(BondingCurve::new(constants).is_err());
    }

    #[test]
    fn test_market_cap() {
        let supply = whole(80_000_000);
        // 80M shares at 0.000005 SOL
        assert_eq!(
            BondingCurve::DEFAULT.market_cap(supply),
            Lamports::from_sol_whole(400)
        );
    }
}
