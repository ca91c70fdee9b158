//! Ignition Curve Constants
//!
//! # Single Source of Truth for All Pricing-Critical Constants
//!
//! Previews computed here must reproduce the on-chain program's arithmetic
//! exactly. Any drift between these values and the deployed program is a
//! correctness bug, so every hard-coded number the curve uses lives in this
//! module.
//!
//! ## Units
//! - Supplies are [`Shares`] (9 decimals).
//! - Prices are [`Price`] (SOL per share, 18 decimals).
//! - Fees are basis points over [`BPS_DENOMINATOR`].
//!
//! ## Phases
//! Phase boundaries are expressed in *effective* supply, i.e. after adding
//! the virtual offset to the raw supply. The ignition classifier reads the
//! same boundaries against *raw* supply.

use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    types::{EffectiveSupply, PRICE_SCALE, Price, Shares},
};

/// Basis-point denominator for every fee.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Upper bound of the sigmoid exponent before normalization.
///
/// # Curve Design
/// The phase-3 exponent `k = steepness * x` is clamped into `[0, 1e9]` and
/// then divided by `1e9`, which caps the price at `price_max` without
/// evaluating an exponential.
pub const SIGMOID_CLAMP: u128 = 1_000_000_000;

/// Steepness is stored as nano-units (`steepness * 1e9`).
pub const STEEPNESS_SCALE: u128 = 1_000_000_000;

/// Supply share, in percent of total supply, past which a market is in its
/// endgame.
pub const ENDGAME_SUPPLY_PCT: u128 = 95;

/// Price impact, in percent, above which a trade is flagged as high
/// slippage.
pub const HIGH_SLIPPAGE_IMPACT_PCT: f64 = 15.0;

/// Total shares that can ever be issued for one outcome.
pub const TOTAL_SUPPLY: Shares = Shares::from_whole(1_000_000_000);

/// Virtual supply added before pricing.
///
/// # Curve Design
/// Lifts the starting price above `PRICE_START` so the first trade is not
/// degenerate.
pub const VIRTUAL_OFFSET: Shares = Shares::from_whole(20_000_000);

/// End of the linear phase, in effective supply.
pub const PHASE1_END: Shares = Shares::from_whole(100_000_000);

/// End of the quadratic bridge and start of the sigmoid, in effective
/// supply.
pub const PHASE2_END: Shares = Shares::from_whole(200_000_000);

/// Price at zero effective supply: 0.0000001 SOL.
pub const PRICE_START: Price = Price::from_units(PRICE_SCALE / 10_000_000);

/// Price at `PHASE1_END` ("P50"): 0.000005 SOL.
pub const PRICE_PHASE1_END: Price = Price::from_units(PRICE_SCALE / 200_000);

/// Price at `PHASE2_END` ("P90"): 0.000025 SOL.
pub const PRICE_PHASE2_END: Price = Price::from_units(PRICE_SCALE / 40_000);

/// Asymptotic price cap: 0.95 SOL.
pub const PRICE_MAX: Price = Price::from_units(PRICE_SCALE / 100 * 95);

/// Sigmoid steepness 0.00047, in nano-units.
pub const SIGMOID_STEEPNESS_NANOS: u128 = 470_000;

/// Entry fee charged on buys (1%).
pub const ENTRY_FEE_BPS: u16 = 100;

/// Exit fee charged on sells (1%).
pub const EXIT_FEE_BPS: u16 = 100;

/// Fee removed from the winning pot at resolution (2%).
pub const RESOLUTION_FEE_BPS: u16 = 200;

/// Fee schedule, in basis points.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct FeeSchedule {
    pub entry_bps: u16,
    pub exit_bps: u16,
    pub resolution_bps: u16,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            entry_bps: ENTRY_FEE_BPS,
            exit_bps: EXIT_FEE_BPS,
            resolution_bps: RESOLUTION_FEE_BPS,
        }
    }
}

/// Fixed curve parameters.
///
/// Fixed at process start and shared read-only. Build a
/// [`BondingCurve`](crate::math::curve::BondingCurve) from these, which
/// validates them once.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct CurveConstants {
    pub total_supply: Shares,
    pub virtual_offset: Shares,
    pub phase1_end: Shares,
    /// Also the start of phase 3.
    pub phase2_end: Shares,
    pub price_start: Price,
    pub price_phase1_end: Price,
    pub price_phase2_end: Price,
    pub price_max: Price,
    pub sigmoid_steepness_nanos: u128,
    pub fees: FeeSchedule,
}

impl Default for CurveConstants {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl CurveConstants {
    pub const DEFAULT: Self = Self {
        total_supply: TOTAL_SUPPLY,
        virtual_offset: VIRTUAL_OFFSET,
        phase1_end: PHASE1_END,
        phase2_end: PHASE2_END,
        price_start: PRICE_START,
        price_phase1_end: PRICE_PHASE1_END,
        price_phase2_end: PRICE_PHASE2_END,
        price_max: PRICE_MAX,
        sigmoid_steepness_nanos: SIGMOID_STEEPNESS_NANOS,
        fees: FeeSchedule {
            entry_bps: ENTRY_FEE_BPS,
            exit_bps: EXIT_FEE_BPS,
            resolution_bps: RESOLUTION_FEE_BPS,
        },
    };

    pub const fn phase3_start(&self) -> Shares {
        self.phase2_end
    }

    /// Raw supply plus the virtual offset.
    pub fn effective_supply(&self, raw: Shares) -> EffectiveSupply {
        EffectiveSupply::from_units(
            raw.units().saturating_add(self.virtual_offset.units()),
        )
    }

    /// Check ordering, fee bounds, and that every intermediate product the
    /// curve forms fits in a `u128`.
    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |reason: &str| {
            Err(Error::InvalidConstants {
                reason: reason.to_owned(),
            })
        };
        if self.total_supply.is_zero() {
            return invalid("total supply must be positive");
        }
        if self.phase1_end.is_zero() || self.phase1_end >= self.phase2_end {
            return invalid("phase boundaries must satisfy 0 < phase1 < phase2");
        }
        if self.price_start == Price::ZERO {
            return invalid("starting price must be positive");
        }
        if !(self.price_start <= self.price_phase1_end
            && self.price_phase1_end <= self.price_phase2_end
            && self.price_phase2_end <= self.price_max)
        {
            return invalid("price anchors must be non-decreasing");
        }
        if self.sigmoid_steepness_nanos == 0 {
            return invalid("sigmoid steepness must be positive");
        }
        let fees = &self.fees;
        if [fees.entry_bps, fees.exit_bps, fees.resolution_bps]
            .iter()
            .any(|bps| *bps as u128 > BPS_DENOMINATOR)
        {
            return invalid("fees must not exceed 10000 bps");
        }
        let linear_span = self.price_phase1_end.units()
            - self.price_start.units();
        let bridge_span = self.price_phase2_end.units()
            - self.price_phase1_end.units();
        let bridge_width = self.phase2_end.units() - self.phase1_end.units();
        let sigmoid_span =
            self.price_max.units() - self.price_phase2_end.units();
        let max_effective = self
            .total_supply
            .units()
            .checked_add(self.virtual_offset.units());
        let fits = linear_span.checked_mul(self.phase1_end.units()).is_some()
            && bridge_span.checked_mul(bridge_width).is_some()
            && sigmoid_span
                .checked_mul(SIGMOID_CLAMP * STEEPNESS_SCALE)
                .is_some()
            && max_effective
                .and_then(|supply| {
                    supply.checked_mul(self.sigmoid_steepness_nanos)
                })
                .is_some()
            && max_effective
                .and_then(|supply| {
                    supply.checked_mul(self.price_max.units().checked_mul(2)?)
                })
                .is_some();
        if !fits {
            return invalid("constants overflow fixed-point arithmetic");
        }
        Ok(())
    }
}
