//! Scaled-integer quantities used by the curve.
//!
//! The on-chain program evaluates the curve in `u128` fixed point. These
//! newtypes carry the same scaling so previews reproduce its arithmetic
//! instead of drifting through `f64`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::fixed_point::{self, AmountError, Rounding};

/// Share units per whole share (9 decimals, as the share mint).
pub const SHARE_SCALE: u128 = 1_000_000_000;
/// Lamports per SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;
/// Price units per SOL-per-share.
pub const PRICE_SCALE: u128 = 1_000_000_000_000_000_000;

fn fmt_scaled(
    f: &mut fmt::Formatter<'_>,
    units: u128,
    scale: u128,
    decimals: usize,
) -> fmt::Result {
    let whole = units / scale;
    let frac = units % scale;
    if frac == 0 {
        write!(f, "{whole}")
    } else {
        let frac = format!("{frac:0decimals$}");
        write!(f, "{whole}.{}", frac.trim_end_matches('0'))
    }
}

/// A raw share quantity, as callers and the chain see it.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[serde(transparent)]
pub struct Shares(u128);

impl Shares {
    pub const ZERO: Self = Self(0);

    pub const fn from_units(units: u128) -> Self {
        Self(units)
    }

    pub const fn from_whole(shares: u64) -> Self {
        Self(shares as u128 * SHARE_SCALE)
    }

    /// Convert a real share count, rounding towards zero.
    pub fn from_f64(shares: f64) -> Result<Self, AmountError> {
        fixed_point::to_units(
            shares,
            SHARE_SCALE as f64,
            u128::MAX,
            Rounding::Down,
        )
        .map(Self)
    }

    pub const fn units(self) -> u128 {
        self.0
    }

    pub fn to_f64(self) -> f64 {
        fixed_point::from_units(self.0, SHARE_SCALE as f64)
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    pub fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl fmt::Display for Shares {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_scaled(f, self.0, SHARE_SCALE, 9)
    }
}

/// Supply including the virtual offset. Only pricing reads this basis;
/// build it with
/// [`CurveConstants::effective_supply`](crate::math::constants::CurveConstants::effective_supply).
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd,
)]
pub struct EffectiveSupply(u128);

impl EffectiveSupply {
    pub(crate) const fn from_units(units: u128) -> Self {
        Self(units)
    }

    pub const fn units(self) -> u128 {
        self.0
    }
}

/// An amount of the settlement asset.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[serde(transparent)]
pub struct Lamports(u64);

impl Lamports {
    pub const ZERO: Self = Self(0);

    pub const fn new(lamports: u64) -> Self {
        Self(lamports)
    }

    /// Whole SOL, saturating at `u64::MAX` lamports past ~18.4 billion SOL.
    pub const fn from_sol_whole(sol: u64) -> Self {
        match sol.checked_mul(LAMPORTS_PER_SOL) {
            Some(lamports) => Self(lamports),
            None => Self(u64::MAX),
        }
    }

    /// Convert a SOL amount with an explicit rounding mode.
    pub fn from_sol(sol: f64, mode: Rounding) -> Result<Self, AmountError> {
        let units = fixed_point::to_units(
            sol,
            LAMPORTS_PER_SOL as f64,
            u64::MAX as u128,
            mode,
        )?;
        u64::try_from(units)
            .map(Self)
            .map_err(|_| AmountError::Overflow(sol))
    }

    /// Narrow a `u128` intermediate, saturating at `u64::MAX`.
    pub(crate) fn saturating_from_u128(lamports: u128) -> Self {
        Self(u64::try_from(lamports).unwrap_or(u64::MAX))
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub fn to_sol(self) -> f64 {
        fixed_point::from_units(self.0 as u128, LAMPORTS_PER_SOL as f64)
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    pub fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// `self * bps / 10_000`, floored.
    pub fn bps(self, bps: u16) -> Self {
        Self::saturating_from_u128(fixed_point::mul_div(
            self.0 as u128,
            bps as u128,
            crate::math::constants::BPS_DENOMINATOR,
        ))
    }
}

impl fmt::Display for Lamports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_scaled(f, self.0 as u128, LAMPORTS_PER_SOL as u128, 9)?;
        write!(f, " SOL")
    }
}

/// SOL per whole share, scaled by [`PRICE_SCALE`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[serde(transparent)]
pub struct Price(u128);

impl Price {
    pub const ZERO: Self = Self(0);

    pub const fn from_units(units: u128) -> Self {
        Self(units)
    }

    /// Convert a SOL-per-share price, rounding to nearest.
    pub fn from_sol(price: f64) -> Result<Self, AmountError> {
        fixed_point::to_units(
            price,
            PRICE_SCALE as f64,
            u128::MAX,
            Rounding::Nearest,
        )
        .map(Self)
    }

    /// Average price of `shares` bought or sold for `amount`.
    pub fn average(amount: Lamports, shares: Shares) -> Self {
        if shares.is_zero() {
            return Self::ZERO;
        }
        // lamports * 1e18 / share units == SOL * 1e18 / share
        Self(fixed_point::mul_div(
            amount.get() as u128,
            PRICE_SCALE,
            shares.units(),
        ))
    }

    /// Value of `shares` at this price.
    pub fn value_of(self, shares: Shares) -> Lamports {
        Lamports::saturating_from_u128(fixed_point::mul_div(
            self.0,
            shares.units(),
            PRICE_SCALE,
        ))
    }

    pub const fn units(self) -> u128 {
        self.0
    }

    pub fn to_sol(self) -> f64 {
        fixed_point::from_units(self.0, PRICE_SCALE as f64)
    }

    /// Percentage change from `self` to `other`.
    pub fn percent_change_to(self, other: Self) -> f64 {
        if self.0 == 0 {
            return 0.0;
        }
        (other.0 as f64 - self.0 as f64) / self.0 as f64 * 100.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_scaled(f, self.0, PRICE_SCALE, 18)?;
        write!(f, " SOL/share")
    }
}
