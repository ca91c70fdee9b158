//! Fixed-point conversion utilities with standardized rounding.
//!
//! Every amount the curve touches is a scaled integer. This module is the
//! one place where user-facing reals (SOL, whole shares, SOL per share) are
//! turned into those integers, with explicit rounding modes and validation.
//!
//! # Rounding Conventions
//! - `Rounding::Up` (ceil): Use for costs/fees charged TO user
//! - `Rounding::Down` (floor): Use for payouts TO user
//! - `Rounding::Nearest` (round): Use for neutral/balanced calculations

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during fixed-point conversion.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum AmountError {
    #[error("Non-finite value: {0}")]
    NonFinite(f64),
    #[error("Negative value not allowed: {0}")]
    Negative(f64),
    #[error("Value exceeds maximum: {0}")]
    Overflow(f64),
}

/// Rounding strategy for fixed-point conversions.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize,
)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Rounding {
    /// Round up (ceil) - use for costs/fees charged TO user.
    Up,
    /// Round down (floor) - use for payouts TO user.
    #[default]
    Down,
    /// Round to nearest - use for neutral calculations.
    Nearest,
}

impl Rounding {
    fn apply(self, value: f64) -> f64 {
        match self {
            Self::Up => value.ceil(),
            Self::Down => value.floor(),
            Self::Nearest => value.round(),
        }
    }
}

/// Scale a real `value` by `scale` and round it into a `u128`.
///
/// # Arguments
/// * `value` - The user-facing real (e.g. SOL, whole shares)
/// * `scale` - Integer units per whole unit (e.g. `1e9` lamports per SOL)
/// * `mode` - The rounding strategy to apply
///
/// # Errors
/// Returns `AmountError` if:
/// - Value is NaN or infinite
/// - Value is negative
/// - Rounded value exceeds `max`
///
/// # Examples
/// ```
/// use ignition_curve::math::fixed_point::{Rounding, to_units};
///
/// // Costs round up
/// assert_eq!(to_units(1.0000000003, 1e9, u128::MAX, Rounding::Up).unwrap(), 1_000_000_001);
///
/// // Payouts round down
/// assert_eq!(to_units(1.0000000009, 1e9, u128::MAX, Rounding::Down).unwrap(), 1_000_000_000);
/// ```
pub fn to_units(
    value: f64,
    scale: f64,
    max: u128,
    mode: Rounding,
) -> Result<u128, AmountError> {
    if !value.is_finite() {
        return Err(AmountError::NonFinite(value));
    }
    if value < 0.0 {
        return Err(AmountError::Negative(value));
    }
    let rounded = mode.apply(value * scale);
    if !rounded.is_finite() || rounded > max as f64 {
        return Err(AmountError::Overflow(value));
    }
    Ok(rounded as u128)
}

/// Lossy conversion back to a real, for display and percentages only.
pub fn from_units(units: u128, scale: f64) -> f64 {
    units as f64 / scale
}

/// `a * b / d` with floor rounding.
///
/// Saturates instead of panicking when `a * b` does not fit; callers keep
/// operands inside the bounds checked by
/// [`CurveConstants::validate`](crate::math::constants::CurveConstants::validate).
#[inline]
pub fn mul_div(a: u128, b: u128, d: u128) -> u128 {
    if d == 0 {
        return 0;
    }
    match a.checked_mul(b) {
        Some(product) => product / d,
        None => u128::MAX / d,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NANO: f64 = 1e9;

    #[test]
    fn test_to_units_rounding_up() {
        assert_eq!(to_units(1.0, NANO, u128::MAX, Rounding::Up).unwrap(), 1_000_000_000);
        assert_eq!(
            to_units(1.0000000001, NANO, u128::MAX, Rounding::Up).unwrap(),
            1_000_000_001
        );
        assert_eq!(to_units(0.0, NANO, u128::MAX, Rounding::Up).unwrap(), 0);
    }

    #[test]
    fn test_to_units_rounding_down() {
        assert_eq!(to_units(100.1, 1.0, u128::MAX, Rounding::Down).unwrap(), 100);
        assert_eq!(to_units(100.9, 1.0, u128::MAX, Rounding::Down).unwrap(), 100);
        assert_eq!(to_units(0.0, 1.0, u128::MAX, Rounding::Down).unwrap(), 0);
    }

    #[test]
    fn test_to_units_rounding_nearest() {
        assert_eq!(to_units(100.4, 1.0, u128::MAX, Rounding::Nearest).unwrap(), 100);
        assert_eq!(to_units(100.6, 1.0, u128::MAX, Rounding::Nearest).unwrap(), 101);
    }

    #[test]
    fn test_to_units_negative_error() {
        assert!(matches!(
            to_units(-1.0, NANO, u128::MAX, Rounding::Up),
            Err(AmountError::Negative(_))
        ));
    }

    #[test]
    fn test_to_units_non_finite_error() {
        assert!(matches!(
            to_units(f64::NAN, NANO, u128::MAX, Rounding::Up),
            Err(AmountError::NonFinite(_))
        ));
        assert!(matches!(
            to_units(f64::INFINITY, NANO, u128::MAX, Rounding::Up),
            Err(AmountError::NonFinite(_))
        ));
    }

    #[test]
    fn test_to_units_overflow_error() {
        assert!(matches!(
            to_units(1e12, NANO, u64::MAX as u128, Rounding::Down),
            Err(AmountError::Overflow(_))
        ));
    }

    #[test]
    fn test_mul_div_saturates() {
        assert_eq!(mul_div(6, 7, 2), 21);
        assert_eq!(mul_div(u128::MAX, 2, 1), u128::MAX);
        assert_eq!(mul_div(5, 5, 0), 0);
    }
}
