//! Resolution payout preview for a winning position.
//!
//! The winning side splits the vault, less the resolution fee, pro rata by
//! shares. Every holder is also guaranteed their investment less the entry
//! and resolution fees, whichever is larger.

use serde::Serialize;

use crate::{
    error::Error,
    math::{
        constants::{BPS_DENOMINATOR, FeeSchedule},
        fixed_point::mul_div,
    },
    types::{Lamports, Shares},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PayoutMethod {
    ProRata,
    Guaranteed,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PayoutPreview {
    pub resolution_fee: Lamports,
    pub winner_pool: Lamports,
    pub pro_rata: Lamports,
    pub guaranteed: Lamports,
    pub payout: Lamports,
    pub method: PayoutMethod,
    pub roi_pct: f64,
}

/// Preview what `shares` of the winning outcome pay out at resolution.
pub fn preview_payout(
    fees: &FeeSchedule,
    vault: Lamports,
    winning_supply: Shares,
    shares: Shares,
    invested: Lamports,
) -> Result<PayoutPreview, Error> {
    if shares > winning_supply {
        return Err(Error::InsufficientSupply {
            requested: shares,
            available: winning_supply,
        });
    }
    let resolution_fee = vault.bps(fees.resolution_bps);
    let winner_pool = vault.saturating_sub(resolution_fee);
    let pro_rata = if winning_supply.is_zero() {
        Lamports::ZERO
    } else {
        Lamports::saturating_from_u128(mul_div(
            winner_pool.get() as u128,
            shares.units(),
            winning_supply.units(),
        ))
    };
    let kept_bps = (BPS_DENOMINATOR as u16)
        .saturating_sub(fees.entry_bps)
        .saturating_sub(fees.resolution_bps);
    let guaranteed = invested.bps(kept_bps);

    let (payout, method) = if pro_rata > guaranteed {
        (pro_rata, PayoutMethod::ProRata)
    } else {
        (guaranteed, PayoutMethod::Guaranteed)
    };
    let roi_pct = if invested.is_zero() {
        0.0
    } else {
        (payout.to_sol() / invested.to_sol() - 1.0) * 100.0
    };
    Ok(PayoutPreview {
        resolution_fee,
        winner_pool,
        pro_rata,
        guaranteed,
        payout,
        method,
        roi_pct,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn preview(shares: u64, invested_sol: u64) -> PayoutPreview {
        preview_payout(
            &FeeSchedule::default(),
            Lamports::from_sol_whole(100),
            Shares::from_whole(1_000_000),
            Shares::from_whole(shares),
            Lamports::from_sol_whole(invested_sol),
        )
        .unwrap()
    }

    #[test]
    fn test_early_holder_takes_pro_rata() {
        let preview = preview(100_000, 5);
        assert_eq!(preview.resolution_fee, Lamports::from_sol_whole(2));
        assert_eq!(preview.winner_pool, Lamports::from_sol_whole(98));
        assert_eq!(preview.pro_rata, Lamports::new(9_800_000_000));
        assert_eq!(preview.method, PayoutMethod::ProRata);
        assert_relative_eq!(preview.roi_pct, 96.0, max_relative = 1e-9);
    }

    #[test]
    fn test_late_holder_falls_back_to_guarantee() {
        let preview = preview(10_000, 5);
        assert_eq!(preview.guaranteed, Lamports::new(4_850_000_000));
        assert_eq!(preview.payout, preview.guaranteed);
        assert_eq!(preview.method, PayoutMethod::Guaranteed);
        assert_relative_eq!(preview.roi_pct, -3.0, max_relative = 1e-9);
    }

    #[test]
    fn test_no_winning_supply() {
        let preview = preview_payout(
            &FeeSchedule::default(),
            Lamports::from_sol_whole(10),
            Shares::ZERO,
            Shares::ZERO,
            Lamports::ZERO,
        )
        .unwrap();
        assert_eq!(preview.pro_rata, Lamports::ZERO);
        assert_eq!(preview.payout, Lamports::ZERO);
        assert_eq!(preview.roi_pct, 0.0);
    }

    #[test]
    fn test_more_shares_than_supply() {
        assert!(matches!(
            preview_payout(
                &FeeSchedule::default(),
                Lamports::from_sol_whole(1),
                Shares::from_whole(10),
                Shares::from_whole(11),
                Lamports::from_sol_whole(1),
            ),
            Err(Error::InsufficientSupply { .. })
        ));
    }
}
