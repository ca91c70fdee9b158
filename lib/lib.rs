//! Ignition bonding curve for prediction-market outcome shares.
//!
//! Each outcome prices its shares on a deterministic three-phase curve: a
//! linear ramp, a quadratic bridge and a clamped sigmoid. Buying mints
//! shares at the trapezoid cost between the current and target supply;
//! selling burns them for the same cost in reverse.
//!
//! Everything here is a preview. The on-chain program settles trades, and
//! these functions reproduce its fixed-point arithmetic so the previews
//! agree with it.
//!
//! ```
//! use ignition_curve::{MarketState, Lamports, simulate_buy};
//!
//! let result =
//!     simulate_buy(Lamports::from_sol_whole(1), &MarketState::default())?;
//! assert_eq!(result.net_amount.get() + result.fees.total.get(), 1_000_000_000);
//! # Ok::<(), ignition_curve::Error>(())
//! ```

pub mod error;
pub mod math;
pub mod settlement;
pub mod state;
pub mod trade;
pub mod types;

pub use error::Error;
pub use math::{
    constants::{CurveConstants, FeeSchedule},
    curve::{BondingCurve, Phase, cost, spot_price, supply_for_price},
    ignition::IgnitionStage,
    solver::{Solution, SolverConfig},
};
pub use state::{Market, MarketState};
pub use trade::{FeeBreakdown, Side, TradeResult, simulate_buy, simulate_sell};
pub use types::{EffectiveSupply, Lamports, Price, Shares};

/// [`BondingCurve::classify`] on the deployed curve.
pub fn classify(supply: Shares) -> IgnitionStage {
    BondingCurve::DEFAULT.classify(supply)
}

/// [`BondingCurve::ignition_progress`] on the deployed curve.
pub fn ignition_progress(supply: Shares) -> f64 {
    BondingCurve::DEFAULT.ignition_progress(supply)
}
