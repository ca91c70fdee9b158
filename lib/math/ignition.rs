//! Ignition stage labels.
//!
//! Reads *raw* supply against the phase boundaries, while pricing reads the
//! offset-adjusted supply. The two bases disagree by the virtual offset near
//! each boundary and are kept apart on purpose.

use serde::{Deserialize, Serialize};

use crate::{math::constants::CurveConstants, types::Shares};

/// Coarse display stage of an outcome.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum IgnitionStage {
    Accumulation,
    Breaking,
    Viral,
}

pub fn classify(constants: &CurveConstants, supply: Shares) -> IgnitionStage {
    if supply >= constants.phase3_start() {
        IgnitionStage::Viral
    } else if supply >= constants.phase1_end {
        IgnitionStage::Breaking
    } else {
        IgnitionStage::Accumulation
    }
}

/// Progress towards phase 3 in percent, capped at 100.
pub fn progress(constants: &CurveConstants, supply: Shares) -> f64 {
    let phase3_start = constants.phase3_start();
    if phase3_start.is_zero() {
        return 100.0;
    }
    (supply.to_f64() / phase3_start.to_f64() * 100.0).min(100.0)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use strum::IntoEnumIterator;

    use super::*;

    fn stage(shares: u64) -> IgnitionStage {
        classify(&CurveConstants::DEFAULT, Shares::from_whole(shares))
    }

    #[test]
    fn test_classify_thresholds() {
        assert_eq!(stage(50_000_000), IgnitionStage::Accumulation);
        assert_eq!(stage(150_000_000), IgnitionStage::Breaking);
        assert_eq!(stage(250_000_000), IgnitionStage::Viral);
    }

    #[test]
    fn test_classify_boundaries_are_inclusive() {
        assert_eq!(stage(0), IgnitionStage::Accumulation);
        assert_eq!(stage(100_000_000), IgnitionStage::Breaking);
        assert_eq!(stage(200_000_000), IgnitionStage::Viral);
    }

    #[test]
    fn test_classify_uses_raw_supply() {
        // 90M raw is already in the bridge for pricing (110M effective)
        assert_eq!(stage(90_000_000), IgnitionStage::Accumulation);
    }

    #[test]
    fn test_progress() {
        let constants = CurveConstants::DEFAULT;
        assert_eq!(progress(&constants, Shares::ZERO), 0.0);
        assert_relative_eq!(
            progress(&constants, Shares::from_whole(50_000_000)),
            25.0
        );
        assert_eq!(progress(&constants, Shares::from_whole(400_000_000)), 100.0);
    }

    #[test]
    fn test_stage_labels() {
        let labels: Vec<String> =
            IgnitionStage::iter().map(|stage| stage.to_string()).collect();
        assert_eq!(labels, ["ACCUMULATION", "BREAKING", "VIRAL"]);
        assert_eq!(
            serde_json::to_string(&IgnitionStage::Viral).unwrap(),
            r#""VIRAL""#
        );
    }
}
