//! Release scoring. Evaluated exactly once, when the build caps at 100.

const COMPLETENESS_WEIGHT: f64 = 0.4;
const HYPE_WEIGHT: f64 = 0.3;
const STABILITY_WEIGHT: f64 = 0.3;
const BUG_PENALTY: f64 = 2.0;

pub fn final_score(design_completeness: f64, market_hype: f64, bugs: u64) -> f64 {
    let stability = (100.0 - bugs as f64 * BUG_PENALTY).max(0.0);
    design_completeness * COMPLETENESS_WEIGHT + market_hype * HYPE_WEIGHT + stability * STABILITY_WEIGHT
}
