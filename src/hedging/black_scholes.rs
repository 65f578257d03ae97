//! Garman–Kohlhagen pricing of European FX options.
//!
//! Prices are in domestic currency per unit of foreign notional, already
//! discounted to the valuation date.

use serde::{Deserialize, Serialize};
use statrs::function::erf::erfc;
use std::f64::consts::SQRT_2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Call,
    Put,
}

/// Standard normal CDF.
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Garman–Kohlhagen price.
///
/// With no time value (`t ≤ 0` or `vol ≤ 0`) the option is worth its
/// discounted intrinsic value on the forward.
///
/// ```
/// use fx_hedge_engine::hedging::black_scholes::{garman_kohlhagen, OptionKind};
///
/// let call = garman_kohlhagen(OptionKind::Call, 1.10, 1.10, 1.0, 0.04, 0.025, 0.07);
/// let put = garman_kohlhagen(OptionKind::Put, 1.10, 1.10, 1.0, 0.04, 0.025, 0.07);
///
/// // Put-call parity: C - P = S e^{-r_f T} - K e^{-r_d T}
/// let parity = 1.10 * (-0.025f64).exp() - 1.10 * (-0.04f64).exp();
/// assert!((call - put - parity).abs() < 1e-12);
/// ```
pub fn garman_kohlhagen(
    kind: OptionKind,
    spot: f64,
    strike: f64,
    t: f64,
    r_domestic: f64,
    r_foreign: f64,
    vol: f64,
) -> f64 {
    let df_d = (-r_domestic * t.max(0.0)).exp();
    let df_f = (-r_foreign * t.max(0.0)).exp();

    if t <= 0.0 || vol <= 0.0 {
        let forward = spot * df_f / df_d;
        let intrinsic = match kind {
            OptionKind::Call => (forward - strike).max(0.0),
            OptionKind::Put => (strike - forward).max(0.0),
        };
        return df_d * intrinsic;
    }

    let sd = vol * t.sqrt();
    let d1 = ((spot / strike).ln() + (r_domestic - r_foreign + 0.5 * vol * vol) * t) / sd;
    let d2 = d1 - sd;

    match kind {
        OptionKind::Call => spot * df_f * norm_cdf(d1) - strike * df_d * norm_cdf(d2),
        OptionKind::Put => strike * df_d * norm_cdf(-d2) - spot * df_f * norm_cdf(-d1),
    }
}
