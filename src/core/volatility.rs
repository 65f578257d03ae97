use super::{interpolate_flat, ConfigurationError};
use serde::{Deserialize, Serialize};

/// An observed at-the-money implied volatility for one maturity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketVolPoint {
    /// Year fraction to expiry.
    pub maturity: f64,
    /// Annualised ATM implied volatility (0.07 = 7%).
    pub atm_vol: f64,
}

impl MarketVolPoint {
    pub fn new(maturity: f64, atm_vol: f64) -> Self {
        Self { maturity, atm_vol }
    }

    /// Market-implied ATM variance, `atm_vol²`.
    pub fn variance(&self) -> f64 {
        self.atm_vol * self.atm_vol
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let ok = self.maturity.is_finite()
            && self.maturity > 0.0
            && self.atm_vol.is_finite()
            && self.atm_vol > 0.0;
        if ok {
            Ok(())
        } else {
            Err(ConfigurationError::InvalidVolPoint {
                maturity: self.maturity,
                vol: self.atm_vol,
            })
        }
    }
}

/// ATM volatility term structure used as the flat vol input for option
/// premiums.
///
/// Linear in vol between observed maturities, flat outside them.
///
/// ```
/// use fx_hedge_engine::core::volatility::{AtmVolCurve, MarketVolPoint};
///
/// let curve = AtmVolCurve::new(&[
///     MarketVolPoint::new(5.0, 0.07),
///     MarketVolPoint::new(1.0, 0.06),
/// ]).unwrap();
///
/// assert!((curve.vol(3.0) - 0.065).abs() < 1e-12);
/// assert_eq!(curve.vol(0.25), 0.06);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtmVolCurve {
    points: Vec<MarketVolPoint>,
}

impl AtmVolCurve {
    /// Validate and sort the points by maturity. Duplicate maturities are
    /// rejected.
    pub fn new(points: &[MarketVolPoint]) -> Result<Self, ConfigurationError> {
        if points.is_empty() {
            return Err(ConfigurationError::EmptyVolCurve);
        }
        for p in points {
            p.validate()?;
        }

        let mut sorted = points.to_vec();
        sorted.sort_by(|a, b| a.maturity.total_cmp(&b.maturity));
        if let Some(dup) = sorted.windows(2).find(|w| w[0].maturity == w[1].maturity) {
            return Err(ConfigurationError::InvalidVolPoint {
                maturity: dup[1].maturity,
                vol: dup[1].atm_vol,
            });
        }

        Ok(Self { points: sorted })
    }

    pub fn points(&self) -> &[MarketVolPoint] {
        &self.points
    }

    pub fn vol(&self, t: f64) -> f64 {
        interpolate_flat(&self.points, t, |p| (p.maturity, p.atm_vol))
    }
}
