use super::{interpolate_flat, ConfigurationError, CurrencyCode};
use serde::{Deserialize, Serialize};

/// A single (tenor, zero rate) node of a [`RateCurve`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Year fraction from the valuation date.
    pub tenor: f64,
    /// Continuously-compounded zero rate.
    pub rate: f64,
}

/// Continuously-compounded zero-rate curve for one currency.
///
/// Rates are linearly interpolated between the two bracketing tenors and
/// held flat beyond the first and last tenor. The curve is immutable once
/// built.
///
/// # Examples
///
/// ```
/// use fx_hedge_engine::core::curve::RateCurve;
/// use fx_hedge_engine::core::currency::CurrencyCode;
///
/// let usd = RateCurve::new(
///     CurrencyCode::new("USD"),
///     vec![(1.0, 0.040), (5.0, 0.045)],
/// ).unwrap();
///
/// assert!((usd.rate(3.0) - 0.0425).abs() < 1e-12);
/// assert_eq!(usd.rate(10.0), 0.045);
/// assert_eq!(usd.discount_factor(0.0), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateCurve {
    currency: CurrencyCode,
    points: Vec<CurvePoint>,
}

impl RateCurve {
    /// Build a curve from `(tenor, rate)` pairs.
    ///
    /// Tenors must be non-negative, finite and strictly increasing.
    pub fn new(
        currency: CurrencyCode,
        points: impl IntoIterator<Item = (f64, f64)>,
    ) -> Result<Self, ConfigurationError> {
        let points: Vec<CurvePoint> = points
            .into_iter()
            .map(|(tenor, rate)| CurvePoint { tenor, rate })
            .collect();

        if points.is_empty() {
            return Err(ConfigurationError::EmptyCurve { currency });
        }

        for (index, point) in points.iter().enumerate() {
            if !point.tenor.is_finite() || point.tenor < 0.0 || !point.rate.is_finite() {
                return Err(ConfigurationError::InvalidCurvePoint {
                    currency,
                    tenor: point.tenor,
                    rate: point.rate,
                });
            }
            if index > 0 && point.tenor <= points[index - 1].tenor {
                return Err(ConfigurationError::NonIncreasingTenors {
                    currency,
                    index,
                    previous: points[index - 1].tenor,
                    tenor: point.tenor,
                });
            }
        }

        Ok(Self { currency, points })
    }

    /// A curve with the same rate at every maturity.
    pub fn flat(currency: CurrencyCode, rate: f64) -> Result<Self, ConfigurationError> {
        Self::new(currency, [(1.0, rate)])
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// Zero rate for maturity `t` (year fraction). NaN for a NaN `t`.
    pub fn rate(&self, t: f64) -> f64 {
        interpolate_flat(&self.points, t, |p| (p.tenor, p.rate))
    }

    /// `exp(-rate(t) * t)`, with negative `t` treated as today.
    pub fn discount_factor(&self, t: f64) -> f64 {
        if t.is_nan() {
            return f64::NAN;
        }
        let t = t.max(0.0);
        (-self.rate(t) * t).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn usd() -> CurrencyCode {
        CurrencyCode::new("USD")
    }

    #[test]
    fn test_linear_interpolation() {
        let curve = RateCurve::new(usd(), vec![(1.0, 0.02), (2.0, 0.03), (5.0, 0.06)]).unwrap();
        assert_relative_eq!(curve.rate(1.5), 0.025, epsilon = 1e-12);
        assert_relative_eq!(curve.rate(3.5), 0.045, epsilon = 1e-12);
        assert_relative_eq!(curve.rate(2.0), 0.03, epsilon = 1e-12);
    }

    #[test]
    fn test_flat_extrapolation() {
        let curve = RateCurve::new(usd(), vec![(1.0, 0.02), (5.0, 0.06)]).unwrap();
        assert_eq!(curve.rate(0.0), 0.02);
        assert_eq!(curve.rate(0.25), 0.02);
        assert_eq!(curve.rate(30.0), 0.06);
    }

    #[test]
    fn test_single_point_curve_is_flat() {
        let curve = RateCurve::flat(usd(), 0.04).unwrap();
        assert_eq!(curve.rate(0.1), 0.04);
        assert_eq!(curve.rate(7.0), 0.04);
        assert_relative_eq!(curve.discount_factor(2.0), (-0.08f64).exp(), epsilon = 1e-15);
    }

    #[test]
    fn test_discount_factor_at_zero() {
        let curve = RateCurve::new(usd(), vec![(0.5, 0.05), (10.0, 0.01)]).unwrap();
        assert_eq!(curve.discount_factor(0.0), 1.0);
    }

    #[test]
    fn test_empty_curve_rejected() {
        let err = RateCurve::new(usd(), Vec::<(f64, f64)>::new()).unwrap_err();
        assert!(matches!(err, ConfigurationError::EmptyCurve { .. }));
    }

    #[test]
    fn test_non_increasing_tenors_rejected() {
        let err = RateCurve::new(usd(), vec![(1.0, 0.02), (1.0, 0.03)]).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::NonIncreasingTenors { index: 1, .. }
        ));

        let err = RateCurve::new(usd(), vec![(2.0, 0.02), (1.0, 0.03)]).unwrap_err();
        assert!(matches!(err, ConfigurationError::NonIncreasingTenors { .. }));
    }

    #[test]
    fn test_nan_maturity_propagates() {
        let curve = RateCurve::new(usd(), vec![(1.0, 0.02), (2.0, 0.03), (5.0, 0.06)]).unwrap();
        assert!(curve.rate(f64::NAN).is_nan());
        assert!(curve.discount_factor(f64::NAN).is_nan());
        assert_eq!(curve.rate(f64::INFINITY), 0.06);
        assert_eq!(curve.rate(f64::NEG_INFINITY), 0.02);
    }

    #[test]
    fn test_nan_rate_rejected() {
        let err = RateCurve::new(usd(), vec![(1.0, f64::NAN)]).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidCurvePoint { .. }));
    }
}
