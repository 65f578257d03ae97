use super::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO 4217-style currency code.
///
/// # Examples
///
/// ```
/// use fx_hedge_engine::core::currency::CurrencyCode;
///
/// let usd = CurrencyCode::new("USD");
/// let eur = CurrencyCode::new("EUR");
/// assert_ne!(usd, eur);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// An FX quotation direction: the spot is quoted as units of `quote`
/// (domestic) per one unit of `base` (foreign).
///
/// EUR/USD at 1.10 means one euro buys 1.10 dollars; cash flows are
/// denominated in `base` and valued in `quote`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub base: CurrencyCode,
    pub quote: CurrencyCode,
}

impl CurrencyPair {
    pub fn new(base: CurrencyCode, quote: CurrencyCode) -> Self {
        Self { base, quote }
    }

    /// Parse `"EURUSD"` or `"EUR/USD"`.
    ///
    /// ```
    /// use fx_hedge_engine::core::currency::CurrencyPair;
    ///
    /// let pair = CurrencyPair::parse("EUR/USD").unwrap();
    /// assert_eq!(pair.base.as_str(), "EUR");
    /// assert_eq!(pair.quote.as_str(), "USD");
    /// assert_eq!(CurrencyPair::parse("EURUSD").unwrap(), pair);
    /// ```
    pub fn parse(s: &str) -> Result<Self, ConfigurationError> {
        let trimmed = s.trim();
        let (base, quote) = match trimmed.split_once('/') {
            Some((b, q)) => (b.trim(), q.trim()),
            None if trimmed.len() == 6 && trimmed.is_ascii() => trimmed.split_at(3),
            None => return Err(ConfigurationError::InvalidCurrencyPair(s.to_string())),
        };
        if base.is_empty() || quote.is_empty() || base == quote {
            return Err(ConfigurationError::InvalidCurrencyPair(s.to_string()));
        }
        Ok(Self::new(
            CurrencyCode::new(base.to_ascii_uppercase()),
            CurrencyCode::new(quote.to_ascii_uppercase()),
        ))
    }

    /// The foreign currency, in which cash flows are denominated.
    pub fn foreign(&self) -> &CurrencyCode {
        &self.base
    }

    /// The domestic currency, in which values are reported.
    pub fn domestic(&self) -> &CurrencyCode {
        &self.quote
    }
}

impl Default for CurrencyPair {
    fn default() -> Self {
        Self::new(CurrencyCode::new("EUR"), CurrencyCode::new("USD"))
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}
