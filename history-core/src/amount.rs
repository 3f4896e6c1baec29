use std::{fmt, str::FromStr};

use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::result::{Error, Result};

/// Currency symbols the room prefixes prices with.
pub const CURRENCY_SYMBOLS: [char; 4] = ['¥', '$', '€', '£'];

/// Regex fragment matching one currency-prefixed price, capturing the number.
/// Any number of decimals is matched so that `parse_price` can reject them.
pub(crate) const REGEX_PRICE: &str = r"[¥$€£](\d+(?:\.\d+)?)";

/// Regex fragment matching one currency-prefixed price including the symbol.
pub(crate) const REGEX_RAW_PRICE: &str = r"([¥$€£]\d+(?:\.\d+)?)";

/// A signed chip amount in cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(SerializeDisplay, DeserializeFromStr)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Self = Self(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Parses a price with an optional leading currency symbol, e.g. `¥0.30`.
    pub fn parse_price(price: &str) -> Result<Self> {
        let number = price.strip_prefix(CURRENCY_SYMBOLS).unwrap_or(price);
        Self::parse_price_as_cent(number).map_err(|_| Error::InvalidAmount(price.to_string()))
    }

    fn parse_price_as_cent(price: &str) -> Result<Self> {
        let invalid = || Error::InvalidAmount(price.to_string());

        let (negative, price) = match price.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, price),
        };
        let mut split = price.split('.');
        let whole = split.next().unwrap_or_default();
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let whole: i64 = whole.parse().map_err(|_| invalid())?;
        let cent = match split.next() {
            Some(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
                let cent: i64 = s.parse().map_err(|_| invalid())?;
                match s.len() {
                    1 => cent * 10,
                    2 => cent,
                    _ => return Err(invalid()),
                }
            }
            Some(_) => return Err(invalid()),
            None => 0,
        };
        if split.next().is_some() {
            return Err(invalid());
        }
        let cents = whole
            .checked_mul(100)
            .and_then(|n| n.checked_add(cent))
            .ok_or_else(invalid)?;
        Ok(Self(if negative { -cents } else { cents }))
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl FromStr for Amount {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_price(s)
    }
}
