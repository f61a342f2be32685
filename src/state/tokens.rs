use std::fmt;
use std::str::FromStr;

use alloy_primitives::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Decimals of the betting token.
pub const TOKEN_DECIMALS: usize = 18;

/// 10^18 wei = 1 token
const WEI_PER_TOKEN: u64 = 1_000_000_000_000_000_000;

/// A token quantity kept as raw 18-decimal wei.
///
/// Dividing by 10^18 only happens when the value is rendered, so sums of any
/// size stay exact to the wei. Serialized as a decimal string ("2.5").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tokens(U256);

impl Tokens {
    pub const ZERO: Tokens = Tokens(U256::ZERO);

    pub fn from_wei(wei: U256) -> Self {
        Self(wei)
    }

    pub fn wei(&self) -> U256 {
        self.0
    }

    pub fn checked_add(self, other: Tokens) -> Option<Tokens> {
        self.0.checked_add(other.0).map(Tokens)
    }
}

impl fmt::Display for Tokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = U256::from(WEI_PER_TOKEN);
        let whole = self.0 / unit;
        let frac = self.0 % unit;
        if frac.is_zero() {
            return write!(f, "{}", whole);
        }

        let frac = format!("{:0>width$}", frac.to_string(), width = TOKEN_DECIMALS);
        write!(f, "{}.{}", whole, frac.trim_end_matches('0'))
    }
}

impl FromStr for Tokens {
    type Err = Error;

    /// Parse a non-negative decimal with at most 18 fractional digits.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidAmount(format!("{:?}", s));

        let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
        if whole.is_empty()
            || frac.len() > TOKEN_DECIMALS
            || !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole = U256::from_str_radix(whole, 10).map_err(|_| invalid())?;
        let frac = if frac.is_empty() {
            U256::ZERO
        } else {
            let padded = format!("{:0<width$}", frac, width = TOKEN_DECIMALS);
            U256::from_str_radix(&padded, 10).map_err(|_| invalid())?
        };

        whole
            .checked_mul(U256::from(WEI_PER_TOKEN))
            .and_then(|w| w.checked_add(frac))
            .map(Tokens)
            .ok_or_else(invalid)
    }
}

/// Exact conversion from a decimal literal; fails on negatives and on more
/// than 18 fractional digits.
impl TryFrom<Decimal> for Tokens {
    type Error = Error;

    fn try_from(value: Decimal) -> Result<Self> {
        value.normalize().to_string().parse()
    }
}

impl Serialize for Tokens {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Tokens {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
