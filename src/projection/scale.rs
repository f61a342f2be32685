use alloy_primitives::{I256, U256};
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::state::Tokens;

/// Oracle prices carry 8 decimals.
pub const PRICE_DECIMALS: u32 = 8;

/// Convert a raw oracle answer into a decimal price.
///
/// Exact: the raw integer becomes the mantissa, so nothing is rounded.
pub fn price(raw: I256) -> Result<Decimal> {
    let mantissa = i128::try_from(raw).map_err(|_| overflow("price", raw))?;
    Decimal::try_from_i128_with_scale(mantissa, PRICE_DECIMALS)
        .map(|d| d.normalize())
        .map_err(|_| overflow("price", raw))
}

/// Take a raw 18-decimal token amount as is. Any uint256 is accepted; the
/// 10^18 scale is applied when the amount is displayed.
pub fn amount(raw: U256) -> Tokens {
    Tokens::from_wei(raw)
}

fn overflow(what: &str, raw: impl std::fmt::Display) -> Error {
    Error::Overflow(format!("{} {} does not fit a decimal", what, raw))
}
