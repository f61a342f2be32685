mod bet;
mod market;
mod round;
mod tokens;
mod user;

pub use bet::{Bet, BetKey};
pub use market::{Market, BASE_REWARD_RATE, BASE_TREASURY_RATE, MARKET_ID};
pub use round::{resolve, Round, Stamp};
pub use tokens::{Tokens, TOKEN_DECIMALS};
pub use user::User;

use crate::error::{Error, Result};

/// Checked addition for running token totals.
fn add_amount(total: Tokens, amount: Tokens, what: &str) -> Result<Tokens> {
    total
        .checked_add(amount)
        .ok_or_else(|| Error::Overflow(format!("{}: {} + {}", what, total, amount)))
}

/// Token literal for tests: `token_amount(dec!(2.5))`.
#[cfg(test)]
pub(crate) fn token_amount(value: rust_decimal::Decimal) -> Tokens {
    Tokens::try_from(value).unwrap()
}
