use serde::{Deserialize, Serialize};

use super::{add_amount, Tokens};
use crate::error::Result;
use crate::events::Position;

/// Key of the single market record.
pub const MARKET_ID: &str = "1";

/// Fee split used until the first RatesUpdated event.
pub const BASE_REWARD_RATE: u64 = 3;
pub const BASE_TREASURY_RATE: u64 = 97;

/// Global market state. Exactly one exists, created lazily.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    /// Current epoch
    pub epoch: u64,
    pub paused: bool,

    pub total_users: u64,
    pub total_bets: u64,
    pub total_bets_bull: u64,
    pub total_bets_bear: u64,

    pub total_token: Tokens,
    pub total_token_bull: Tokens,
    pub total_token_bear: Tokens,
    /// All-time treasury revenue (sum over every settled round)
    pub total_token_treasury: Tokens,

    pub reward_rate: u64,
    pub treasury_rate: u64,
}

impl Market {
    /// Baseline market: zero counters, default rates.
    pub fn new(epoch: u64) -> Self {
        Self {
            epoch,
            paused: false,
            total_users: 0,
            total_bets: 0,
            total_bets_bull: 0,
            total_bets_bear: 0,
            total_token: Tokens::ZERO,
            total_token_bull: Tokens::ZERO,
            total_token_bear: Tokens::ZERO,
            total_token_treasury: Tokens::ZERO,
            reward_rate: BASE_REWARD_RATE,
            treasury_rate: BASE_TREASURY_RATE,
        }
    }

    pub fn id(&self) -> &'static str {
        MARKET_ID
    }

    /// Count a bet in the global and per-side totals.
    pub fn record_bet(&mut self, position: Position, amount: Tokens) -> Result<()> {
        let total_token = add_amount(self.total_token, amount, "market total")?;
        match position {
            Position::Bull => {
                self.total_token_bull = add_amount(self.total_token_bull, amount, "market bull")?;
                self.total_bets_bull += 1;
            }
            Position::Bear => {
                self.total_token_bear = add_amount(self.total_token_bear, amount, "market bear")?;
                self.total_bets_bear += 1;
            }
        }
        self.total_token = total_token;
        self.total_bets += 1;
        Ok(())
    }

    /// A sender was seen for the first time.
    pub fn register_user(&mut self) {
        self.total_users += 1;
    }

    pub fn add_treasury(&mut self, amount: Tokens) -> Result<()> {
        self.total_token_treasury = add_amount(self.total_token_treasury, amount, "treasury")?;
        Ok(())
    }

    /// Absolute overwrite, not a delta.
    pub fn set_rates(&mut self, reward_rate: u64, treasury_rate: u64) {
        self.reward_rate = reward_rate;
        self.treasury_rate = treasury_rate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::token_amount;
    use alloy_primitives::U256;
    use rust_decimal_macros::dec;

    #[test]
    fn test_baseline_defaults() {
        let market = Market::new(4);
        assert_eq!(market.id(), "1");
        assert_eq!(market.epoch, 4);
        assert!(!market.paused);
        assert_eq!(market.reward_rate, 3);
        assert_eq!(market.treasury_rate, 97);
        assert_eq!(market.total_users, 0);
        assert_eq!(market.total_token, Tokens::ZERO);
    }

    #[test]
    fn test_record_bet_splits_by_side() {
        let mut market = Market::new(1);

        market.record_bet(Position::Bull, token_amount(dec!(2))).unwrap();
        market.record_bet(Position::Bear, token_amount(dec!(0.5))).unwrap();
        market.record_bet(Position::Bull, token_amount(dec!(1.25))).unwrap();

        assert_eq!(market.total_bets, 3);
        assert_eq!(market.total_bets_bull, 2);
        assert_eq!(market.total_bets_bear, 1);
        assert_eq!(market.total_token, token_amount(dec!(3.75)));
        assert_eq!(market.total_token_bull, token_amount(dec!(3.25)));
        assert_eq!(market.total_token_bear, token_amount(dec!(0.5)));
    }

    #[test]
    fn test_whale_bets_sum_exactly() {
        let mut market = Market::new(1);
        let whale: Tokens = "70000000000".parse().unwrap();

        market.record_bet(Position::Bull, whale).unwrap();
        market.record_bet(Position::Bull, whale).unwrap();
        market
            .record_bet(Position::Bear, Tokens::from_wei(U256::from(1u64)))
            .unwrap();

        assert_eq!(market.total_token.to_string(), "140000000000.000000000000000001");
        assert_eq!(market.total_token_bull.to_string(), "140000000000");
        assert_eq!(market.total_token_bear.to_string(), "0.000000000000000001");
    }

    #[test]
    fn test_rates_overwrite() {
        let mut market = Market::new(1);
        market.set_rates(90, 10);
        market.set_rates(95, 5);
        assert_eq!(market.reward_rate, 95);
        assert_eq!(market.treasury_rate, 5);
    }

    #[test]
    fn test_record_bet_overflow_leaves_totals() {
        let mut market = Market::new(1);
        market.total_token = Tokens::from_wei(U256::MAX);

        assert!(market.record_bet(Position::Bull, token_amount(dec!(1))).is_err());
        assert_eq!(market.total_bets, 0);
        assert_eq!(market.total_bets_bull, 0);
        assert_eq!(market.total_token_bull, Tokens::ZERO);
    }
}
