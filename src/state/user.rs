use alloy_primitives::{hex, Address};
use serde::{Deserialize, Serialize};

use super::{add_amount, Tokens};
use crate::error::Result;
use crate::events::BlockContext;

/// Per-address betting aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub address: Address,
    pub created_at: u64,
    pub updated_at: u64,
    /// Block of the first bet
    pub block: u64,
    pub total_bets: u64,
    pub total_token: Tokens,
}

impl User {
    /// New user with zeroed aggregates, first seen in `block`.
    pub fn new(address: Address, block: &BlockContext) -> Self {
        Self {
            address,
            created_at: block.timestamp,
            updated_at: block.timestamp,
            block: block.number,
            total_bets: 0,
            total_token: Tokens::ZERO,
        }
    }

    /// Lowercase 0x-prefixed address.
    pub fn id(&self) -> String {
        hex::encode_prefixed(self.address)
    }

    pub fn record_bet(&mut self, amount: Tokens, timestamp: u64) -> Result<()> {
        self.total_token = add_amount(self.total_token, amount, "user total")?;
        self.total_bets += 1;
        self.updated_at = timestamp;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::token_amount;
    use alloy_primitives::TxHash;
    use rust_decimal_macros::dec;

    fn block(number: u64, timestamp: u64) -> BlockContext {
        BlockContext {
            number,
            timestamp,
            tx_hash: TxHash::ZERO,
        }
    }

    #[test]
    fn test_new_user() {
        let user = User::new(Address::with_last_byte(0xaa), &block(10, 1000));
        assert_eq!(user.id(), "0x00000000000000000000000000000000000000aa");
        assert_eq!(user.created_at, 1000);
        assert_eq!(user.updated_at, 1000);
        assert_eq!(user.block, 10);
        assert_eq!(user.total_bets, 0);
    }

    #[test]
    fn test_record_bet_accumulates() {
        let mut user = User::new(Address::with_last_byte(0xaa), &block(10, 1000));
        user.record_bet(token_amount(dec!(2)), 1000).unwrap();
        user.record_bet(token_amount(dec!(0.75)), 1300).unwrap();

        assert_eq!(user.total_bets, 2);
        assert_eq!(user.total_token, token_amount(dec!(2.75)));
        assert_eq!(user.created_at, 1000);
        assert_eq!(user.updated_at, 1300);
    }
}
