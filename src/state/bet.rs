use alloy_primitives::{hex, Address, TxHash};
use serde::{Deserialize, Serialize};

use super::Tokens;
use crate::events::{BlockContext, Position};

/// Composite key of a bet: one per sender per epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BetKey {
    pub sender: Address,
    pub epoch: u64,
}

impl BetKey {
    pub fn new(sender: Address, epoch: u64) -> Self {
        Self { sender, epoch }
    }

    /// Sender bytes followed by the epoch as a 4-byte little-endian int.
    /// Matches the ids of the existing subgraph deployment.
    ///
    /// Epochs past `u32::MAX` get all 8 bytes instead of wrapping, so they
    /// never collide with a low epoch.
    pub fn id(&self) -> String {
        let mut bytes = self.sender.to_vec();
        match u32::try_from(self.epoch) {
            Ok(epoch) => bytes.extend_from_slice(&epoch.to_le_bytes()),
            Err(_) => bytes.extend_from_slice(&self.epoch.to_le_bytes()),
        }
        hex::encode_prefixed(bytes)
    }
}

/// A single wager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bet {
    /// Epoch of the round bet on
    pub round: u64,
    /// Address of the bettor
    pub user: Address,
    pub hash: TxHash,
    pub amount: Tokens,
    pub position: Position,

    pub claimed: bool,
    pub claimed_amount: Option<Tokens>,
    pub claimed_hash: Option<TxHash>,

    pub created_at: u64,
    pub updated_at: u64,
    pub block: u64,
}

impl Bet {
    pub fn new(key: BetKey, position: Position, amount: Tokens, block: &BlockContext) -> Self {
        Self {
            round: key.epoch,
            user: key.sender,
            hash: block.tx_hash,
            amount,
            position,
            claimed: false,
            claimed_amount: None,
            claimed_hash: None,
            created_at: block.timestamp,
            updated_at: block.timestamp,
            block: block.number,
        }
    }

    pub fn key(&self) -> BetKey {
        BetKey::new(self.user, self.round)
    }

    /// Record a payout. Repeating it just overwrites the same fields.
    pub fn claim(&mut self, amount: Tokens, hash: TxHash, timestamp: u64) {
        self.claimed = true;
        self.claimed_amount = Some(amount);
        self.claimed_hash = Some(hash);
        self.updated_at = timestamp;
    }
}
