use alloy_primitives::{Address, TxHash, I256, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Messages flowing from a feed into the projection loop.
pub enum Event {
    // One decoded contract log. `seq` is its position in the source log.
    Log { seq: u64, log: Log },

    // The feed could not read or decode an entry; processing must stop.
    Fault { reason: String },

    // End of input or Ctrl+C
    Shutdown,
}

/// Block metadata attached to every log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockContext {
    pub number: u64,
    /// Unix seconds
    pub timestamp: u64,
    pub tx_hash: TxHash,
}

impl BlockContext {
    /// Block time as a UTC datetime, for logging.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(i64::try_from(self.timestamp).ok()?, 0)
    }
}

/// A contract log together with the block it was mined in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    pub block: BlockContext,
    #[serde(flatten)]
    pub event: ContractEvent,
}

/// Events emitted by the prediction market contract.
///
/// Prices are raw oracle answers with 8 decimals, amounts are raw token
/// amounts with 18 decimals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum ContractEvent {
    Pause {
        epoch: u64,
    },
    Unpause {
        epoch: u64,
    },
    RatesUpdated {
        epoch: u64,
        reward_rate: u64,
        treasury_rate: u64,
    },
    StartRound {
        epoch: u64,
        price: I256,
    },
    LockRound {
        epoch: u64,
        price: I256,
    },
    EndRound {
        epoch: u64,
        price: I256,
    },
    Bet {
        sender: Address,
        current_epoch: u64,
        amount: U256,
        /// 0 = Bull, anything else = Bear
        position: u8,
    },
    Claim {
        sender: Address,
        current_epoch: u64,
        amount: U256,
    },
    RewardsCalculated {
        epoch: u64,
        treasury_amount: U256,
    },
}

impl ContractEvent {
    /// Event name as the contract ABI spells it.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pause { .. } => "Pause",
            Self::Unpause { .. } => "Unpause",
            Self::RatesUpdated { .. } => "RatesUpdated",
            Self::StartRound { .. } => "StartRound",
            Self::LockRound { .. } => "LockRound",
            Self::EndRound { .. } => "EndRound",
            Self::Bet { .. } => "Bet",
            Self::Claim { .. } => "Claim",
            Self::RewardsCalculated { .. } => "RewardsCalculated",
        }
    }
}

// Which way a bet (or a resolved round) went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Bull,
    Bear,
}

impl Position {
    /// Decode the contract's position byte.
    pub fn from_raw(raw: u8) -> Position {
        if raw == 0 {
            Position::Bull
        } else {
            Position::Bear
        }
    }
}
