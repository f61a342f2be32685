use alloy_primitives::TxHash;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{add_amount, Tokens};
use crate::error::Result;
use crate::events::{BlockContext, Position};

/// Where a lifecycle event landed on chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamp {
    pub at: u64,
    pub block: u64,
    pub hash: TxHash,
}

impl From<&BlockContext> for Stamp {
    fn from(block: &BlockContext) -> Self {
        Self {
            at: block.timestamp,
            block: block.number,
            hash: block.tx_hash,
        }
    }
}

/// One betting cycle, keyed by epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub epoch: u64,
    /// Epoch of the previous round, None for epoch 0
    pub previous: Option<u64>,

    pub start: Stamp,
    pub lock: Option<Stamp>,
    pub end: Option<Stamp>,

    pub open_price: Decimal,
    pub lock_price: Option<Decimal>,
    pub close_price: Option<Decimal>,

    /// Winning side. None while unresolved and on an exact tie.
    pub position: Option<Position>,
    pub failed: bool,

    pub total_bets: u64,
    pub total_amount: Tokens,
    pub bull_bets: u64,
    pub bull_amount: Tokens,
    pub bear_bets: u64,
    pub bear_amount: Tokens,

    /// Treasury fee of this round only, set once rewards are calculated
    pub total_amount_treasury: Option<Tokens>,
}

impl Round {
    /// A freshly started round.
    pub fn start(epoch: u64, open_price: Decimal, start: Stamp) -> Self {
        Self {
            epoch,
            previous: epoch.checked_sub(1),
            start,
            lock: None,
            end: None,
            open_price,
            lock_price: None,
            close_price: None,
            position: None,
            failed: false,
            total_bets: 0,
            total_amount: Tokens::ZERO,
            bull_bets: 0,
            bull_amount: Tokens::ZERO,
            bear_bets: 0,
            bear_amount: Tokens::ZERO,
            total_amount_treasury: None,
        }
    }

    pub fn id(&self) -> String {
        self.epoch.to_string()
    }

    pub fn previous_id(&self) -> Option<String> {
        self.previous.map(|epoch| epoch.to_string())
    }

    pub fn lock(&mut self, price: Decimal, stamp: Stamp) {
        self.lock = Some(stamp);
        self.lock_price = Some(price);
    }

    /// Close the round and resolve the winning side.
    ///
    /// Ending proves the round completed, so any failure flag set by an
    /// earlier pause is cleared.
    pub fn end(&mut self, close_price: Decimal, stamp: Stamp) -> Option<Position> {
        self.end = Some(stamp);
        self.close_price = Some(close_price);
        self.position = resolve(self.open_price, close_price);
        self.failed = false;
        self.position
    }

    pub fn fail(&mut self) {
        self.failed = true;
    }

    pub fn record_bet(&mut self, position: Position, amount: Tokens) -> Result<()> {
        let total_amount = add_amount(self.total_amount, amount, "round total")?;
        match position {
            Position::Bull => {
                self.bull_amount = add_amount(self.bull_amount, amount, "round bull")?;
                self.bull_bets += 1;
            }
            Position::Bear => {
                self.bear_amount = add_amount(self.bear_amount, amount, "round bear")?;
                self.bear_bets += 1;
            }
        }
        self.total_amount = total_amount;
        self.total_bets += 1;
        Ok(())
    }

    /// Per-round figure: overwritten, never accumulated.
    pub fn settle_treasury(&mut self, amount: Tokens) {
        self.total_amount_treasury = Some(amount);
    }
}

/// Winning side for a round. Exact comparison, a tie resolves to None.
pub fn resolve(open_price: Decimal, close_price: Decimal) -> Option<Position> {
    if close_price > open_price {
        Some(Position::Bull)
    } else if close_price < open_price {
        Some(Position::Bear)
    } else {
        None
    }
}
