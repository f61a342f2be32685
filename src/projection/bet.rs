use alloy_primitives::{Address, U256};
use tracing::debug;

use super::{market_or_init, require_round, scale};
use crate::error::Result;
use crate::events::{BlockContext, Position};
use crate::state::{Bet, BetKey, User};
use crate::store::Store;

/// Record a bet against the market, its round, the bettor and a new bet
/// entity.
///
/// Everything is computed on loaded copies first; nothing is written unless
/// every step succeeds.
pub fn on_bet<S: Store>(
    store: &mut S,
    sender: Address,
    epoch: u64,
    raw_amount: U256,
    raw_position: u8,
    block: &BlockContext,
) -> Result<()> {
    let amount = scale::amount(raw_amount);
    let position = Position::from_raw(raw_position);

    let mut round = require_round(store, "Bet", epoch)?;
    let mut market = market_or_init(store, epoch)?;

    // Only a user seen for the first time counts towards total_users
    let mut user = match store.user(&sender)? {
        Some(user) => user,
        None => {
            market.register_user();
            User::new(sender, block)
        }
    };

    market.record_bet(position, amount)?;
    round.record_bet(position, amount)?;
    user.record_bet(amount, block.timestamp)?;

    let key = BetKey::new(sender, epoch);
    let bet = Bet::new(key, position, amount, block);

    store.save_market(market)?;
    store.save_round(round)?;
    store.save_user(user)?;
    store.save_bet(bet)?;

    debug!(bet = %key.id(), epoch, ?position, %amount, "bet recorded");
    Ok(())
}

/// Mark the matching bet as claimed. Returns false when there is no such bet;
/// that claim is ignored.
pub fn on_claim<S: Store>(
    store: &mut S,
    sender: Address,
    epoch: u64,
    raw_amount: U256,
    block: &BlockContext,
) -> Result<bool> {
    let key = BetKey::new(sender, epoch);
    let Some(mut bet) = store.bet(&key)? else {
        debug!(bet = %key.id(), epoch, "claim without a recorded bet");
        return Ok(false);
    };

    let amount = scale::amount(raw_amount);
    bet.claim(amount, block.tx_hash, block.timestamp);
    store.save_bet(bet)?;

    debug!(bet = %key.id(), epoch, %amount, "bet claimed");
    Ok(true)
}
