use alloy_primitives::I256;
use tracing::{debug, info};

use super::{market_or_init, require_round, scale};
use crate::error::Result;
use crate::events::BlockContext;
use crate::state::{Round, Stamp};
use crate::store::Store;

/// Create the round on first sight. A repeated start leaves the round alone
/// but still moves the market to this epoch and unpauses it.
pub fn on_start_round<S: Store>(
    store: &mut S,
    epoch: u64,
    price: I256,
    block: &BlockContext,
) -> Result<()> {
    let mut market = market_or_init(store, epoch)?;

    if store.round(epoch)?.is_none() {
        let open_price = scale::price(price)?;
        store.save_round(Round::start(epoch, open_price, Stamp::from(block)))?;
        info!(epoch, %open_price, at = ?block.datetime(), "round started");
    } else {
        debug!(epoch, "round already started");
    }

    market.epoch = epoch;
    market.paused = false;
    store.save_market(market)
}

pub fn on_lock_round<S: Store>(
    store: &mut S,
    epoch: u64,
    price: I256,
    block: &BlockContext,
) -> Result<()> {
    let mut round = require_round(store, "LockRound", epoch)?;
    let lock_price = scale::price(price)?;

    round.lock(lock_price, Stamp::from(block));
    store.save_round(round)?;

    debug!(epoch, %lock_price, "round locked");
    Ok(())
}

pub fn on_end_round<S: Store>(
    store: &mut S,
    epoch: u64,
    price: I256,
    block: &BlockContext,
) -> Result<()> {
    let mut round = require_round(store, "EndRound", epoch)?;
    let close_price = scale::price(price)?;

    let position = round.end(close_price, Stamp::from(block));
    store.save_round(round)?;

    info!(epoch, %close_price, ?position, at = ?block.datetime(), "round ended");
    Ok(())
}
