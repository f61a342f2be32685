use tracing::debug;

use super::market_or_init;
use crate::error::Result;
use crate::store::Store;

/// Pause the market and fail the round in progress along with its
/// predecessor, which can no longer end either.
///
/// A pause for a round that was never started only updates the market.
pub fn on_pause<S: Store>(store: &mut S, epoch: u64) -> Result<()> {
    let mut market = market_or_init(store, epoch)?;
    market.epoch = epoch;
    market.paused = true;
    store.save_market(market)?;

    let Some(mut round) = store.round(epoch)? else {
        debug!(epoch, "pause without a started round");
        return Ok(());
    };
    let previous = round.previous;
    round.fail();
    store.save_round(round)?;

    if let Some(previous) = previous {
        if let Some(mut round) = store.round(previous)? {
            round.fail();
            store.save_round(round)?;
        }
    }

    debug!(epoch, "market paused");
    Ok(())
}

pub fn on_unpause<S: Store>(store: &mut S, epoch: u64) -> Result<()> {
    let mut market = market_or_init(store, epoch)?;
    market.epoch = epoch;
    market.paused = false;
    store.save_market(market)?;

    debug!(epoch, "market unpaused");
    Ok(())
}

pub fn on_rates_updated<S: Store>(
    store: &mut S,
    epoch: u64,
    reward_rate: u64,
    treasury_rate: u64,
) -> Result<()> {
    let mut market = market_or_init(store, epoch)?;
    market.set_rates(reward_rate, treasury_rate);
    store.save_market(market)?;

    debug!(epoch, reward_rate, treasury_rate, "rates updated");
    Ok(())
}
