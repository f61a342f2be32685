use alloy_primitives::U256;
use tracing::debug;

use super::{require_market, require_round, scale};
use crate::error::Result;
use crate::store::Store;

/// Book the treasury fee of a settled round: added to the market's all-time
/// total, stored as-is on the round.
pub fn on_rewards_calculated<S: Store>(
    store: &mut S,
    epoch: u64,
    raw_treasury_amount: U256,
) -> Result<()> {
    let mut market = require_market(store, "RewardsCalculated")?;
    let mut round = require_round(store, "RewardsCalculated", epoch)?;
    let treasury = scale::amount(raw_treasury_amount);

    market.add_treasury(treasury)?;
    round.settle_treasury(treasury);

    store.save_market(market)?;
    store.save_round(round)?;

    debug!(epoch, %treasury, "rewards calculated");
    Ok(())
}
