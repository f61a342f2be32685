//! Projection of contract events into market, round, user and bet entities.
//!
//! Events are applied one at a time, in log order. Each handler reads what it
//! needs, checks its preconditions and only then writes, so a failed event
//! leaves the store as it was.
//!
//! Two kinds of missing state are distinguished:
//!
//! - An event that needs a round (or the market) an earlier event should have
//!   created is an [`OrderingViolation`] and stops the stream.
//! - A claim for an unknown bet, or a pause for a round that never started,
//!   is expected and ignored.

mod bet;
mod market;
mod rewards;
mod round;
pub mod scale;

pub use bet::{on_bet, on_claim};
pub use market::{on_pause, on_rates_updated, on_unpause};
pub use rewards::on_rewards_calculated;
pub use round::{on_end_round, on_lock_round, on_start_round};

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{OrderingViolation, Result};
use crate::events::{ContractEvent, Log};
use crate::state::{Market, Round};
use crate::store::Store;

/// What happened to an event offered to [`Projector::process`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// At or behind the cursor, already reflected in the store
    Skipped,
}

/// Counters kept while projecting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectorStats {
    /// Applied events by name
    pub applied: BTreeMap<&'static str, u64>,
    pub skipped: u64,
    pub claims_ignored: u64,
}

impl ProjectorStats {
    pub fn total_applied(&self) -> u64 {
        self.applied.values().sum()
    }
}

/// Applies contract logs to a [`Store`].
pub struct Projector<S: Store> {
    store: S,
    stats: ProjectorStats,
}

impl<S: Store> Projector<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            stats: ProjectorStats::default(),
        }
    }

    /// Apply the event at position `seq` of the log, unless the store has
    /// already seen it. The cursor only advances on success.
    pub fn process(&mut self, seq: u64, log: &Log) -> Result<Outcome> {
        if let Some(cursor) = self.store.cursor()? {
            if seq <= cursor {
                debug!(seq, cursor, "event behind cursor, skipping");
                self.stats.skipped += 1;
                return Ok(Outcome::Skipped);
            }
        }

        self.apply(log)?;
        self.store.set_cursor(seq)?;
        Ok(Outcome::Applied)
    }

    /// Apply one event, ignoring the cursor.
    pub fn apply(&mut self, log: &Log) -> Result<()> {
        let block = &log.block;
        let store = &mut self.store;

        match &log.event {
            ContractEvent::Pause { epoch } => on_pause(store, *epoch)?,
            ContractEvent::Unpause { epoch } => on_unpause(store, *epoch)?,
            ContractEvent::RatesUpdated {
                epoch,
                reward_rate,
                treasury_rate,
            } => on_rates_updated(store, *epoch, *reward_rate, *treasury_rate)?,
            ContractEvent::StartRound { epoch, price } => {
                on_start_round(store, *epoch, *price, block)?
            }
            ContractEvent::LockRound { epoch, price } => {
                on_lock_round(store, *epoch, *price, block)?
            }
            ContractEvent::EndRound { epoch, price } => on_end_round(store, *epoch, *price, block)?,
            ContractEvent::Bet {
                sender,
                current_epoch,
                amount,
                position,
            } => on_bet(store, *sender, *current_epoch, *amount, *position, block)?,
            ContractEvent::Claim {
                sender,
                current_epoch,
                amount,
            } => {
                if !on_claim(store, *sender, *current_epoch, *amount, block)? {
                    self.stats.claims_ignored += 1;
                }
            }
            ContractEvent::RewardsCalculated {
                epoch,
                treasury_amount,
            } => on_rewards_calculated(store, *epoch, *treasury_amount)?,
        }

        *self.stats.applied.entry(log.event.name()).or_default() += 1;
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn stats(&self) -> &ProjectorStats {
        &self.stats
    }
}

/// Load the market, creating it with baseline values if it does not exist yet.
fn market_or_init<S: Store>(store: &S, epoch: u64) -> Result<Market> {
    Ok(store.market()?.unwrap_or_else(|| {
        debug!(epoch, "initializing market");
        Market::new(epoch)
    }))
}

fn require_market<S: Store>(store: &S, event: &'static str) -> Result<Market> {
    store
        .market()?
        .ok_or_else(|| OrderingViolation::MissingMarket { event }.into())
}

fn require_round<S: Store>(store: &S, event: &'static str, epoch: u64) -> Result<Round> {
    store
        .round(epoch)?
        .ok_or_else(|| OrderingViolation::MissingRound { event, epoch }.into())
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::error::Error;
    use crate::events::Position;
    use crate::state::{token_amount, BetKey};
    use crate::store::MemoryStore;
    use rust_decimal_macros::dec;

    fn projector() -> Projector<MemoryStore> {
        Projector::new(MemoryStore::new())
    }

    #[test]
    fn test_full_round_lifecycle() {
        let mut p = projector();

        p.apply(&log(1, start(0, 3000))).unwrap();
        p.apply(&log(2, bet(0xaa, 0, 2000, 0))).unwrap();
        p.apply(&log(3, bet(0xbb, 0, 500, 1))).unwrap();
        p.apply(&log(
            4,
            ContractEvent::LockRound {
                epoch: 0,
                price: price(3001),
            },
        ))
        .unwrap();
        p.apply(&log(5, start(1, 3001))).unwrap();
        p.apply(&log(
            6,
            ContractEvent::EndRound {
                epoch: 0,
                price: price(3010),
            },
        ))
        .unwrap();
        p.apply(&log(
            7,
            ContractEvent::RewardsCalculated {
                epoch: 0,
                treasury_amount: milli(75),
            },
        ))
        .unwrap();
        p.apply(&log(
            8,
            ContractEvent::Claim {
                sender: addr(0xaa),
                current_epoch: 0,
                amount: milli(2425),
            },
        ))
        .unwrap();

        let store = p.store();
        let round = store.round(0).unwrap().unwrap();
        assert_eq!(round.position, Some(Position::Bull));
        assert_eq!(round.lock_price, Some(dec!(3001)));
        assert_eq!(round.total_amount, token_amount(dec!(2.5)));
        assert_eq!(round.total_amount_treasury, Some(token_amount(dec!(0.075))));

        let market = store.market().unwrap().unwrap();
        assert_eq!(market.epoch, 1);
        assert_eq!(market.total_users, 2);
        assert_eq!(market.total_token_treasury, token_amount(dec!(0.075)));

        let claimed = store.bet(&BetKey::new(addr(0xaa), 0)).unwrap().unwrap();
        assert!(claimed.claimed);
        assert_eq!(claimed.claimed_amount, Some(token_amount(dec!(2.425))));
        assert_eq!(claimed.claimed_hash, Some(block(8).tx_hash));

        let unclaimed = store.bet(&BetKey::new(addr(0xbb), 0)).unwrap().unwrap();
        assert!(!unclaimed.claimed);

        assert_eq!(p.stats().total_applied(), 8);
        assert_eq!(p.stats().applied.get("Bet"), Some(&2));
    }

    #[test]
    fn test_previous_links_form_chain() {
        let mut p = projector();
        for epoch in 0..5 {
            p.apply(&log(epoch + 1, start(epoch, 100))).unwrap();
        }

        let store = p.store();
        assert_eq!(store.round(0).unwrap().unwrap().previous, None);
        for epoch in 1..5u64 {
            let round = store.round(epoch).unwrap().unwrap();
            let previous = store.round(epoch - 1).unwrap().unwrap();
            assert_eq!(round.previous_id(), Some(previous.id()));
        }
    }

    #[test]
    fn test_market_bet_totals_balance() {
        let mut p = projector();
        p.apply(&log(1, start(3, 100))).unwrap();

        let sides = [0u8, 1, 1, 0, 2, 0, 1];
        for (i, side) in sides.iter().enumerate() {
            p.apply(&log(2 + i as u64, bet(i as u8, 3, 100 + i as u128, *side)))
                .unwrap();

            let market = p.store().market().unwrap().unwrap();
            assert_eq!(
                market.total_bets,
                market.total_bets_bull + market.total_bets_bear
            );
            assert_eq!(
                market.total_token_bull.checked_add(market.total_token_bear),
                Some(market.total_token)
            );
        }

        let market = p.store().market().unwrap().unwrap();
        assert_eq!(market.total_bets_bull, 3);
        assert_eq!(market.total_bets_bear, 4);
    }

    #[test]
    fn test_process_advances_cursor() {
        let mut p = projector();

        assert_eq!(p.process(1, &log(1, start(0, 100))).unwrap(), Outcome::Applied);
        assert_eq!(p.process(2, &log(2, bet(0xaa, 0, 1000, 0))).unwrap(), Outcome::Applied);
        assert_eq!(p.store().cursor().unwrap(), Some(2));

        // Replaying the same prefix must not count the bet twice
        assert_eq!(p.process(1, &log(1, start(0, 100))).unwrap(), Outcome::Skipped);
        assert_eq!(p.process(2, &log(2, bet(0xaa, 0, 1000, 0))).unwrap(), Outcome::Skipped);

        let market = p.store().market().unwrap().unwrap();
        assert_eq!(market.total_bets, 1);
        assert_eq!(p.stats().skipped, 2);
    }

    #[test]
    fn test_failed_event_does_not_advance_cursor() {
        let mut p = projector();
        p.process(1, &log(1, start(0, 100))).unwrap();

        let err = p
            .process(
                2,
                &log(
                    2,
                    ContractEvent::LockRound {
                        epoch: 1,
                        price: price(100),
                    },
                ),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            Error::OrderingViolation(OrderingViolation::MissingRound {
                event: "LockRound",
                epoch: 1
            })
        ));
        assert_eq!(p.store().cursor().unwrap(), Some(1));
        assert_eq!(p.stats().total_applied(), 1);
    }

    #[test]
    fn test_sample_log_projects() {
        let mut p = projector();
        let sample = include_str!("../../demos/sample_events.ndjson");

        for (i, line) in sample.lines().enumerate() {
            let seq = i as u64 + 1;
            if let Some(log) = crate::feeds::replay::parse_line(seq, line).unwrap() {
                p.process(seq, &log).unwrap();
            }
        }

        let store = p.store();
        let market = store.market().unwrap().unwrap();
        assert_eq!(market.epoch, 2);
        assert!(!market.paused);
        assert_eq!((market.reward_rate, market.treasury_rate), (97, 3));
        assert_eq!(market.total_users, 2);
        assert_eq!(market.total_token, token_amount(dec!(2.5)));
        assert_eq!(market.total_token_treasury, token_amount(dec!(0.075)));

        let round = store.round(1).unwrap().unwrap();
        assert_eq!(round.open_price, dec!(3000));
        assert_eq!(round.lock_price, Some(dec!(3001.5)));
        assert_eq!(round.close_price, Some(dec!(3010)));
        assert_eq!(round.position, Some(Position::Bull));
        // The pause during round 2 also fails its already ended predecessor
        assert!(round.failed);
        assert!(store.round(2).unwrap().unwrap().failed);

        let bet = store.bet(&BetKey::new(addr(0xaa), 1)).unwrap().unwrap();
        assert_eq!(bet.claimed_amount, Some(token_amount(dec!(2.425))));
        assert_eq!(store.cursor().unwrap(), Some(11));
    }

    #[test]
    fn test_ignored_claims_counted() {
        let mut p = projector();
        p.apply(&log(
            1,
            ContractEvent::Claim {
                sender: addr(0xaa),
                current_epoch: 9,
                amount: milli(1000),
            },
        ))
        .unwrap();

        assert_eq!(p.stats().claims_ignored, 1);
        assert_eq!(p.store().bet_count(), 0);
        assert!(p.store().market().unwrap().is_none());
    }
}
