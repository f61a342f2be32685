mod memory;

pub use memory::{MemoryStore, Snapshot};

use alloy_primitives::Address;

use crate::error::Result;
use crate::state::{Bet, BetKey, Market, Round, User};

/// Entity storage the projection reads from and writes to.
///
/// Loads return owned copies; a handler mutates them and saves them back.
/// The store is expected to make each read-modify-write visible as one unit
/// to concurrent readers. It does no locking of its own beyond that.
pub trait Store {
    /// The singleton market, if it has been created.
    fn market(&self) -> Result<Option<Market>>;
    fn save_market(&mut self, market: Market) -> Result<()>;

    fn round(&self, epoch: u64) -> Result<Option<Round>>;
    fn save_round(&mut self, round: Round) -> Result<()>;

    fn user(&self, address: &Address) -> Result<Option<User>>;
    fn save_user(&mut self, user: User) -> Result<()>;

    fn bet(&self, key: &BetKey) -> Result<Option<Bet>>;
    fn save_bet(&mut self, bet: Bet) -> Result<()>;

    /// Sequence number of the last applied event.
    fn cursor(&self) -> Result<Option<u64>>;
    fn set_cursor(&mut self, seq: u64) -> Result<()>;
}
