use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use super::Store;
use crate::error::Result;
use crate::state::{Bet, BetKey, Market, Round, User};

/// Serialized form of a [`MemoryStore`], entities sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub cursor: Option<u64>,
    pub market: Option<Market>,
    pub rounds: Vec<Round>,
    pub users: Vec<User>,
    pub bets: Vec<Bet>,
}

/// In-process entity store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    cursor: Option<u64>,
    market: Option<Market>,
    rounds: BTreeMap<u64, Round>,
    users: HashMap<Address, User>,
    bets: HashMap<BetKey, Bet>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            cursor: snapshot.cursor,
            market: snapshot.market,
            rounds: snapshot.rounds.into_iter().map(|r| (r.epoch, r)).collect(),
            users: snapshot.users.into_iter().map(|u| (u.address, u)).collect(),
            bets: snapshot.bets.into_iter().map(|b| (b.key(), b)).collect(),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut users: Vec<User> = self.users.values().cloned().collect();
        users.sort_by_key(|u| u.address);

        let mut bets: Vec<Bet> = self.bets.values().cloned().collect();
        bets.sort_by_key(|b| (b.round, b.user));

        Snapshot {
            cursor: self.cursor,
            market: self.market.clone(),
            rounds: self.rounds.values().cloned().collect(),
            users,
            bets,
        }
    }

    /// Write the store as pretty JSON.
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&contents)?;
        Ok(Self::from_snapshot(snapshot))
    }

    // =========================================================================
    // READ ACCESS
    // =========================================================================

    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn bet_count(&self) -> usize {
        self.bets.len()
    }
}

impl Store for MemoryStore {
    fn market(&self) -> Result<Option<Market>> {
        Ok(self.market.clone())
    }

    fn save_market(&mut self, market: Market) -> Result<()> {
        self.market = Some(market);
        Ok(())
    }

    fn round(&self, epoch: u64) -> Result<Option<Round>> {
        Ok(self.rounds.get(&epoch).cloned())
    }

    fn save_round(&mut self, round: Round) -> Result<()> {
        self.rounds.insert(round.epoch, round);
        Ok(())
    }

    fn user(&self, address: &Address) -> Result<Option<User>> {
        Ok(self.users.get(address).cloned())
    }

    fn save_user(&mut self, user: User) -> Result<()> {
        self.users.insert(user.address, user);
        Ok(())
    }

    fn bet(&self, key: &BetKey) -> Result<Option<Bet>> {
        Ok(self.bets.get(key).cloned())
    }

    fn save_bet(&mut self, bet: Bet) -> Result<()> {
        self.bets.insert(bet.key(), bet);
        Ok(())
    }

    fn cursor(&self) -> Result<Option<u64>> {
        Ok(self.cursor)
    }

    fn set_cursor(&mut self, seq: u64) -> Result<()> {
        self.cursor = Some(seq);
        Ok(())
    }
}
