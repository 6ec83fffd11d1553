//! Balance ledger collaborator and its in-memory implementation.

use std::collections::{HashMap, HashSet, VecDeque};

use parking_lot::Mutex;
use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::state::{EndReason, MatchId, UserId};

/// Newest-first settlement history is truncated to this many entries.
pub const HISTORY_CAP: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Account {
    pub balance: i64,
    pub wins: u32,
    pub profit: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementRecord {
    pub match_id: MatchId,
    pub winner: UserId,
    pub loser: UserId,
    pub stake: i64,
    pub amount: i64,
    pub reason: EndReason,
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
}

/// Where match winnings land. Implementations must make
/// `record_settlement` idempotent per match id.
pub trait Ledger: Send + Sync {
    fn credit(&self, user: UserId, amount: i64);
    fn record_win(&self, user: UserId);
    /// Returns `true` only the first time a given match id is recorded.
    fn record_settlement(&self, record: &SettlementRecord) -> bool;
}

#[derive(Debug, Default)]
struct LedgerInner {
    accounts: HashMap<UserId, Account>,
    settled: HashSet<MatchId>,
    history: VecDeque<SettlementRecord>,
}

#[derive(Debug)]
pub struct InMemoryLedger {
    starting_balance: i64,
    inner: Mutex<LedgerInner>,
}

impl InMemoryLedger {
    pub fn new(starting_balance: i64) -> Self {
        Self {
            starting_balance,
            inner: Mutex::new(LedgerInner::default()),
        }
    }

    /// Current account for `user`; unknown users report the starting balance.
    pub fn account(&self, user: UserId) -> Account {
        self.inner
            .lock()
            .accounts
            .get(&user)
            .copied()
            .unwrap_or_else(|| self.fresh_account())
    }

    /// Settlement history, newest first.
    pub fn history(&self) -> Vec<SettlementRecord> {
        self.inner.lock().history.iter().cloned().collect()
    }

    fn fresh_account(&self) -> Account {
        Account {
            balance: self.starting_balance,
            wins: 0,
            profit: 0,
        }
    }
}

impl Ledger for InMemoryLedger {
    fn credit(&self, user: UserId, amount: i64) {
        let fresh = self.fresh_account();
        let mut inner = self.inner.lock();
        let account = inner.accounts.entry(user).or_insert(fresh);
        account.balance += amount;
        account.profit += amount;
    }

    fn record_win(&self, user: UserId) {
        let fresh = self.fresh_account();
        let mut inner = self.inner.lock();
        inner.accounts.entry(user).or_insert(fresh).wins += 1;
    }

    fn record_settlement(&self, record: &SettlementRecord) -> bool {
        let mut inner = self.inner.lock();
        if !inner.settled.insert(record.match_id) {
            return false;
        }
        inner.history.push_front(record.clone());
        inner.history.truncate(HISTORY_CAP);
        true
    }
}
