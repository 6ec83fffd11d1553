//! Stake-keyed waiting queues that pair users into matches.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use crate::domain::state::{EndReason, MatchId, UserId};
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};
use crate::services::match_registry::MatchRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Queued at `stake`; `position` counts from 1.
    Waiting { stake: i64, position: usize },
    Matched { match_id: MatchId, opponent: UserId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    Dequeued,
    Forfeited,
    Idle,
}

pub struct Lobby {
    registry: Arc<MatchRegistry>,
    min_stake: i64,
    max_stake: i64,
    queues: Mutex<HashMap<i64, VecDeque<UserId>>>,
}

impl Lobby {
    pub fn new(registry: Arc<MatchRegistry>, min_stake: i64, max_stake: i64) -> Self {
        Self {
            registry,
            min_stake,
            max_stake,
            queues: Mutex::new(HashMap::new()),
        }
    }

    pub fn join(&self, user: UserId, stake: i64) -> Result<JoinOutcome, DomainError> {
        if !(self.min_stake..=self.max_stake).contains(&stake) {
            return Err(DomainError::validation(
                ValidationKind::InvalidStake,
                format!(
                    "Stake {stake} outside {}..={}",
                    self.min_stake, self.max_stake
                ),
            ));
        }
        if let Some(match_id) = self.registry.match_of(user) {
            return Err(DomainError::conflict(
                ConflictKind::AlreadyInMatch,
                format!("User {user} is already playing match {match_id}"),
            ));
        }

        let mut queues = self.queues.lock();

        // A user waits in at most one queue.
        for (&other_stake, queue) in queues.iter_mut() {
            if other_stake != stake {
                queue.retain(|&u| u != user);
            }
        }
        queues.retain(|_, q| !q.is_empty());

        let queue = queues.entry(stake).or_default();
        if let Some(pos) = queue.iter().position(|&u| u == user) {
            return Ok(JoinOutcome::Waiting {
                stake,
                position: pos + 1,
            });
        }

        let Some(opponent) = queue.pop_front() else {
            queue.push_back(user);
            return Ok(JoinOutcome::Waiting { stake, position: 1 });
        };

        match self.registry.start_match([opponent, user], stake) {
            Ok(match_id) => {
                if queue.is_empty() {
                    queues.remove(&stake);
                }
                info!(match_id = %match_id, stake, "lobby paired users");
                Ok(JoinOutcome::Matched { match_id, opponent })
            }
            Err(err) => {
                queue.push_front(opponent);
                Err(err)
            }
        }
    }

    /// Leave the queue, or forfeit the active match as a disconnect.
    pub fn leave(&self, user: UserId) -> LeaveOutcome {
        let mut dequeued = false;
        {
            let mut queues = self.queues.lock();
            for queue in queues.values_mut() {
                let before = queue.len();
                queue.retain(|&u| u != user);
                dequeued |= queue.len() != before;
            }
            queues.retain(|_, q| !q.is_empty());
        }
        if dequeued {
            return LeaveOutcome::Dequeued;
        }
        if self.registry.request_forfeit(user, EndReason::Disconnect) {
            return LeaveOutcome::Forfeited;
        }
        LeaveOutcome::Idle
    }

    pub fn waiting(&self, stake: i64) -> usize {
        self.queues.lock().get(&stake).map_or(0, VecDeque::len)
    }
}
