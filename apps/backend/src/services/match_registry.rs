//! Registry of live matches keyed by generated match id.
//!
//! The registry owns creation and teardown; each entry is only a mailbox
//! into the match's own task. A `user -> match` index rejects double
//! seating and routes leave/disconnect forfeits.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use time::{Duration, OffsetDateTime};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::domain::actions::PlayerAction;
use crate::domain::dealing::{new_match, MatchSetup};
use crate::domain::snapshot::PublicSnapshot;
use crate::domain::state::{EndReason, MatchId, MatchOutcome, UserId};
use crate::domain::turn_engine::ActionOutcome;
use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, NotFoundKind};
use crate::services::clock::Clock;
use crate::services::ledger::Ledger;
use crate::services::match_actor::{MatchActor, MatchCommand};
use crate::services::transport::Transport;

#[derive(Debug, Clone)]
pub struct MatchHandle {
    pub players: [UserId; 2],
    pub stake: i64,
    mailbox: mpsc::UnboundedSender<MatchCommand>,
}

impl MatchHandle {
    fn send(&self, command: MatchCommand) -> bool {
        self.mailbox.send(command).is_ok()
    }
}

pub struct MatchRegistry {
    matches: DashMap<MatchId, MatchHandle>,
    by_user: DashMap<UserId, MatchId>,
    ledger: Arc<dyn Ledger>,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    action_window: Duration,
}

impl MatchRegistry {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
        action_window: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            matches: DashMap::new(),
            by_user: DashMap::new(),
            ledger,
            transport,
            clock,
            action_window,
        })
    }

    /// Deal a new match between `players` and spawn its task. The first
    /// player takes seat 0. Must be called inside a tokio runtime.
    pub fn start_match(
        self: &Arc<Self>,
        players: [UserId; 2],
        stake: i64,
    ) -> Result<MatchId, DomainError> {
        self.start_match_seeded(players, stake, rand::random())
    }

    /// As [`start_match`](Self::start_match) with a fixed shuffle seed.
    pub fn start_match_seeded(
        self: &Arc<Self>,
        players: [UserId; 2],
        stake: i64,
        seed: u64,
    ) -> Result<MatchId, DomainError> {
        let id = MatchId::generate();
        let state = new_match(
            MatchSetup {
                id,
                players,
                stake,
                seed,
                action_window: self.action_window,
            },
            self.now(),
        )?;

        self.claim_seats(id, players)?;

        let (tx, rx) = mpsc::unbounded_channel();
        self.matches.insert(
            id,
            MatchHandle {
                players,
                stake,
                mailbox: tx,
            },
        );
        info!(match_id = %id, p0 = players[0], p1 = players[1], stake, "match started");
        tokio::spawn(MatchActor::new(state, rx, Arc::clone(self)).run());
        Ok(id)
    }

    fn claim_seats(&self, id: MatchId, players: [UserId; 2]) -> Result<(), DomainError> {
        let mut claimed = Vec::with_capacity(2);
        for user in players {
            match self.by_user.entry(user) {
                Entry::Occupied(existing) => {
                    let other = *existing.get();
                    drop(existing);
                    for u in claimed {
                        self.by_user.remove(&u);
                    }
                    return Err(DomainError::conflict(
                        ConflictKind::AlreadyInMatch,
                        format!("User {user} is already playing match {other}"),
                    ));
                }
                Entry::Vacant(slot) => {
                    slot.insert(id);
                    claimed.push(user);
                }
            }
        }
        Ok(())
    }

    /// Queue an action without waiting. Unknown matches are ignored.
    pub fn submit(&self, match_id: MatchId, user: UserId, action: PlayerAction) -> bool {
        self.send(
            match_id,
            MatchCommand::Act {
                user,
                action,
                reply: None,
            },
        )
    }

    /// Queue an action and wait until the match task has processed it.
    /// Unknown or already finished matches report `Ignored`.
    pub async fn act(&self, match_id: MatchId, user: UserId, action: PlayerAction) -> ActionOutcome {
        let (tx, rx) = oneshot::channel();
        let sent = self.send(
            match_id,
            MatchCommand::Act {
                user,
                action,
                reply: Some(tx),
            },
        );
        if !sent {
            return ActionOutcome::Ignored;
        }
        rx.await.unwrap_or(ActionOutcome::Ignored)
    }

    /// Forfeit `user`'s current match and wait for the result. `None` when
    /// the user is not seated or the match had already ended.
    pub async fn forfeit(&self, user: UserId, reason: EndReason) -> Option<MatchOutcome> {
        let match_id = self.match_of(user)?;
        let (tx, rx) = oneshot::channel();
        let sent = self.send(
            match_id,
            MatchCommand::Forfeit {
                user,
                reason,
                reply: Some(tx),
            },
        );
        if !sent {
            return None;
        }
        rx.await.ok().flatten()
    }

    /// Fire-and-forget forfeit, usable from synchronous contexts such as a
    /// closing WebSocket session.
    pub fn request_forfeit(&self, user: UserId, reason: EndReason) -> bool {
        let Some(match_id) = self.match_of(user) else {
            return false;
        };
        self.send(
            match_id,
            MatchCommand::Forfeit {
                user,
                reason,
                reply: None,
            },
        )
    }

    pub async fn snapshot(&self, match_id: MatchId) -> Result<PublicSnapshot, DomainError> {
        let (tx, rx) = oneshot::channel();
        if !self.send(match_id, MatchCommand::Snapshot { reply: tx }) {
            return Err(DomainError::not_found(
                NotFoundKind::Match,
                format!("Match {match_id} is not active"),
            ));
        }
        rx.await.map_err(|_| {
            DomainError::infra(
                InfraErrorKind::MailboxClosed,
                format!("Match {match_id} stopped before answering"),
            )
        })
    }

    /// Ask every live match to check its deadline. Returns how many were
    /// poked.
    pub fn sweep(&self) -> usize {
        let mut poked = 0;
        for entry in self.matches.iter() {
            if entry.value().send(MatchCommand::Expire) {
                poked += 1;
            }
        }
        debug!(poked, "deadline sweep");
        poked
    }

    pub fn is_active(&self, match_id: MatchId) -> bool {
        self.matches.contains_key(&match_id)
    }

    pub fn active_count(&self) -> usize {
        self.matches.len()
    }

    pub fn match_of(&self, user: UserId) -> Option<MatchId> {
        self.by_user.get(&user).map(|e| *e.value())
    }

    pub fn handle(&self, match_id: MatchId) -> Option<MatchHandle> {
        self.matches.get(&match_id).map(|e| e.value().clone())
    }

    /// Drop every mailbox; match tasks exit once their queue drains.
    pub fn shutdown(&self) {
        self.matches.clear();
        self.by_user.clear();
    }

    fn send(&self, match_id: MatchId, command: MatchCommand) -> bool {
        match self.matches.get(&match_id) {
            Some(handle) => handle.send(command),
            None => {
                debug!(match_id = %match_id, ?command, "command for inactive match dropped");
                false
            }
        }
    }

    pub(crate) fn teardown(&self, match_id: MatchId, players: [UserId; 2]) {
        self.matches.remove(&match_id);
        for user in players {
            self.by_user.remove_if(&user, |_, m| *m == match_id);
        }
        debug!(match_id = %match_id, "match removed from registry");
    }

    pub(crate) fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    pub(crate) fn ledger(&self) -> &dyn Ledger {
        self.ledger.as_ref()
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }
}
