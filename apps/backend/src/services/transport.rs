//! Outbound delivery of match state to participants.

use parking_lot::Mutex;

use crate::domain::snapshot::{MatchEnded, PrivateHand, PublicSnapshot};
use crate::domain::state::{MatchId, UserId};

/// Delivery seam between match actors and connected clients.
///
/// Implementations must not block: match actors call these inline while
/// holding no other locks.
pub trait Transport: Send + Sync {
    /// Broadcast the public view to every participant listed in `snapshot`.
    fn publish_public_state(&self, match_id: MatchId, snapshot: &PublicSnapshot);
    /// Send `hand` to `user` only.
    fn publish_private_hand(&self, user: UserId, hand: &PrivateHand);
    /// Tell both participants the match is over.
    fn publish_ended(&self, players: [UserId; 2], ended: &MatchEnded);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Published {
    State(PublicSnapshot),
    Hand(UserId, PrivateHand),
    Ended([UserId; 2], MatchEnded),
}

/// Transport that keeps every published message, for tests and tooling.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    events: Mutex<Vec<Published>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Published> {
        self.events.lock().clone()
    }

    pub fn states(&self, match_id: MatchId) -> Vec<PublicSnapshot> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Published::State(s) if s.match_id == match_id => Some(s.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_state(&self, match_id: MatchId) -> Option<PublicSnapshot> {
        self.states(match_id).pop()
    }

    /// Most recent hand delivered to `user` for `match_id`.
    pub fn last_hand(&self, user: UserId, match_id: MatchId) -> Option<PrivateHand> {
        self.events.lock().iter().rev().find_map(|e| match e {
            Published::Hand(u, h) if *u == user && h.match_id == match_id => Some(h.clone()),
            _ => None,
        })
    }

    pub fn ended(&self, match_id: MatchId) -> Vec<MatchEnded> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Published::Ended(_, ended) if ended.match_id == match_id => Some(ended.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl Transport for RecordingTransport {
    fn publish_public_state(&self, _match_id: MatchId, snapshot: &PublicSnapshot) {
        self.events.lock().push(Published::State(snapshot.clone()));
    }

    fn publish_private_hand(&self, user: UserId, hand: &PrivateHand) {
        self.events.lock().push(Published::Hand(user, hand.clone()));
    }

    fn publish_ended(&self, players: [UserId; 2], ended: &MatchEnded) {
        self.events
            .lock()
            .push(Published::Ended(players, ended.clone()));
    }
}
