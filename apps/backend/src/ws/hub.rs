//! Connection registry for WebSocket sessions, and the `Transport`
//! implementation that routes match output to them.

use actix::prelude::*;
use dashmap::DashMap;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::snapshot::{MatchEnded, PrivateHand, PublicSnapshot};
use crate::domain::state::{MatchId, UserId};
use crate::services::transport::Transport;
use crate::ws::protocol::ServerMsg;

/// Pre-serialized frame pushed to a session.
#[derive(Message, Clone, Debug)]
#[rtype(result = "()")]
pub struct Outbound(pub String);

/// All open connections, grouped by user. A user may hold several tabs;
/// each receives the same frames.
#[derive(Default)]
pub struct WsRegistry {
    users: DashMap<UserId, DashMap<Uuid, Recipient<Outbound>>>,
}

impl WsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, user: UserId, conn_id: Uuid, recipient: Recipient<Outbound>) {
        self.users
            .entry(user)
            .or_default()
            .insert(conn_id, recipient);
    }

    /// Remove one connection. Returns true when it was the user's last.
    pub fn unregister(&self, user: UserId, conn_id: Uuid) -> bool {
        let mut last = false;
        if let Some(conns) = self.users.get(&user) {
            conns.remove(&conn_id);
            last = conns.is_empty();
        }
        if last {
            self.users.remove_if(&user, |_, conns| conns.is_empty());
        }
        last
    }

    pub fn is_connected(&self, user: UserId) -> bool {
        self.users.get(&user).is_some_and(|c| !c.is_empty())
    }

    pub fn connection_count(&self) -> usize {
        self.users.iter().map(|e| e.value().len()).sum()
    }

    pub fn send_to_user(&self, user: UserId, msg: &ServerMsg) {
        let payload = match serde_json::to_string(msg) {
            Ok(p) => p,
            Err(err) => {
                warn!(error = %err, "failed to serialize outbound message");
                return;
            }
        };
        self.send_raw(user, payload);
    }

    fn send_raw(&self, user: UserId, payload: String) {
        let Some(conns) = self.users.get(&user) else {
            debug!(user_id = user, "no open connection for user");
            return;
        };
        for recipient in conns.iter() {
            recipient.value().do_send(Outbound(payload.clone()));
        }
    }
}

impl Transport for WsRegistry {
    fn publish_public_state(&self, match_id: MatchId, snapshot: &PublicSnapshot) {
        let msg = ServerMsg::State {
            snapshot: snapshot.clone(),
        };
        let payload = match serde_json::to_string(&msg) {
            Ok(p) => p,
            Err(err) => {
                warn!(match_id = %match_id, error = %err, "failed to serialize snapshot");
                return;
            }
        };
        for player in &snapshot.players {
            self.send_raw(player.user_id, payload.clone());
        }
    }

    fn publish_private_hand(&self, user: UserId, hand: &PrivateHand) {
        self.send_to_user(user, &ServerMsg::Hand { hand: hand.clone() });
    }

    fn publish_ended(&self, players: [UserId; 2], ended: &MatchEnded) {
        let msg = ServerMsg::Ended {
            ended: ended.clone(),
        };
        for user in players {
            self.send_to_user(user, &msg);
        }
    }
}
