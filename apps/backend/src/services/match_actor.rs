//! One task per live match. The task owns the `MatchState` outright and
//! processes commands strictly in arrival order, so transitions on a match
//! never interleave and matches never wait on each other.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::domain::actions::PlayerAction;
use crate::domain::snapshot::{private_hands, public_snapshot, MatchEnded, PublicSnapshot};
use crate::domain::state::{EndReason, MatchOutcome, MatchState, UserId};
use crate::domain::turn_engine::{self, ActionOutcome};
use crate::services::match_registry::MatchRegistry;
use crate::services::settlement::settle;

pub enum MatchCommand {
    Act {
        user: UserId,
        action: PlayerAction,
        reply: Option<oneshot::Sender<ActionOutcome>>,
    },
    Forfeit {
        user: UserId,
        reason: EndReason,
        reply: Option<oneshot::Sender<Option<MatchOutcome>>>,
    },
    /// Resolve the match if its deadline passed with no action.
    Expire,
    Snapshot {
        reply: oneshot::Sender<PublicSnapshot>,
    },
}

impl std::fmt::Debug for MatchCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchCommand::Act { user, action, .. } => {
                write!(f, "Act({user}, {})", action.kind())
            }
            MatchCommand::Forfeit { user, reason, .. } => write!(f, "Forfeit({user}, {reason:?})"),
            MatchCommand::Expire => f.write_str("Expire"),
            MatchCommand::Snapshot { .. } => f.write_str("Snapshot"),
        }
    }
}

pub(crate) struct MatchActor {
    state: MatchState,
    mailbox: mpsc::UnboundedReceiver<MatchCommand>,
    registry: Arc<MatchRegistry>,
}

impl MatchActor {
    pub(crate) fn new(
        state: MatchState,
        mailbox: mpsc::UnboundedReceiver<MatchCommand>,
        registry: Arc<MatchRegistry>,
    ) -> Self {
        Self {
            state,
            mailbox,
            registry,
        }
    }

    pub(crate) async fn run(mut self) {
        self.publish();
        while let Some(command) = self.mailbox.recv().await {
            self.handle(command);
            if self.state.finished {
                break;
            }
        }
        debug!(match_id = %self.state.id, "match actor stopped");
    }

    fn handle(&mut self, command: MatchCommand) {
        let now = self.registry.now();
        match command {
            MatchCommand::Act {
                user,
                action,
                reply,
            } => {
                let outcome = turn_engine::handle_action(&mut self.state, user, action, now);
                if let ActionOutcome::Forfeited(_) = outcome {
                    info!(match_id = %self.state.id, user_id = user, "late action forfeits sender");
                }
                if outcome.changed_state() {
                    self.publish();
                }
                if let Some(ended) = outcome.ended() {
                    self.conclude(ended);
                }
                if let Some(reply) = reply {
                    let _ = reply.send(outcome);
                }
            }
            MatchCommand::Forfeit {
                user,
                reason,
                reply,
            } => {
                let ended = turn_engine::forfeit(&mut self.state, user, reason);
                if let Some(outcome) = ended {
                    info!(match_id = %self.state.id, user_id = user, reason = ?reason, "participant forfeited");
                    self.conclude(outcome);
                }
                if let Some(reply) = reply {
                    let _ = reply.send(ended);
                }
            }
            MatchCommand::Expire => {
                if let Some(outcome) = turn_engine::expire_if_due(&mut self.state, now) {
                    info!(match_id = %self.state.id, loser = outcome.loser, "deadline elapsed");
                    self.publish();
                    self.conclude(outcome);
                }
            }
            MatchCommand::Snapshot { reply } => {
                let _ = reply.send(public_snapshot(&self.state));
            }
        }
    }

    fn publish(&self) {
        let transport = self.registry.transport();
        transport.publish_public_state(self.state.id, &public_snapshot(&self.state));
        for (user, hand) in private_hands(&self.state) {
            transport.publish_private_hand(user, &hand);
        }
    }

    /// Settle, notify and leave active storage. Runs once per match: the
    /// turn engine only yields an outcome on the first terminal transition.
    fn conclude(&self, outcome: MatchOutcome) {
        let id = self.state.id;
        settle(self.registry.ledger(), id, &outcome, self.registry.now());
        self.registry.transport().publish_ended(
            self.state.players,
            &MatchEnded {
                match_id: id,
                outcome,
            },
        );
        self.registry.teardown(id, self.state.players);
    }
}
