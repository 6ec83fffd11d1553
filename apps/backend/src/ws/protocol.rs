use serde::{Deserialize, Serialize};

use crate::domain::actions::PlayerAction;
use crate::domain::snapshot::{MatchEnded, PrivateHand, PublicSnapshot};
use crate::domain::state::{MatchId, UserId};

pub const PROTOCOL_VERSION: i32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    Hello {
        protocol: i32,
    },
    /// Queue for a match at `stake`.
    Join {
        stake: i64,
    },
    Move {
        match_id: MatchId,
        #[serde(flatten)]
        action: PlayerAction,
    },
    /// Leave the queue or forfeit the current match.
    Leave,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    HelloAck {
        protocol: i32,
        user_id: UserId,
    },
    Waiting {
        stake: i64,
        position: usize,
    },
    State {
        #[serde(flatten)]
        snapshot: PublicSnapshot,
    },
    Hand {
        #[serde(flatten)]
        hand: PrivateHand,
    },
    Ended {
        #[serde(flatten)]
        ended: MatchEnded,
    },
    /// Malformed input or a refused lobby request. Illegal moves never
    /// produce this.
    Error {
        code: &'static str,
        message: String,
    },
}
