//! Player actions as a closed, tagged union decoded at the boundary.

use serde::{Deserialize, Serialize};

use crate::domain::Card;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlayerAction {
    /// Place a new attack card (also accepted as `throw`).
    #[serde(alias = "throw")]
    Attack { card: Card },
    /// Cover an open pair. Without `pair`, the first open pair is targeted.
    Defend {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pair: Option<usize>,
        card: Card,
    },
    /// Defender picks up every card on the table.
    Take,
    /// Attacker discards a fully covered table.
    Bito,
}

impl PlayerAction {
    pub fn kind(&self) -> &'static str {
        match self {
            PlayerAction::Attack { .. } => "attack",
            PlayerAction::Defend { .. } => "defend",
            PlayerAction::Take => "take",
            PlayerAction::Bito => "bito",
        }
    }
}
