//! Turn engine: validated transitions over a `MatchState`.
//!
//! Every entry point validates before it mutates. A rejected action leaves
//! the state untouched and is reported as [`ActionOutcome::Rejected`]
//! without a reason; callers must not broadcast anything for it.

use time::OffsetDateTime;
use tracing::debug;

use crate::domain::actions::PlayerAction;
use crate::domain::cards_logic::card_beats;
use crate::domain::rules::{trick_pair_limit, HAND_SIZE};
use crate::domain::state::{other_seat, EndReason, MatchOutcome, MatchState, Seat, UserId};
use crate::domain::Card;

/// Result of validating an action against the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected,
}

impl Verdict {
    fn from_bool(ok: bool) -> Self {
        if ok {
            Verdict::Accepted
        } else {
            Verdict::Rejected
        }
    }
}

/// How a trick was closed, if the action closed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Defender took `cards` into hand; roles unchanged.
    Took { cards: usize },
    /// `pairs` fully covered pairs were discarded; roles swapped.
    Discarded { pairs: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Match already finished or the sender is not seated. Nothing happens.
    Ignored,
    /// Illegal action. State unchanged, nothing to publish.
    Rejected,
    /// The action was applied. `ended` is set when it produced a natural end.
    Applied {
        resolution: Option<Resolution>,
        ended: Option<MatchOutcome>,
    },
    /// The action arrived after the deadline; the sender lost.
    Forfeited(MatchOutcome),
}

impl ActionOutcome {
    pub fn changed_state(&self) -> bool {
        matches!(self, ActionOutcome::Applied { .. } | ActionOutcome::Forfeited(_))
    }

    pub fn ended(&self) -> Option<MatchOutcome> {
        match self {
            ActionOutcome::Applied { ended, .. } => *ended,
            ActionOutcome::Forfeited(outcome) => Some(*outcome),
            _ => None,
        }
    }
}

pub fn validate_attack(state: &MatchState, seat: Seat, card: Card) -> Verdict {
    let defender_hand = state.hand(state.defender()).len();
    Verdict::from_bool(
        seat == state.attacker
            && state.hand(seat).contains(card)
            && state.table.len() < trick_pair_limit(defender_hand)
            && state.table.rank_allowed(card),
    )
}

pub fn validate_defend(state: &MatchState, seat: Seat, pair: usize, card: Card) -> Verdict {
    if seat != state.defender() || !state.hand(seat).contains(card) {
        return Verdict::Rejected;
    }
    let Some(target) = state.table.open_pair(pair) else {
        return Verdict::Rejected;
    };
    Verdict::from_bool(card_beats(card, target.attack, state.trump))
}

pub fn validate_take(state: &MatchState, seat: Seat) -> Verdict {
    Verdict::from_bool(seat == state.defender() && state.table.has_open())
}

pub fn validate_bito(state: &MatchState, seat: Seat) -> Verdict {
    Verdict::from_bool(
        seat == state.attacker && !state.table.is_empty() && !state.table.has_open(),
    )
}

/// All actions `seat` could legally submit right now, in a stable order.
pub fn legal_actions(state: &MatchState, seat: Seat) -> Vec<PlayerAction> {
    let mut out = Vec::new();
    if state.finished {
        return out;
    }
    for &card in state.hand(seat).cards() {
        if validate_attack(state, seat, card) == Verdict::Accepted {
            out.push(PlayerAction::Attack { card });
        }
        for pair in 0..state.table.pairs().len() {
            if validate_defend(state, seat, pair, card) == Verdict::Accepted {
                out.push(PlayerAction::Defend {
                    pair: Some(pair),
                    card,
                });
            }
        }
    }
    if validate_take(state, seat) == Verdict::Accepted {
        out.push(PlayerAction::Take);
    }
    if validate_bito(state, seat) == Verdict::Accepted {
        out.push(PlayerAction::Bito);
    }
    out
}

/// Top both hands up to six, current attacker first, while the deck lasts.
pub fn refill(state: &mut MatchState) {
    for seat in [state.attacker, state.defender()] {
        while state.hand(seat).len() < HAND_SIZE {
            let Some(card) = state.deck.draw() else {
                return;
            };
            state.hand_mut(seat).add(card);
        }
    }
}

fn apply_attack(state: &mut MatchState, seat: Seat, card: Card) {
    state.hand_mut(seat).remove(card);
    state.table.push_attack(card);
}

fn apply_defend(state: &mut MatchState, seat: Seat, pair: usize, card: Card) {
    state.hand_mut(seat).remove(card);
    state.table.cover(pair, card);
}

fn apply_take(state: &mut MatchState) -> Resolution {
    let defender = state.defender();
    let cards = state.table.drain_cards();
    let taken = cards.len();
    state.hand_mut(defender).extend(cards);
    refill(state);
    Resolution::Took { cards: taken }
}

fn apply_bito(state: &mut MatchState) -> Resolution {
    let pairs = state.table.pairs().len();
    let cards = state.table.drain_cards();
    state.discarded += cards.len();
    refill(state);
    state.attacker = state.defender();
    Resolution::Discarded { pairs }
}

/// Natural end check: deck empty and a hand empty. The attacker's hand is
/// examined first, so simultaneous emptiness favours the attacker.
/// Returns `None` if the match continues or had already finished.
pub fn check_terminal(state: &mut MatchState) -> Option<MatchOutcome> {
    if state.finished || !state.deck.is_empty() {
        return None;
    }
    let attacker = state.attacker;
    let defender = state.defender();
    if state.hand(attacker).is_empty() {
        return state.finish(attacker, EndReason::Natural);
    }
    if state.hand(defender).is_empty() {
        return state.finish(defender, EndReason::Natural);
    }
    None
}

/// The participant `user` abandons the match; the other seat wins.
pub fn forfeit(state: &mut MatchState, user: UserId, reason: EndReason) -> Option<MatchOutcome> {
    let seat = state.seat_of(user)?;
    state.finish(other_seat(seat), reason)
}

/// Seat whose move the match is waiting for: the defender while any
/// attack is open, otherwise the attacker.
pub fn awaiting_seat(state: &MatchState) -> Seat {
    if state.table.has_open() {
        state.defender()
    } else {
        state.attacker
    }
}

/// Time-driven expiry: if the deadline passed with no action, the seat the
/// match was waiting on loses.
pub fn expire_if_due(state: &mut MatchState, now: OffsetDateTime) -> Option<MatchOutcome> {
    if state.finished || !state.deadline_elapsed(now) {
        return None;
    }
    let stalled = awaiting_seat(state);
    state.finish(other_seat(stalled), EndReason::Timeout)
}

/// Apply an inbound action from `actor` at time `now`.
pub fn handle_action(
    state: &mut MatchState,
    actor: UserId,
    action: PlayerAction,
    now: OffsetDateTime,
) -> ActionOutcome {
    if state.finished {
        return ActionOutcome::Ignored;
    }
    let Some(seat) = state.seat_of(actor) else {
        return ActionOutcome::Ignored;
    };

    // A late action is a forfeit by its sender, whoever's turn it was.
    if state.deadline_elapsed(now) {
        return match forfeit(state, actor, EndReason::Timeout) {
            Some(outcome) => ActionOutcome::Forfeited(outcome),
            None => ActionOutcome::Ignored,
        };
    }

    let resolution = match action {
        PlayerAction::Attack { card } => {
            if validate_attack(state, seat, card) == Verdict::Rejected {
                return reject(state, actor, action);
            }
            apply_attack(state, seat, card);
            None
        }
        PlayerAction::Defend { pair, card } => {
            let Some(pair) = pair.or_else(|| state.table.first_open()) else {
                return reject(state, actor, action);
            };
            if validate_defend(state, seat, pair, card) == Verdict::Rejected {
                return reject(state, actor, action);
            }
            apply_defend(state, seat, pair, card);
            None
        }
        PlayerAction::Take => {
            if validate_take(state, seat) == Verdict::Rejected {
                return reject(state, actor, action);
            }
            Some(apply_take(state))
        }
        PlayerAction::Bito => {
            if validate_bito(state, seat) == Verdict::Rejected {
                return reject(state, actor, action);
            }
            Some(apply_bito(state))
        }
    };

    state.reset_deadline(now);
    debug_assert!(state.is_conserved(), "card conservation violated");

    let ended = check_terminal(state);
    ActionOutcome::Applied { resolution, ended }
}

fn reject(state: &MatchState, actor: UserId, action: PlayerAction) -> ActionOutcome {
    debug!(match_id = %state.id, user_id = actor, action = action.kind(), "action rejected");
    ActionOutcome::Rejected
}
