//! Domain layer: pure match logic, no I/O and no clocks.

pub mod actions;
pub mod cards_logic;
pub mod cards_parsing;
pub mod cards_serde;
pub mod cards_types;
pub mod dealing;
pub mod deck;
pub mod hand;
pub mod rules;
pub mod snapshot;
pub mod state;
pub mod table;
pub mod turn_engine;

#[cfg(test)]
mod test_gens;
#[cfg(test)]
mod test_prelude;
#[cfg(test)]
mod tests_turn_engine;

// Re-exports for ergonomics
pub use actions::PlayerAction;
pub use cards_logic::{card_beats, lowest_trump};
pub use cards_parsing::try_parse_cards;
pub use cards_types::{Card, Rank, Suit};
pub use dealing::{deal_hands, new_match, MatchSetup};
pub use state::{EndReason, MatchId, MatchOutcome, MatchState, Seat, UserId};
pub use turn_engine::{handle_action, ActionOutcome, Verdict};
