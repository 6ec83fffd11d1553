use time::Duration;

pub const PLAYERS: usize = 2;
pub const DECK_SIZE: usize = 36;
/// Cards dealt per player, and the refill target after each resolution.
pub const HAND_SIZE: usize = 6;
/// Cap on pairs in one trick, covered or not. Further bounded by the
/// defender's hand.
pub const MAX_TRICK_PAIRS: usize = 6;
/// Largest stake a match accepts; keeps the payout within `i64`.
pub const MAX_STAKE: i64 = i64::MAX / 2;
pub const DEFAULT_ACTION_WINDOW: Duration = Duration::seconds(60);

/// Winner receives their stake back plus 90% of the opponent's stake,
/// rounded down.
pub fn payout_for_stake(stake: i64) -> i64 {
    // floor(0.9 * stake) without forming stake * 9.
    stake + stake.div_euclid(10) * 9 + stake.rem_euclid(10) * 9 / 10
}

/// Maximum number of pairs the table may hold in the current trick.
pub fn trick_pair_limit(defender_hand: usize) -> usize {
    MAX_TRICK_PAIRS.min(defender_hand)
}
