//! Applies a finished match's outcome to the ledger, at most once.

use time::OffsetDateTime;
use tracing::{info, warn};

use crate::domain::state::{MatchId, MatchOutcome};
use crate::services::ledger::{Ledger, SettlementRecord};

/// Credit the winner for `outcome`. Returns whether the ledger applied it;
/// a repeated call for the same match leaves balances untouched.
pub fn settle(
    ledger: &dyn Ledger,
    match_id: MatchId,
    outcome: &MatchOutcome,
    at: OffsetDateTime,
) -> bool {
    let record = SettlementRecord {
        match_id,
        winner: outcome.winner,
        loser: outcome.loser,
        stake: outcome.stake,
        amount: outcome.payout,
        reason: outcome.reason,
        at,
    };

    if !ledger.record_settlement(&record) {
        warn!(match_id = %match_id, "settlement already recorded, skipping credit");
        return false;
    }

    ledger.credit(outcome.winner, outcome.payout);
    ledger.record_win(outcome.winner);
    info!(
        match_id = %match_id,
        winner = outcome.winner,
        loser = outcome.loser,
        payout = outcome.payout,
        reason = ?outcome.reason,
        "match settled"
    );
    true
}
