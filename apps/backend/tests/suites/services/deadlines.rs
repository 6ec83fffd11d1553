// Deadline enforcement: late actions, the registry sweep and the
// background sweeper task.

use std::time::Duration as StdDuration;

use durak_backend::domain::{ActionOutcome, EndReason, PlayerAction};
use durak_backend::services::deadline::spawn_deadline_sweeper;
use time::Duration;
use tokio_util::sync::CancellationToken;

use crate::common::{eventually, within};
use crate::support::match_harness::{Harness, ACTION_WINDOW, STARTING_BALANCE};

const WAIT: StdDuration = StdDuration::from_secs(5);

#[tokio::test]
async fn late_action_forfeits_the_sender() {
    let h = Harness::new();
    let (id, _) = h.start(10, 21);
    let snap = within(WAIT, h.registry.snapshot(id)).await.expect("snapshot");
    let card = h.transport.last_hand(snap.attacker, id).expect("hand").cards[0];

    h.clock.advance(ACTION_WINDOW + Duration::seconds(1));
    let out = h
        .registry
        .act(id, snap.attacker, PlayerAction::Attack { card })
        .await;

    let ActionOutcome::Forfeited(outcome) = out else {
        panic!("expected forfeit, got {out:?}");
    };
    assert_eq!(outcome.loser, snap.attacker);
    assert_eq!(outcome.winner, snap.defender);
    assert_eq!(outcome.reason, EndReason::Timeout);
    assert_eq!(outcome.payout, 19);
    assert_eq!(h.balance(snap.defender), STARTING_BALANCE + 19);
    assert!(!h.registry.is_active(id));
}

#[tokio::test]
async fn action_exactly_at_deadline_is_on_time() {
    let h = Harness::new();
    let (id, _) = h.start(10, 22);
    let snap = within(WAIT, h.registry.snapshot(id)).await.expect("snapshot");
    let card = h.transport.last_hand(snap.attacker, id).expect("hand").cards[0];

    h.clock.advance(ACTION_WINDOW);
    let out = h
        .registry
        .act(id, snap.attacker, PlayerAction::Attack { card })
        .await;
    assert!(matches!(out, ActionOutcome::Applied { ended: None, .. }));

    // An accepted action restarts the window from the current instant.
    let snap = h.registry.snapshot(id).await.expect("snapshot");
    h.clock.advance(ACTION_WINDOW);
    assert_eq!(
        h.registry.act(id, snap.defender, PlayerAction::Take).await,
        ActionOutcome::Applied {
            resolution: Some(durak_backend::domain::turn_engine::Resolution::Took { cards: 1 }),
            ended: None,
        }
    );
}

#[tokio::test]
async fn sweep_leaves_fresh_matches_alone() {
    let h = Harness::new();
    let (id, _) = h.start(10, 23);

    h.clock.advance(ACTION_WINDOW - Duration::seconds(1));
    assert_eq!(h.registry.sweep(), 1);

    let snap = within(WAIT, h.registry.snapshot(id)).await.expect("still active");
    assert_eq!(snap.match_id, id);
    assert!(h.ledger.history().is_empty());
}

#[tokio::test]
async fn sweep_blames_attacker_on_empty_table() {
    let h = Harness::new();
    let stake = 30;
    let (id, _) = h.start(stake, 24);
    let snap = within(WAIT, h.registry.snapshot(id)).await.expect("snapshot");

    h.clock.advance(ACTION_WINDOW + Duration::seconds(1));
    h.registry.sweep();

    assert!(eventually(WAIT, || !h.registry.is_active(id)).await);
    let ended = h.transport.ended(id);
    assert_eq!(ended.len(), 1);
    assert_eq!(ended[0].outcome.loser, snap.attacker);
    assert_eq!(ended[0].outcome.reason, EndReason::Timeout);
    assert_eq!(h.balance(snap.defender), Harness::credited(stake));
}

#[tokio::test]
async fn sweep_blames_defender_facing_open_attack() {
    let h = Harness::new();
    let (id, _) = h.start(10, 25);
    let snap = within(WAIT, h.registry.snapshot(id)).await.expect("snapshot");
    let card = h.transport.last_hand(snap.attacker, id).expect("hand").cards[0];
    h.registry
        .act(id, snap.attacker, PlayerAction::Attack { card })
        .await;

    h.clock.advance(ACTION_WINDOW + Duration::seconds(1));
    h.registry.sweep();

    assert!(eventually(WAIT, || !h.registry.is_active(id)).await);
    let ended = h.transport.ended(id);
    assert_eq!(ended[0].outcome.loser, snap.defender);
    assert_eq!(ended[0].outcome.winner, snap.attacker);
}

#[tokio::test]
async fn background_sweeper_expires_stalled_matches_and_stops_on_cancel() {
    let h = Harness::new();
    let (stalled, _) = h.start(10, 26);
    let (other, _) = h.start(10, 27);

    let cancel = CancellationToken::new();
    let task = spawn_deadline_sweeper(
        h.registry.clone(),
        StdDuration::from_millis(10),
        cancel.clone(),
    );

    h.clock.advance(ACTION_WINDOW + Duration::seconds(1));
    assert!(eventually(WAIT, || h.registry.active_count() == 0).await);
    assert_eq!(h.transport.ended(stalled).len(), 1);
    assert_eq!(h.transport.ended(other).len(), 1);
    assert_eq!(h.ledger.history().len(), 2);

    cancel.cancel();
    within(WAIT, task).await.expect("sweeper exits cleanly");
}
