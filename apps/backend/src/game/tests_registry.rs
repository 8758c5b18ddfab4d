#![cfg(test)]

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::config::game::GameConfig;
use crate::game::collaborators::{GroupSizeRoster, InMemoryStats};
use crate::game::events::{GroupId, UserId};
use crate::game::registry::SessionRegistry;

fn registry() -> SessionRegistry {
    let config = GameConfig::default();
    SessionRegistry::new(
        Arc::new(GroupSizeRoster::new(config.group_size)),
        Arc::new(InMemoryStats::new()),
        config,
    )
}

fn deadline() -> Instant {
    Instant::now() + GameConfig::default().gathering_window()
}

#[tokio::test(start_paused = true)]
async fn joins_for_one_group_share_a_single_session() {
    let registry = registry();
    let a = registry.join(GroupId(1), UserId(1), deadline());
    let b = registry.join(GroupId(1), UserId(2), deadline());

    assert_eq!(registry.active_sessions(), 1);
    assert_ne!(a.conn_id, b.conn_id);
}

#[tokio::test(start_paused = true)]
async fn distinct_groups_get_distinct_sessions() {
    let registry = registry();
    let _a = registry.join(GroupId(1), UserId(1), deadline());
    let _b = registry.join(GroupId(2), UserId(1), deadline());

    assert_eq!(registry.active_sessions(), 2);
}

#[tokio::test(start_paused = true)]
async fn leave_for_an_unknown_group_is_a_noop() {
    let registry = registry();
    registry.leave(GroupId(99), UserId(1), uuid::Uuid::new_v4());

    assert_eq!(registry.active_sessions(), 0);
}

#[tokio::test(start_paused = true)]
async fn terminated_sessions_disappear_from_the_registry() {
    let registry = registry();
    let mut joined = registry.join(GroupId(1), UserId(1), deadline());
    assert_eq!(registry.active_sessions(), 1);

    registry.leave(GroupId(1), UserId(1), joined.conn_id);
    assert!(joined.events.recv().await.is_none());
    assert_eq!(registry.active_sessions(), 0);

    // A fresh join for the same group starts a brand-new session.
    let _again = registry.join(GroupId(1), UserId(1), deadline());
    assert_eq!(registry.active_sessions(), 1);
}

#[tokio::test(start_paused = true)]
async fn stale_retry_reuses_a_concurrently_respawned_session() {
    let registry = registry();
    let live = registry.join(GroupId(1), UserId(1), deadline());

    // A join that looked up the previous, now-dead task must not clobber
    // the live entry another join has already installed.
    let (dead_tx, _dead_rx) = mpsc::unbounded_channel();
    let resolved = registry.replace_stale(GroupId(1), &dead_tx, deadline());

    assert!(resolved.same_channel(&live.commands));
    assert_eq!(registry.active_sessions(), 1);
}

#[tokio::test(start_paused = true)]
async fn stale_retry_spawns_when_no_live_entry_remains() {
    let registry = registry();
    let (dead_tx, _dead_rx) = mpsc::unbounded_channel();

    let resolved = registry.replace_stale(GroupId(1), &dead_tx, deadline());

    assert!(!resolved.same_channel(&dead_tx));
    assert_eq!(registry.active_sessions(), 1);
}
