//! Collaborator seams consumed by the coordinator.
//!
//! Group membership and long-term statistics live outside this core; the
//! coordinator only sees these traits. The in-process implementations below
//! are used for standalone wiring and tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use tracing::info;

use crate::errors::DomainError;
use crate::game::events::{GroupId, UserId};

/// Membership-completeness predicate: decides whether everyone expected in
/// the group has joined the gathering session.
#[async_trait]
pub trait GroupRoster: Send + Sync {
    async fn are_all_members_joined(
        &self,
        group_id: GroupId,
        joined: &[UserId],
    ) -> Result<bool, DomainError>;
}

/// Long-term statistics boundary: outcome recording and cache invalidation.
/// Failures here never abort a session teardown; they are logged instead.
#[async_trait]
pub trait StatsSink: Send + Sync {
    async fn record_outcome(&self, user_id: UserId, succeeded: bool) -> Result<(), DomainError>;
    async fn invalidate_cache(&self, user_id: UserId);
}

/// Roster that considers the group complete once a fixed number of distinct
/// participants has joined. Standalone deployments configure the size via
/// `GAME_GROUP_SIZE`; the real membership store sits behind the same trait.
pub struct GroupSizeRoster {
    expected: usize,
}

impl GroupSizeRoster {
    pub fn new(expected: usize) -> Self {
        Self { expected }
    }
}

#[async_trait]
impl GroupRoster for GroupSizeRoster {
    async fn are_all_members_joined(
        &self,
        _group_id: GroupId,
        joined: &[UserId],
    ) -> Result<bool, DomainError> {
        Ok(joined.len() >= self.expected)
    }
}

/// Outcome sink that keeps results in memory and logs them. Stands in for
/// the persistent statistics store, which is out of scope here.
#[derive(Default)]
pub struct InMemoryStats {
    outcomes: Mutex<Vec<(UserId, bool)>>,
    invalidated: Mutex<HashSet<UserId>>,
}

impl InMemoryStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcomes(&self) -> Vec<(UserId, bool)> {
        self.outcomes.lock().clone()
    }

    pub fn invalidated(&self) -> HashSet<UserId> {
        self.invalidated.lock().clone()
    }
}

#[async_trait]
impl StatsSink for InMemoryStats {
    async fn record_outcome(&self, user_id: UserId, succeeded: bool) -> Result<(), DomainError> {
        info!(user_id = %user_id, succeeded, "recording game outcome");
        self.outcomes.lock().push((user_id, succeeded));
        Ok(())
    }

    async fn invalidate_cache(&self, user_id: UserId) {
        self.invalidated.lock().insert(user_id);
    }
}
