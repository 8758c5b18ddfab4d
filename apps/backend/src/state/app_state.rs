use std::sync::Arc;

use crate::config::game::GameConfig;
use crate::game::collaborators::{GroupRoster, GroupSizeRoster, InMemoryStats, StatsSink};
use crate::game::registry::SessionRegistry;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Group-to-session registry; the only entry point into game sessions.
    pub registry: Arc<SessionRegistry>,
    /// Game timing configuration.
    pub config: GameConfig,
}

impl AppState {
    /// Create an AppState with the in-process reference collaborators.
    pub fn new(config: GameConfig) -> Self {
        let roster = Arc::new(GroupSizeRoster::new(config.group_size));
        let stats = Arc::new(InMemoryStats::new());
        Self::with_collaborators(config, roster, stats)
    }

    /// Create an AppState with explicit collaborator implementations.
    pub fn with_collaborators(
        config: GameConfig,
        roster: Arc<dyn GroupRoster>,
        stats: Arc<dyn StatsSink>,
    ) -> Self {
        let registry = Arc::new(SessionRegistry::new(roster, stats, config.clone()));
        Self { registry, config }
    }

    /// Create a test AppState with default configuration.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self::new(GameConfig::default())
    }
}
