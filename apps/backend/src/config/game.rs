//! Game timing configuration.
//!
//! All knobs have production defaults and can be overridden through the
//! environment, mainly to shorten clocks in manual testing.

use std::env;
use std::time::Duration;

use crate::error::AppError;

/// The fixed word every chain starts from.
pub const DEFAULT_STARTING_WORD: &str = "おはよう";

#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Session-wide time budget once the game starts.
    pub session_secs: u32,
    /// Per-turn time budget.
    pub turn_secs: u32,
    /// Length of the one-time continuation window.
    pub continuation_secs: u32,
    /// Seconds added to the turn budget when a continuation is confirmed.
    pub continuation_bonus_secs: u32,
    /// How long a group may gather before the session fails.
    pub gathering_secs: u64,
    /// Expected group size for the standalone roster.
    pub group_size: usize,
    /// Seed word for the chain.
    pub starting_word: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            session_secs: 300,
            turn_secs: 20,
            continuation_secs: 30,
            continuation_bonus_secs: 10,
            gathering_secs: 300,
            group_size: 2,
            starting_word: DEFAULT_STARTING_WORD.to_string(),
        }
    }
}

impl GameConfig {
    /// Builds the configuration from the environment, falling back to the
    /// defaults above for unset variables.
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();
        Ok(Self {
            session_secs: parsed_var("GAME_SESSION_SECS", defaults.session_secs)?,
            turn_secs: parsed_var("GAME_TURN_SECS", defaults.turn_secs)?,
            continuation_secs: parsed_var("GAME_CONTINUATION_SECS", defaults.continuation_secs)?,
            continuation_bonus_secs: parsed_var(
                "GAME_CONTINUATION_BONUS_SECS",
                defaults.continuation_bonus_secs,
            )?,
            gathering_secs: parsed_var("GAME_GATHERING_SECS", defaults.gathering_secs)?,
            group_size: parsed_var("GAME_GROUP_SIZE", defaults.group_size)?,
            starting_word: env::var("GAME_STARTING_WORD").unwrap_or(defaults.starting_word),
        })
    }

    /// The gathering window as a duration, for computing start deadlines.
    pub fn gathering_window(&self) -> Duration {
        Duration::from_secs(self.gathering_secs)
    }
}

fn parsed_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::config(format!("{name} must be a number, got '{raw}'"))),
        Err(_) => Ok(default),
    }
}
