//! Inbound commands and outbound events for a game session.
//!
//! Both directions are closed, exhaustively-matched enums; the wire layer
//! (`crate::ws`) owns the JSON rendering, the coordinator never sees raw
//! frames.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Identifier of a group; one group has at most one active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u64);

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of a participant, assigned by the external user system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Sender half of one participant's outbound event channel. The coordinator
/// holds these in its fan-out set; it never owns the network connection.
pub type EventSender = mpsc::UnboundedSender<GameEvent>;

/// Receiver half handed to the connection adapter. A closed channel is the
/// disconnect signal for the reader.
pub type EventReceiver = mpsc::UnboundedReceiver<GameEvent>;

/// Commands flowing from connection adapters into the session task.
#[derive(Debug)]
pub enum GameCommand {
    Join {
        user_id: UserId,
        conn_id: Uuid,
        events: EventSender,
    },
    Leave {
        user_id: UserId,
        conn_id: Uuid,
    },
    SubmitWord {
        user_id: UserId,
        word: String,
    },
    ConfirmContinuation {
        user_id: UserId,
    },
    Input {
        user_id: UserId,
        value: String,
    },
}

/// Events pushed by the coordinator onto every participant's channel.
///
/// Events are participant-agnostic; fields like `next_user` let each
/// adapter render its own view (e.g. `yourTurn`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Start,
    Tick {
        remaining_game_secs: u32,
        remaining_turn_secs: u32,
        awaiting_continuation: bool,
        failing_user: Option<UserId>,
    },
    ChangeTurn {
        previous_word: String,
        next_user: UserId,
    },
    Failure,
    Error {
        reason: String,
    },
    Input {
        value: String,
    },
}
