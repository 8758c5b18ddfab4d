//! Wire protocol for the game WebSocket.
//!
//! Frames are JSON objects of the shape `{"type": ..., "data": {...}}`.
//! The coordinator never sees these types; the session adapter converts
//! inbound frames into [`GameCommand`]s and renders outbound [`GameEvent`]s
//! into per-viewer messages (e.g. `yourTurn` is computed against the
//! viewing participant).

use serde::{Deserialize, Serialize};

use crate::game::events::{GameCommand, GameEvent, UserId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ClientMsg {
    /// Submit a word for the current turn.
    SendAnswer { word: String },
    /// Accept the one-time continuation after a first failure.
    ConfirmRetry {},
    /// Free-form live text, relayed to the whole group.
    SendInput { value: String },
}

impl ClientMsg {
    pub fn into_command(self, user_id: UserId) -> GameCommand {
        match self {
            ClientMsg::SendAnswer { word } => GameCommand::SubmitWord { user_id, word },
            ClientMsg::ConfirmRetry {} => GameCommand::ConfirmContinuation { user_id },
            ClientMsg::SendInput { value } => GameCommand::Input { user_id, value },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ServerMsg {
    OnStart {},

    #[serde(rename_all = "camelCase")]
    OnTick {
        remain_sec: u32,
        turn_remain_sec: u32,
        finished: bool,
        waiting_continuation: bool,
        your_continuation: bool,
    },

    #[serde(rename_all = "camelCase")]
    OnChangeTurn { prev_answer: String, your_turn: bool },

    OnFailure {},

    #[serde(rename_all = "camelCase")]
    OnError { reason: String },

    #[serde(rename_all = "camelCase")]
    OnInput { value: String },
}

impl ServerMsg {
    /// Renders a coordinator event for one viewing participant.
    pub fn from_event(event: GameEvent, viewer: UserId) -> Self {
        match event {
            GameEvent::Start => ServerMsg::OnStart {},
            GameEvent::Tick {
                remaining_game_secs,
                remaining_turn_secs,
                awaiting_continuation,
                failing_user,
            } => ServerMsg::OnTick {
                remain_sec: remaining_game_secs,
                turn_remain_sec: remaining_turn_secs,
                finished: remaining_game_secs == 0,
                waiting_continuation: awaiting_continuation,
                your_continuation: failing_user == Some(viewer),
            },
            GameEvent::ChangeTurn {
                previous_word,
                next_user,
            } => ServerMsg::OnChangeTurn {
                prev_answer: previous_word,
                your_turn: next_user == viewer,
            },
            GameEvent::Failure => ServerMsg::OnFailure {},
            GameEvent::Error { reason } => ServerMsg::OnError { reason },
            GameEvent::Input { value } => ServerMsg::OnInput { value },
        }
    }
}
