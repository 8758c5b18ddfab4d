//! Group-to-session registry.
//!
//! A single owned map behind one lock, held only for lookup, insert, and
//! delete. All session mutation happens inside the session's own task; the
//! registry only resolves the target session and forwards commands onto its
//! inbound channel. Entries are created by the first join for a group and
//! deleted by the session task itself at teardown (arena-by-key).

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::config::game::GameConfig;
use crate::game::collaborators::{GroupRoster, StatsSink};
use crate::game::coordinator::GameSession;
use crate::game::events::{EventReceiver, GameCommand, GroupId, UserId};

pub(crate) type SessionMap = Mutex<HashMap<GroupId, SessionHandle>>;

/// Inbound side of one session; cloned out of the map so commands are sent
/// after the lock is released.
#[derive(Clone)]
pub(crate) struct SessionHandle {
    commands: mpsc::UnboundedSender<GameCommand>,
}

/// Everything a connection adapter needs after joining: its connection id,
/// its private event stream, and the session's command channel.
pub struct JoinedSession {
    pub conn_id: Uuid,
    pub events: EventReceiver,
    pub commands: mpsc::UnboundedSender<GameCommand>,
}

pub struct SessionRegistry {
    sessions: Arc<SessionMap>,
    roster: Arc<dyn GroupRoster>,
    stats: Arc<dyn StatsSink>,
    config: GameConfig,
}

impl SessionRegistry {
    pub fn new(
        roster: Arc<dyn GroupRoster>,
        stats: Arc<dyn StatsSink>,
        config: GameConfig,
    ) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            roster,
            stats,
            config,
        }
    }

    /// Joins `user_id` to the group's session, creating the session task if
    /// none exists. `start_deadline` is the wall-clock cutoff for the
    /// gathering phase, supplied by the caller.
    pub fn join(&self, group_id: GroupId, user_id: UserId, start_deadline: Instant) -> JoinedSession {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let conn_id = Uuid::new_v4();
        let join = GameCommand::Join {
            user_id,
            conn_id,
            events: events_tx,
        };

        let commands = self.session_sender(group_id, start_deadline);
        let commands = match commands.send(join) {
            Ok(()) => commands,
            Err(mpsc::error::SendError(join)) => {
                // The session terminated between lookup and send; resolve
                // a live replacement and retry once against it.
                debug!(group_id = %group_id, "stale session entry, respawning");
                let fresh = self.replace_stale(group_id, &commands, start_deadline);
                let _ = fresh.send(join);
                fresh
            }
        };

        JoinedSession {
            conn_id,
            events: events_rx,
            commands,
        }
    }

    /// Forwards a leave for the given connection; a no-op when the session
    /// is already gone.
    pub fn leave(&self, group_id: GroupId, user_id: UserId, conn_id: Uuid) {
        let handle = self.sessions.lock().get(&group_id).cloned();
        if let Some(handle) = handle {
            let _ = handle.commands.send(GameCommand::Leave { user_id, conn_id });
        }
    }

    /// Number of currently active sessions.
    pub fn active_sessions(&self) -> usize {
        self.sessions.lock().len()
    }

    fn session_sender(
        &self,
        group_id: GroupId,
        start_deadline: Instant,
    ) -> mpsc::UnboundedSender<GameCommand> {
        let mut sessions = self.sessions.lock();
        if let Some(handle) = sessions.get(&group_id) {
            return handle.commands.clone();
        }
        let tx = self.spawn_session(group_id, start_deadline);
        sessions.insert(
            group_id,
            SessionHandle {
                commands: tx.clone(),
            },
        );
        tx
    }

    /// Resolves a send failure against a session that died between lookup
    /// and send. Re-checked under the lock: a concurrent join may already
    /// have replaced the entry with a live task, and that entry must be
    /// reused, never clobbered with a second spawn for the same group.
    pub(crate) fn replace_stale(
        &self,
        group_id: GroupId,
        stale: &mpsc::UnboundedSender<GameCommand>,
        start_deadline: Instant,
    ) -> mpsc::UnboundedSender<GameCommand> {
        let mut sessions = self.sessions.lock();
        if let Some(handle) = sessions.get(&group_id) {
            if !handle.commands.same_channel(stale) {
                return handle.commands.clone();
            }
        }
        let tx = self.spawn_session(group_id, start_deadline);
        sessions.insert(
            group_id,
            SessionHandle {
                commands: tx.clone(),
            },
        );
        tx
    }

    fn spawn_session(
        &self,
        group_id: GroupId,
        start_deadline: Instant,
    ) -> mpsc::UnboundedSender<GameCommand> {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = GameSession::new(
            group_id,
            self.config.clone(),
            self.roster.clone(),
            self.stats.clone(),
            self.sessions.clone(),
            rx,
            start_deadline,
        );
        tokio::spawn(session.run());
        tx
    }
}
