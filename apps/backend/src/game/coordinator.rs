//! Per-session game coordinator.
//!
//! Each active group runs exactly one coordinator task. The task owns all
//! session state and is its sole mutator, so the loop needs no locking: it
//! suspends on a multiplexed wait over the one-second tick timer, the
//! inbound command channel, and the start-deadline timer. Outbound delivery
//! goes through per-participant unbounded channels, so a slow or dead
//! consumer can never stall the loop or the other participants.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::game::GameConfig;
use crate::domain;
use crate::errors::DomainError;
use crate::game::collaborators::{GroupRoster, StatsSink};
use crate::game::events::{EventSender, GameCommand, GameEvent, GroupId, UserId};
use crate::game::registry::SessionMap;

/// One participant's delivery channel. Non-owning: dropping it closes the
/// event stream, which is the disconnect signal for the reader.
struct OutboundChannel {
    conn_id: Uuid,
    user_id: UserId,
    tx: EventSender,
}

enum Phase {
    Gathering,
    Playing,
    AwaitingContinuation { countdown: u32 },
}

/// How the session ended; decides whether outcomes are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ending {
    /// Session clock exhausted while running; outcomes are recorded.
    Completed,
    /// Start deadline missed or a collaborator failed; nothing recorded.
    Failed,
    /// Everyone left before the game started; nothing recorded.
    Abandoned,
}

pub(crate) struct GameSession {
    group_id: GroupId,
    config: GameConfig,
    roster: Arc<dyn GroupRoster>,
    stats: Arc<dyn StatsSink>,
    sessions: Arc<SessionMap>,
    commands: mpsc::UnboundedReceiver<GameCommand>,
    start_deadline: Instant,

    phase: Phase,
    /// Turn order = join order, frozen once the game starts.
    players: Vec<UserId>,
    /// Monotonically increasing per-participant failure counters.
    failures: HashMap<UserId, u32>,
    outputs: Vec<OutboundChannel>,
    turn_index: usize,
    current_word: String,
    remaining_game_secs: u32,
    remaining_turn_secs: u32,
    last_tick: Option<GameEvent>,
    last_change_turn: Option<GameEvent>,
}

impl GameSession {
    pub(crate) fn new(
        group_id: GroupId,
        config: GameConfig,
        roster: Arc<dyn GroupRoster>,
        stats: Arc<dyn StatsSink>,
        sessions: Arc<SessionMap>,
        commands: mpsc::UnboundedReceiver<GameCommand>,
        start_deadline: Instant,
    ) -> Self {
        let current_word = config.starting_word.clone();
        Self {
            group_id,
            config,
            roster,
            stats,
            sessions,
            commands,
            start_deadline,
            phase: Phase::Gathering,
            players: Vec::new(),
            failures: HashMap::new(),
            outputs: Vec::new(),
            turn_index: 0,
            current_word,
            remaining_game_secs: 0,
            remaining_turn_secs: 0,
            last_tick: None,
            last_change_turn: None,
        }
    }

    pub(crate) async fn run(mut self) {
        info!(group_id = %self.group_id, "game session created");
        let ending = self.event_loop().await;
        self.teardown(ending).await;
    }

    async fn event_loop(&mut self) -> Ending {
        let mut ticker = interval(Duration::from_secs(1));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let deadline = tokio::time::sleep_until(self.start_deadline);
        tokio::pin!(deadline);

        loop {
            let started = !matches!(self.phase, Phase::Gathering);
            tokio::select! {
                () = &mut deadline, if !started => {
                    info!(group_id = %self.group_id, "start deadline passed before the group was complete");
                    self.broadcast(GameEvent::Failure);
                    return Ending::Failed;
                }

                _ = ticker.tick(), if started => {
                    if let Some(ending) = self.on_tick() {
                        return ending;
                    }
                }

                cmd = self.commands.recv() => {
                    let Some(cmd) = cmd else {
                        // Inbound sender gone without a proper teardown.
                        return Ending::Abandoned;
                    };
                    let was_gathering = !started;
                    match self.on_command(cmd).await {
                        Ok(Some(ending)) => return ending,
                        Ok(None) => {}
                        Err(err) => {
                            error!(
                                group_id = %self.group_id,
                                error = %err,
                                "collaborator failure, terminating session"
                            );
                            self.broadcast(GameEvent::Error {
                                reason: "internal server error".to_string(),
                            });
                            return Ending::Failed;
                        }
                    }
                    if was_gathering && !matches!(self.phase, Phase::Gathering) {
                        // The game just started; the first real tick is one
                        // second from now.
                        ticker.reset();
                    }
                }
            }
        }
    }

    async fn on_command(&mut self, cmd: GameCommand) -> Result<Option<Ending>, DomainError> {
        match cmd {
            GameCommand::Join {
                user_id,
                conn_id,
                events,
            } => self.on_join(user_id, conn_id, events).await.map(|()| None),
            GameCommand::Leave { user_id, conn_id } => Ok(self.on_leave(user_id, conn_id)),
            GameCommand::SubmitWord { user_id, word } => {
                self.on_submit(user_id, &word);
                Ok(None)
            }
            GameCommand::ConfirmContinuation { user_id } => {
                self.on_confirm(user_id);
                Ok(None)
            }
            GameCommand::Input { user_id, value } => {
                self.on_input(user_id, value);
                Ok(None)
            }
        }
    }

    async fn on_join(
        &mut self,
        user_id: UserId,
        conn_id: Uuid,
        events: EventSender,
    ) -> Result<(), DomainError> {
        // Re-registering the same connection replaces its channel instead of
        // duplicating the delivery.
        if let Some(existing) = self.outputs.iter_mut().find(|o| o.conn_id == conn_id) {
            existing.tx = events;
        } else {
            self.outputs.push(OutboundChannel {
                conn_id,
                user_id,
                tx: events,
            });
        }

        if !matches!(self.phase, Phase::Gathering) {
            // Late joiner: never added to the frozen turn order; replay the
            // latest snapshots so its view converges.
            info!(group_id = %self.group_id, user_id = %user_id, "late join, replaying snapshots");
            self.send_to(conn_id, GameEvent::Start);
            if let Some(tick) = self.last_tick.clone() {
                self.send_to(conn_id, tick);
            }
            if let Some(change) = self.last_change_turn.clone() {
                self.send_to(conn_id, change);
            }
            return Ok(());
        }

        if !self.players.contains(&user_id) {
            self.players.push(user_id);
        }

        if self
            .roster
            .are_all_members_joined(self.group_id, &self.players)
            .await?
        {
            self.start_game();
        }
        Ok(())
    }

    fn start_game(&mut self) {
        self.phase = Phase::Playing;
        self.remaining_game_secs = self.config.session_secs;
        self.remaining_turn_secs = self.config.turn_secs;
        self.turn_index = 0;
        info!(
            group_id = %self.group_id,
            players = self.players.len(),
            "all members joined, game starting"
        );

        self.broadcast(GameEvent::Start);
        self.announce_turn();
        self.emit_tick();
    }

    fn on_tick(&mut self) -> Option<Ending> {
        match self.phase {
            Phase::Gathering => None,
            Phase::Playing => {
                self.remaining_game_secs = self.remaining_game_secs.saturating_sub(1);
                self.remaining_turn_secs = self.remaining_turn_secs.saturating_sub(1);
                self.emit_tick();
                if self.remaining_game_secs == 0 {
                    info!(group_id = %self.group_id, "session clock exhausted, game over");
                    return Some(Ending::Completed);
                }
                if self.remaining_turn_secs == 0 {
                    // Turn expiry behaves exactly like an invalid
                    // submission, absent participants included.
                    self.fail_attempt(self.current_player());
                }
                None
            }
            Phase::AwaitingContinuation { countdown } => {
                let countdown = countdown.saturating_sub(1);
                self.phase = Phase::AwaitingContinuation { countdown };
                self.emit_tick();
                if countdown == 0 {
                    let user = self.current_player();
                    info!(group_id = %self.group_id, user_id = %user, "continuation window expired");
                    self.bump_failure(user);
                    self.advance_turn();
                }
                None
            }
        }
    }

    fn on_submit(&mut self, user_id: UserId, word: &str) {
        if !matches!(self.phase, Phase::Playing) {
            warn!(group_id = %self.group_id, user_id = %user_id, "word submitted outside an active turn");
            return;
        }
        if user_id != self.current_player() {
            warn!(group_id = %self.group_id, user_id = %user_id, "word submitted by non-current participant");
            return;
        }

        if domain::is_valid_transition(&self.current_word, word) {
            self.current_word = word.to_string();
            self.advance_turn();
        } else {
            debug!(group_id = %self.group_id, user_id = %user_id, "submission rejected by validator");
            self.fail_attempt(user_id);
        }
    }

    fn on_confirm(&mut self, user_id: UserId) {
        if !matches!(self.phase, Phase::AwaitingContinuation { .. }) {
            warn!(group_id = %self.group_id, user_id = %user_id, "continuation confirmed while not awaiting one");
            return;
        }
        if user_id != self.current_player() {
            warn!(group_id = %self.group_id, user_id = %user_id, "continuation confirmed by non-current participant");
            return;
        }

        // The one-time grace is consumed whether confirmed or expired.
        self.bump_failure(user_id);
        self.phase = Phase::Playing;
        self.remaining_turn_secs += self.config.continuation_bonus_secs;
    }

    fn on_input(&mut self, user_id: UserId, value: String) {
        if !matches!(self.phase, Phase::Playing) {
            debug!(group_id = %self.group_id, user_id = %user_id, "live input outside an active turn, dropped");
            return;
        }
        if user_id != self.current_player() {
            warn!(group_id = %self.group_id, user_id = %user_id, "live input from non-current participant");
            return;
        }
        self.broadcast(GameEvent::Input { value });
    }

    fn on_leave(&mut self, user_id: UserId, conn_id: Uuid) -> Option<Ending> {
        self.outputs.retain(|o| o.conn_id != conn_id);

        if matches!(self.phase, Phase::Gathering) {
            self.players.retain(|&u| u != user_id);
            if self.players.is_empty() {
                info!(group_id = %self.group_id, "all participants left during gathering");
                return Some(Ending::Abandoned);
            }
        }
        // While running, turn order stays intact; the absent participant's
        // turns expire like invalid submissions, so the game progresses.
        None
    }

    /// Invalid submission or turn expiry by `user`. The first failure opens
    /// the continuation window; every later one costs the turn.
    fn fail_attempt(&mut self, user: UserId) {
        if self.failure_count(user) == 0 {
            self.phase = Phase::AwaitingContinuation {
                countdown: self.config.continuation_secs,
            };
            self.emit_tick();
        } else {
            self.bump_failure(user);
            self.advance_turn();
        }
    }

    /// Moves to the next participant, keeping `current_word` as-is unless
    /// the caller already replaced it.
    fn advance_turn(&mut self) {
        self.phase = Phase::Playing;
        self.turn_index = (self.turn_index + 1) % self.players.len();
        self.remaining_turn_secs = self.config.turn_secs;
        self.announce_turn();
    }

    fn announce_turn(&mut self) {
        let change = GameEvent::ChangeTurn {
            previous_word: self.current_word.clone(),
            next_user: self.current_player(),
        };
        self.last_change_turn = Some(change.clone());
        self.broadcast(change);
    }

    fn emit_tick(&mut self) {
        let (awaiting, turn_secs, failing) = match self.phase {
            Phase::AwaitingContinuation { countdown } => {
                (true, countdown, Some(self.current_player()))
            }
            _ => (false, self.remaining_turn_secs, None),
        };
        let tick = GameEvent::Tick {
            remaining_game_secs: self.remaining_game_secs,
            remaining_turn_secs: turn_secs,
            awaiting_continuation: awaiting,
            failing_user: failing,
        };
        self.last_tick = Some(tick.clone());
        self.broadcast(tick);
    }

    fn current_player(&self) -> UserId {
        self.players[self.turn_index]
    }

    fn failure_count(&self, user: UserId) -> u32 {
        self.failures.get(&user).copied().unwrap_or(0)
    }

    fn bump_failure(&mut self, user: UserId) {
        *self.failures.entry(user).or_insert(0) += 1;
    }

    /// Fire-and-forget fan-out. A single consumer's delivery failure is
    /// logged and ignored; it never affects the other participants.
    fn broadcast(&self, event: GameEvent) {
        for out in &self.outputs {
            if out.tx.send(event.clone()).is_err() {
                debug!(
                    group_id = %self.group_id,
                    user_id = %out.user_id,
                    "dropping event for disconnected consumer"
                );
            }
        }
    }

    fn send_to(&self, conn_id: Uuid, event: GameEvent) {
        if let Some(out) = self.outputs.iter().find(|o| o.conn_id == conn_id) {
            if out.tx.send(event).is_err() {
                debug!(
                    group_id = %self.group_id,
                    user_id = %out.user_id,
                    "dropping event for disconnected consumer"
                );
            }
        }
    }

    async fn teardown(self, ending: Ending) {
        if ending == Ending::Completed {
            for &user in &self.players {
                let succeeded = self.failure_count(user) < 2;
                if let Err(err) = self.stats.record_outcome(user, succeeded).await {
                    error!(
                        group_id = %self.group_id,
                        user_id = %user,
                        error = %err,
                        "failed to record game outcome"
                    );
                }
                self.stats.invalidate_cache(user).await;
            }
        }

        self.sessions.lock().remove(&self.group_id);
        info!(group_id = %self.group_id, ?ending, "game session terminated");
        // Dropping `self` closes the inbound channel and every outbound
        // channel; readers treat the closed channel as the disconnect
        // signal.
    }
}
