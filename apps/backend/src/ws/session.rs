//! WebSocket connection adapter.
//!
//! One actor per connected participant. The actor translates wire frames
//! into coordinator commands and streams coordinator events back out as
//! wire messages. It never touches session state: everything goes through
//! the session's channels, so blocking on network I/O can never hold a
//! session-internal lock.

use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{info, warn};
use uuid::Uuid;

use crate::extractors::current_user::CurrentUser;
use crate::game::events::{EventReceiver, GameCommand, GameEvent, GroupId, UserId};
use crate::game::registry::SessionRegistry;
use crate::state::app_state::AppState;
use crate::ws::protocol::{ClientMsg, ServerMsg};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

#[derive(Debug, Deserialize)]
pub struct GameQuery {
    group_id: u64,
}

pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    query: web::Query<GameQuery>,
    current_user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let group_id = GroupId(query.group_id);
    let start_deadline = tokio::time::Instant::now() + app_state.config.gathering_window();

    let joined = app_state
        .registry
        .join(group_id, current_user.id, start_deadline);
    let conn_id = joined.conn_id;

    let session = WsGameSession::new(group_id, current_user.id, joined, app_state.registry.clone());
    ws::start(session, &req, stream).inspect_err(|_| {
        // Handshake failed before the actor started, so `stopped` will
        // never run; undo the join here or the participant leaks into the
        // gathering roster.
        app_state.registry.leave(group_id, current_user.id, conn_id);
    })
}

pub struct WsGameSession {
    conn_id: Uuid,
    user_id: UserId,
    group_id: GroupId,
    commands: mpsc::UnboundedSender<GameCommand>,
    events: Option<EventReceiver>,
    registry: Arc<SessionRegistry>,
    last_heartbeat: Instant,
}

impl WsGameSession {
    fn new(
        group_id: GroupId,
        user_id: UserId,
        joined: crate::game::registry::JoinedSession,
        registry: Arc<SessionRegistry>,
    ) -> Self {
        Self {
            conn_id: joined.conn_id,
            user_id,
            group_id,
            commands: joined.commands,
            events: Some(joined.events),
            registry,
            last_heartbeat: Instant::now(),
        }
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "[WS SESSION] failed to serialize outbound message"),
        }
    }

    /// Malformed input is reported to the offending participant only; the
    /// socket stays open and session state is untouched.
    fn send_error(ctx: &mut ws::WebsocketContext<Self>, reason: impl Into<String>) {
        Self::send_json(
            ctx,
            &ServerMsg::OnError {
                reason: reason.into(),
            },
        );
    }

    fn start_heartbeat(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(
                    conn_id = %actor.conn_id,
                    user_id = %actor.user_id,
                    "[WS SESSION] heartbeat timed out"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
    }
}

impl Actor for WsGameSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(
            conn_id = %self.conn_id,
            user_id = %self.user_id,
            group_id = %self.group_id,
            "[WS SESSION] started"
        );

        if let Some(events) = self.events.take() {
            ctx.add_stream(UnboundedReceiverStream::new(events));
        }
        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.registry
            .leave(self.group_id, self.user_id, self.conn_id);
        info!(
            conn_id = %self.conn_id,
            user_id = %self.user_id,
            group_id = %self.group_id,
            "[WS SESSION] stopped"
        );
    }
}

/// Coordinator events arriving on this participant's own channel.
impl StreamHandler<GameEvent> for WsGameSession {
    fn handle(&mut self, event: GameEvent, ctx: &mut Self::Context) {
        Self::send_json(ctx, &ServerMsg::from_event(event, self.user_id));
    }

    fn finished(&mut self, ctx: &mut Self::Context) {
        // The coordinator closed the channel: the session is over.
        ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
        ctx.stop();
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsGameSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();

                let parsed: Result<ClientMsg, _> = serde_json::from_str(&text);
                let Ok(msg) = parsed else {
                    Self::send_error(ctx, "malformed message");
                    return;
                };

                if self.commands.send(msg.into_command(self.user_id)).is_err() {
                    // Session already torn down; the event stream will end
                    // momentarily and close this socket.
                    warn!(
                        conn_id = %self.conn_id,
                        user_id = %self.user_id,
                        "[WS SESSION] command sent to terminated session"
                    );
                }
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                Self::send_error(ctx, "binary frames not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(
                    conn_id = %self.conn_id,
                    user_id = %self.user_id,
                    error = %err,
                    "[WS SESSION] protocol error"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}
