use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::state::UserId;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::services::lobby::JoinOutcome;
use crate::state::app_state::AppState;
use crate::ws::hub::Outbound;
use crate::ws::protocol::{ClientMsg, ServerMsg, PROTOCOL_VERSION};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

/// `GET /ws/{user_id}`: upgrade to a player session.
pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    path: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let user_id = path.into_inner();
    if user_id <= 0 {
        return Err(AppError::invalid(
            ErrorCode::InvalidUserId,
            format!("User id must be positive, got {user_id}"),
        )
        .into());
    }
    let session = WsSession::new(Uuid::new_v4(), user_id, app_state);
    ws::start(session, &req, stream)
}

pub struct WsSession {
    conn_id: Uuid,
    user_id: UserId,
    app_state: web::Data<AppState>,
    last_heartbeat: Instant,
    hello_done: bool,
}

impl WsSession {
    fn new(conn_id: Uuid, user_id: UserId, app_state: web::Data<AppState>) -> Self {
        Self {
            conn_id,
            user_id,
            app_state,
            last_heartbeat: Instant::now(),
            hello_done: false,
        }
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "[WS SESSION] failed to serialize outbound message"),
        }
    }

    fn send_error(ctx: &mut ws::WebsocketContext<Self>, err: &AppError) {
        Self::send_json(
            ctx,
            &ServerMsg::Error {
                code: err.code().as_str(),
                message: err.detail().to_string(),
            },
        );
    }

    fn send_error_and_close(
        &self,
        ctx: &mut ws::WebsocketContext<Self>,
        code: ErrorCode,
        message: impl Into<String>,
    ) {
        Self::send_json(
            ctx,
            &ServerMsg::Error {
                code: code.as_str(),
                message: message.into(),
            },
        );
        ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
        ctx.stop();
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(
                    conn_id = %actor.conn_id,
                    user_id = actor.user_id,
                    "[WS SESSION] heartbeat timed out"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
    }

    fn handle_client_msg(&mut self, cmd: ClientMsg, ctx: &mut ws::WebsocketContext<Self>) {
        if !self.hello_done && !matches!(cmd, ClientMsg::Hello { .. }) {
            self.send_error_and_close(ctx, ErrorCode::BadRequest, "Must send hello first");
            return;
        }

        match cmd {
            ClientMsg::Hello { protocol } => {
                if protocol != PROTOCOL_VERSION {
                    self.send_error_and_close(
                        ctx,
                        ErrorCode::BadProtocol,
                        "Unsupported protocol version",
                    );
                    return;
                }
                self.hello_done = true;
                Self::send_json(
                    ctx,
                    &ServerMsg::HelloAck {
                        protocol: PROTOCOL_VERSION,
                        user_id: self.user_id,
                    },
                );
            }
            ClientMsg::Join { stake } => match self.app_state.lobby.join(self.user_id, stake) {
                Ok(JoinOutcome::Waiting { stake, position }) => {
                    Self::send_json(ctx, &ServerMsg::Waiting { stake, position });
                }
                // State and hand frames arrive through the transport.
                Ok(JoinOutcome::Matched { match_id, opponent }) => {
                    debug!(match_id = %match_id, user_id = self.user_id, opponent, "[WS SESSION] matched");
                }
                Err(err) => Self::send_error(ctx, &AppError::from(err)),
            },
            ClientMsg::Move { match_id, action } => {
                // Outcome is observable only through the next snapshot.
                self.app_state
                    .registry
                    .submit(match_id, self.user_id, action);
            }
            ClientMsg::Leave => {
                let outcome = self.app_state.lobby.leave(self.user_id);
                debug!(user_id = self.user_id, ?outcome, "[WS SESSION] leave");
            }
        }
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(
            conn_id = %self.conn_id,
            user_id = self.user_id,
            "[WS SESSION] started"
        );
        let recipient = ctx.address().recipient::<Outbound>();
        self.app_state
            .ws
            .register(self.user_id, self.conn_id, recipient);
        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        let last = self.app_state.ws.unregister(self.user_id, self.conn_id);
        // Losing the final connection counts as leaving: dequeue or forfeit.
        if last {
            let outcome = self.app_state.lobby.leave(self.user_id);
            debug!(user_id = self.user_id, ?outcome, "[WS SESSION] disconnect handled");
        }
        info!(
            conn_id = %self.conn_id,
            user_id = self.user_id,
            "[WS SESSION] stopped"
        );
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
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
                match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(cmd) => self.handle_client_msg(cmd, ctx),
                    Err(err) => {
                        // Malformed frames get an error but keep the session.
                        Self::send_error(ctx, &AppError::from(err));
                    }
                }
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                self.send_error_and_close(ctx, ErrorCode::BadRequest, "Binary not supported");
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
                    user_id = self.user_id,
                    error = %err,
                    "[WS SESSION] protocol error"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}

impl Handler<Outbound> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: Outbound, ctx: &mut Self::Context) -> Self::Result {
        ctx.text(msg.0);
    }
}
