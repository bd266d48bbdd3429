//! WebSocket session actor: one per connection.
//!
//! The session owns the socket and a small bag of connection data (opaque
//! user id, current room binding). It parses inbound frames, routes lobby
//! commands to the registry and in-room commands to the bound room, and
//! serializes outbound frames the room pushes at it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{PlayerId, PowerPlay};
use crate::errors::LobbyError;
use crate::room::coordinator::{
    Action, ActionKind, Disconnect, Join, JoinKind, Leave, Outbound, Room, SendEmote, StartGame,
    UpdateAuth,
};
use crate::room::RoomDirectory;
use crate::state::app_state::AppState;
use crate::ws::protocol::{ClientMsg, ServerMsg};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let session = WsSession::new(app_state.directory());
    ws::start(session, &req, stream)
}

struct RoomBinding {
    addr: Addr<Room>,
    player_id: PlayerId,
}

pub struct WsSession {
    conn_id: Uuid,
    user_id: Option<String>,
    directory: Arc<RoomDirectory>,
    room: Option<RoomBinding>,
    last_heartbeat: Instant,
}

impl WsSession {
    pub fn new(directory: Arc<RoomDirectory>) -> Self {
        Self {
            conn_id: Uuid::new_v4(),
            user_id: None,
            directory,
            room: None,
            last_heartbeat: Instant::now(),
        }
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "failed to serialize outbound frame"),
        }
    }

    fn send_error(
        ctx: &mut ws::WebsocketContext<Self>,
        code: &'static str,
        message: impl Into<String>,
    ) {
        Self::send_json(
            ctx,
            &ServerMsg::Error {
                code,
                message: message.into(),
            },
        );
    }

    fn send_lobby_error(ctx: &mut ws::WebsocketContext<Self>, err: LobbyError) {
        Self::send_error(ctx, err.code(), err.to_string());
    }

    fn send_error_and_close(
        ctx: &mut ws::WebsocketContext<Self>,
        code: &'static str,
        message: impl Into<String>,
    ) {
        Self::send_error(ctx, code, message);
        ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
        ctx.stop();
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(conn_id = %actor.conn_id, "heartbeat timed out");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
    }

    /// Claim a seat in `room`, either as creator or joiner. The room pushes
    /// every client-visible frame itself; the response only carries the
    /// seat binding.
    fn claim_seat(
        &mut self,
        ctx: &mut ws::WebsocketContext<Self>,
        room: Addr<Room>,
        name: String,
        kind: JoinKind,
    ) {
        let join = Join {
            conn_id: self.conn_id,
            recipient: ctx.address().recipient::<Outbound>(),
            name,
            user_id: self.user_id.clone(),
            kind,
        };

        let request = room.send(join);
        let room_for_binding = room.clone();
        ctx.spawn(request.into_actor(self).map(move |res, actor, ctx| {
            match res {
                Ok(Ok(accepted)) => {
                    actor.room = Some(RoomBinding {
                        addr: room_for_binding,
                        player_id: accepted.player_id,
                    });
                }
                Ok(Err(err)) => Self::send_lobby_error(ctx, err),
                Err(err) => {
                    // Room actor died between lookup and claim.
                    warn!(conn_id = %actor.conn_id, error = %err, "seat claim undeliverable");
                    Self::send_lobby_error(ctx, LobbyError::RoomNotFound);
                }
            }
        }));
    }

    fn handle_client_msg(&mut self, msg: ClientMsg, ctx: &mut ws::WebsocketContext<Self>) {
        match msg {
            ClientMsg::CreateRoom { name } => {
                if self.room.is_some() {
                    Self::send_lobby_error(ctx, LobbyError::AlreadyInRoom);
                    return;
                }
                let (_code, room) = Arc::clone(&self.directory).create_room();
                self.claim_seat(ctx, room, name, JoinKind::Create);
            }
            ClientMsg::JoinRoom { room_code, name } => {
                if self.room.is_some() {
                    Self::send_lobby_error(ctx, LobbyError::AlreadyInRoom);
                    return;
                }
                match self.directory.get(&room_code) {
                    Some(room) => self.claim_seat(ctx, room, name, JoinKind::Join),
                    None => Self::send_lobby_error(ctx, LobbyError::RoomNotFound),
                }
            }
            ClientMsg::StartGame => match &self.room {
                Some(binding) => binding.addr.do_send(StartGame {
                    conn_id: self.conn_id,
                }),
                None => Self::send_lobby_error(ctx, LobbyError::NotInRoom),
            },
            ClientMsg::PlayCard {
                card_id,
                chosen_color,
            } => self.forward_action(
                ctx,
                ActionKind::PlayCard {
                    card_id,
                    chosen_color,
                },
            ),
            ClientMsg::DrawCard => self.forward_action(ctx, ActionKind::Draw),
            ClientMsg::DrawPowerCard => self.forward_action(ctx, ActionKind::DrawPower),
            ClientMsg::PlayPowerCard {
                card_id,
                target_player_id,
                color,
            } => self.forward_action(
                ctx,
                ActionKind::PlayPower(PowerPlay {
                    card_id,
                    target_player_id,
                    color,
                }),
            ),
            ClientMsg::LeaveRoom => match self.room.take() {
                Some(binding) => binding.addr.do_send(Leave {
                    conn_id: self.conn_id,
                }),
                None => Self::send_lobby_error(ctx, LobbyError::NotInRoom),
            },
            ClientMsg::SendEmote { emote_type } => match &self.room {
                Some(binding) => binding.addr.do_send(SendEmote {
                    conn_id: self.conn_id,
                    emote_type,
                }),
                None => Self::send_lobby_error(ctx, LobbyError::NotInRoom),
            },
            ClientMsg::UpdateAuth { token } => {
                self.user_id = token.clone();
                if let Some(binding) = &self.room {
                    binding.addr.do_send(UpdateAuth {
                        conn_id: self.conn_id,
                        user_id: token,
                    });
                }
            }
        }
    }

    fn forward_action(&self, ctx: &mut ws::WebsocketContext<Self>, kind: ActionKind) {
        match &self.room {
            Some(binding) => binding.addr.do_send(Action {
                conn_id: self.conn_id,
                kind,
            }),
            None => Self::send_lobby_error(ctx, LobbyError::NotInRoom),
        }
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(conn_id = %self.conn_id, "ws session started");
        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        if let Some(binding) = self.room.take() {
            info!(
                conn_id = %self.conn_id,
                player_id = %binding.player_id,
                "ws session stopped while seated"
            );
            binding.addr.do_send(Disconnect {
                conn_id: self.conn_id,
            });
        } else {
            info!(conn_id = %self.conn_id, "ws session stopped");
        }
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
                    Ok(parsed) => self.handle_client_msg(parsed, ctx),
                    Err(err) => Self::send_error_and_close(
                        ctx,
                        "BAD_REQUEST",
                        format!("malformed frame: {err}"),
                    ),
                }
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                Self::send_error_and_close(ctx, "BAD_REQUEST", "binary frames are not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(conn_id = %self.conn_id, error = %err, "ws protocol error");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}

impl Handler<Outbound> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: Outbound, ctx: &mut Self::Context) {
        Self::send_json(ctx, &msg.0);
    }
}
