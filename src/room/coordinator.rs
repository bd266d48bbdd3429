//! Room coordinator: one actor per room.
//!
//! The actor mailbox gives each room the sequential execution the engine
//! requires: a message handler runs to completion, including the full
//! post-mutation emission pipeline, before the next message is dequeued.
//! Engine mutations never suspend; only outcome reporting is spawned off.

use std::sync::Arc;
use std::time::Duration;

use actix::prelude::*;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::engine::{GameEngine, RemoveOutcome};
use crate::domain::rules::{MAX_PLAYERS, MIN_PLAYERS};
use crate::domain::transitions::derive_rush_alerts;
use crate::domain::{Card, CardId, Color, PlayerId, PowerPlay};
use crate::errors::{GameError, LobbyError};
use crate::room::registry::RoomDirectory;
use crate::services::{MatchOutcome, OutcomeReporter};
use crate::ws::protocol::{LobbyPlayer, LobbyState, RoomStatus, ServerMsg};

/// Grace period before an empty, never-joined room evicts itself.
const EMPTY_ROOM_GRACE: Duration = Duration::from_secs(30);

/// Outbound frame, delivered to a session actor for serialization.
#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct Outbound(pub ServerMsg);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Create,
    Join,
}

/// Seat claim: both room creation and joining funnel through this message
/// so every client-visible frame flows through one ordered channel.
#[derive(Message)]
#[rtype(result = "Result<JoinAccepted, LobbyError>")]
pub struct Join {
    pub conn_id: Uuid,
    pub recipient: Recipient<Outbound>,
    pub name: String,
    pub user_id: Option<String>,
    pub kind: JoinKind,
}

#[derive(Debug, Clone, Copy)]
pub struct JoinAccepted {
    pub player_id: PlayerId,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct StartGame {
    pub conn_id: Uuid,
}

/// One of the four in-game operations, validated by the engine.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Action {
    pub conn_id: Uuid,
    pub kind: ActionKind,
}

#[derive(Debug, Clone)]
pub enum ActionKind {
    PlayCard {
        card_id: CardId,
        chosen_color: Option<Color>,
    },
    Draw,
    DrawPower,
    PlayPower(PowerPlay),
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Leave {
    pub conn_id: Uuid,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub conn_id: Uuid,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct UpdateAuth {
    pub conn_id: Uuid,
    pub user_id: Option<String>,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct SendEmote {
    pub conn_id: Uuid,
    pub emote_type: String,
}

struct Connection {
    conn_id: Uuid,
    recipient: Recipient<Outbound>,
}

/// Roster entry. The seat survives a disconnect so the player can rejoin
/// by name; only leaving gives it up.
struct RoomSeat {
    player_id: PlayerId,
    name: String,
    user_id: Option<String>,
    conn: Option<Connection>,
}

pub struct Room {
    code: String,
    directory: Arc<RoomDirectory>,
    reporter: Arc<dyn OutcomeReporter>,
    turn_timeout: Duration,
    seats: Vec<RoomSeat>,
    host: Option<PlayerId>,
    engine: Option<GameEngine>,
    timer: Option<SpawnHandle>,
}

impl Room {
    pub fn new(
        code: String,
        directory: Arc<RoomDirectory>,
        reporter: Arc<dyn OutcomeReporter>,
        turn_timeout: Duration,
    ) -> Self {
        Self {
            code,
            directory,
            reporter,
            turn_timeout,
            seats: Vec::new(),
            host: None,
            engine: None,
            timer: None,
        }
    }

    fn seat_by_conn(&self, conn_id: Uuid) -> Option<usize> {
        self.seats
            .iter()
            .position(|s| s.conn.as_ref().map(|c| c.conn_id) == Some(conn_id))
    }

    fn seat_by_player(&self, player_id: PlayerId) -> Option<&RoomSeat> {
        self.seats.iter().find(|s| s.player_id == player_id)
    }

    fn send_to_player(&self, player_id: PlayerId, msg: ServerMsg) {
        if let Some(conn) = self.seat_by_player(player_id).and_then(|s| s.conn.as_ref()) {
            conn.recipient.do_send(Outbound(msg));
        }
    }

    fn broadcast(&self, msg: ServerMsg) {
        for seat in &self.seats {
            if let Some(conn) = &seat.conn {
                conn.recipient.do_send(Outbound(msg.clone()));
            }
        }
    }

    fn send_error_to_conn(&self, conn_id: Uuid, code: &'static str, message: String) {
        if let Some(idx) = self.seat_by_conn(conn_id) {
            if let Some(conn) = &self.seats[idx].conn {
                conn.recipient.do_send(Outbound(ServerMsg::Error { code, message }));
            }
        }
    }

    fn lobby_state(&self) -> LobbyState {
        LobbyState {
            room_code: self.code.clone(),
            status: if self.engine.is_some() {
                RoomStatus::InProgress
            } else {
                RoomStatus::Waiting
            },
            players: self
                .seats
                .iter()
                .map(|s| LobbyPlayer {
                    id: s.player_id,
                    name: s.name.clone(),
                    is_host: Some(s.player_id) == self.host,
                    connected: s.conn.is_some(),
                })
                .collect(),
        }
    }

    fn broadcast_lobby(&self) {
        self.broadcast(ServerMsg::LobbyUpdate {
            lobby: self.lobby_state(),
        });
    }

    fn any_connected(&self) -> bool {
        self.seats.iter().any(|s| s.conn.is_some())
    }

    fn evict(&mut self, ctx: &mut Context<Self>) {
        info!(room_code = %self.code, "room evicted");
        self.cancel_timer(ctx);
        self.directory.remove(&self.code);
        ctx.stop();
    }

    // --- turn timer -------------------------------------------------------

    fn schedule_timer(&mut self, ctx: &mut Context<Self>) {
        self.cancel_timer(ctx);
        let handle = ctx.run_later(self.turn_timeout, |actor, ctx| {
            actor.timer = None;
            actor.force_timeout(ctx);
        });
        self.timer = Some(handle);
    }

    fn cancel_timer(&mut self, ctx: &mut Context<Self>) {
        if let Some(handle) = self.timer.take() {
            ctx.cancel_future(handle);
        }
    }

    /// Turn timeout: act on the current player's behalf, then run the
    /// normal pipeline. A forced power draw takes priority over a card
    /// draw, mirroring what the player would be allowed to do themselves.
    fn force_timeout(&mut self, ctx: &mut Context<Self>) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        let current = engine.current_player();
        let before = engine.hand_counts();

        let result = if engine.pending_power_draw() == Some(current) {
            engine.draw_power_card(current).map(|_| ())
        } else {
            engine.draw(current).map(|_| ())
        };

        match result {
            Ok(()) => {
                info!(room_code = %self.code, player_id = %current, "turn timed out, acted for player");
                self.after_mutation(ctx, current, before);
            }
            Err(err) => {
                warn!(room_code = %self.code, player_id = %current, error = %err, "timeout action failed");
                self.schedule_timer(ctx);
            }
        }
    }

    // --- post-mutation pipeline -------------------------------------------

    /// Fixed emission order after every successful engine mutation:
    /// hand updates, actor power state, rush alerts, public state, then
    /// either game-over teardown or a fresh turn timer.
    fn after_mutation(
        &mut self,
        ctx: &mut Context<Self>,
        actor: PlayerId,
        before: Vec<(PlayerId, usize)>,
    ) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        let hand_updates: Vec<(PlayerId, Vec<Card>)> = engine
            .take_dirty_hands()
            .into_iter()
            .filter_map(|pid| engine.hand(pid).ok().map(|h| (pid, h.to_vec())))
            .collect();
        let power_update = engine.power_state(actor).ok();
        let after = engine.hand_counts();
        let alerts = derive_rush_alerts(&before, &after);
        let host = self.host.unwrap_or(actor);
        let public = engine.public_state(&self.code, host);
        let ended = engine
            .winner()
            .map(|w| (w, engine.final_scores().unwrap_or_default()));

        for (player_id, cards) in hand_updates {
            self.send_to_player(player_id, ServerMsg::HandUpdate { cards });
        }
        if let Some(power) = power_update {
            self.send_to_player(
                actor,
                ServerMsg::PowerStateUpdate {
                    points: power.points,
                    cards: power.cards,
                    required_draws: power.required_draws,
                },
            );
        }
        for player_id in alerts {
            if let Some(seat) = self.seat_by_player(player_id) {
                let player_name = seat.name.clone();
                self.broadcast(ServerMsg::RushAlert {
                    player_id,
                    player_name,
                });
            }
        }
        self.broadcast(ServerMsg::StateUpdate { state: public });

        match ended {
            Some((winner_id, scores)) => {
                info!(room_code = %self.code, winner_id = %winner_id, "game ended");
                self.broadcast(ServerMsg::GameEnded { winner_id, scores });
                self.report_outcomes(winner_id);
                self.engine = None;
                self.cancel_timer(ctx);
                self.broadcast_lobby();
            }
            None => self.schedule_timer(ctx),
        }
    }

    /// Hand the per-player results to the external stats collaborator.
    /// Spawned off the actor; failures are logged by the wrapper and never
    /// reach the room.
    fn report_outcomes(&self, winner_id: PlayerId) {
        let outcomes: Vec<MatchOutcome> = self
            .seats
            .iter()
            .filter_map(|seat| {
                seat.user_id.as_ref().map(|user_id| MatchOutcome {
                    user_id: user_id.clone(),
                    did_win: seat.player_id == winner_id,
                })
            })
            .collect();
        if outcomes.is_empty() {
            return;
        }

        let reporter = Arc::clone(&self.reporter);
        let room_code = self.code.clone();
        actix::spawn(async move {
            if let Err(err) = reporter.report_outcomes(outcomes).await {
                warn!(room_code = %room_code, error = %err, "outcome report failed");
            }
        });
    }

    // --- lobby helpers ----------------------------------------------------

    fn promote_host(&mut self) {
        self.host = self
            .seats
            .iter()
            .find(|s| s.conn.is_some())
            .or_else(|| self.seats.first())
            .map(|s| s.player_id);
    }

    /// Drop a seat entirely. Leaving is permanent; disconnects keep the
    /// seat and go through `Disconnect` instead.
    fn remove_seat(&mut self, ctx: &mut Context<Self>, idx: usize) {
        let seat = self.seats.remove(idx);
        let player_id = seat.player_id;
        let was_waiting = self.engine.is_none();
        info!(room_code = %self.code, player_id = %player_id, name = %seat.name, "player left room");

        // Succession first, so anything emitted below carries the new host.
        if self.host == Some(player_id) {
            self.promote_host();
        }

        if let Some(engine) = self.engine.as_mut() {
            let before = engine.hand_counts();
            match engine.remove_player(player_id) {
                Ok(RemoveOutcome::Empty) => {
                    self.engine = None;
                    self.cancel_timer(ctx);
                }
                // A continuing game broadcasts the new roster via the
                // pipeline; a win broadcasts game_ended + lobby there too.
                Ok(_) => self.after_mutation(ctx, player_id, before),
                Err(err) => {
                    warn!(room_code = %self.code, player_id = %player_id, error = %err, "engine removal failed");
                }
            }
        }

        if self.seats.is_empty() || !self.any_connected() {
            self.evict(ctx);
            return;
        }

        if was_waiting {
            self.broadcast_lobby();
        }
    }

    /// Rebind a returning connection to its old seat and replay the full
    /// game start payload so the client can rebuild its view.
    fn rejoin(&mut self, idx: usize, msg: &Join) -> JoinAccepted {
        let player_id = self.seats[idx].player_id;
        self.seats[idx].conn = Some(Connection {
            conn_id: msg.conn_id,
            recipient: msg.recipient.clone(),
        });
        if msg.user_id.is_some() {
            self.seats[idx].user_id = msg.user_id.clone();
        }
        info!(room_code = %self.code, player_id = %player_id, "player rejoined");

        msg.recipient.do_send(Outbound(ServerMsg::RoomJoined {
            room_code: self.code.clone(),
        }));
        msg.recipient
            .do_send(Outbound(ServerMsg::PlayerIdentified { player_id }));

        if let Some(engine) = &self.engine {
            let host = self.host.unwrap_or(player_id);
            let state = engine.public_state(&self.code, host);
            let hand = engine.hand(player_id).map(<[Card]>::to_vec).unwrap_or_default();
            msg.recipient
                .do_send(Outbound(ServerMsg::GameStarted { state, hand }));
            if let Ok(power) = engine.power_state(player_id) {
                msg.recipient.do_send(Outbound(ServerMsg::PowerStateUpdate {
                    points: power.points,
                    cards: power.cards,
                    required_draws: power.required_draws,
                }));
            }
        } else {
            self.broadcast_lobby();
        }

        JoinAccepted { player_id }
    }
}

impl Actor for Room {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(room_code = %self.code, "room opened");
        // A room whose creator never completed the join would leak forever.
        ctx.run_later(EMPTY_ROOM_GRACE, |actor, ctx| {
            if actor.seats.is_empty() {
                actor.evict(ctx);
            }
        });
    }
}

impl Handler<Join> for Room {
    type Result = Result<JoinAccepted, LobbyError>;

    fn handle(&mut self, msg: Join, ctx: &mut Self::Context) -> Self::Result {
        let name = msg.name.trim().to_string();
        if name.is_empty() {
            if msg.kind == JoinKind::Create && self.seats.is_empty() {
                self.evict(ctx);
            }
            return Err(LobbyError::InvalidName);
        }

        // Rejoin-by-name: a disconnected seat with a case-insensitive match.
        if let Some(idx) = self
            .seats
            .iter()
            .position(|s| s.conn.is_none() && s.name.eq_ignore_ascii_case(&name))
        {
            return Ok(self.rejoin(idx, &msg));
        }

        if self.engine.is_some() {
            return Err(LobbyError::GameInProgress);
        }
        if self.seats.len() >= MAX_PLAYERS {
            return Err(LobbyError::RoomFull);
        }
        if self
            .seats
            .iter()
            .any(|s| s.name.eq_ignore_ascii_case(&name))
        {
            return Err(LobbyError::NameInUse);
        }

        let player_id = Uuid::new_v4();
        self.seats.push(RoomSeat {
            player_id,
            name: name.clone(),
            user_id: msg.user_id.clone(),
            conn: Some(Connection {
                conn_id: msg.conn_id,
                recipient: msg.recipient.clone(),
            }),
        });
        if self.host.is_none() {
            self.host = Some(player_id);
        }
        info!(room_code = %self.code, player_id = %player_id, name = %name, "player joined");

        let ack = match msg.kind {
            JoinKind::Create => ServerMsg::RoomCreated {
                room_code: self.code.clone(),
            },
            JoinKind::Join => ServerMsg::RoomJoined {
                room_code: self.code.clone(),
            },
        };
        msg.recipient.do_send(Outbound(ack));
        msg.recipient
            .do_send(Outbound(ServerMsg::PlayerIdentified { player_id }));
        self.broadcast_lobby();

        Ok(JoinAccepted { player_id })
    }
}

impl Handler<StartGame> for Room {
    type Result = ();

    fn handle(&mut self, msg: StartGame, ctx: &mut Self::Context) {
        let Some(idx) = self.seat_by_conn(msg.conn_id) else {
            return;
        };
        let player_id = self.seats[idx].player_id;

        if self.engine.is_some() {
            let err = LobbyError::AlreadyStarted;
            self.send_error_to_conn(msg.conn_id, err.code(), err.to_string());
            return;
        }
        if Some(player_id) != self.host {
            let err = LobbyError::NotHost;
            self.send_error_to_conn(msg.conn_id, err.code(), err.to_string());
            return;
        }
        if self.seats.len() < MIN_PLAYERS {
            let err = LobbyError::TooFewPlayers;
            self.send_error_to_conn(msg.conn_id, err.code(), err.to_string());
            return;
        }

        let roster: Vec<(PlayerId, String)> = self
            .seats
            .iter()
            .map(|s| (s.player_id, s.name.clone()))
            .collect();

        let mut engine = match GameEngine::start(roster, rand::random()) {
            Ok(engine) => engine,
            Err(err) => {
                self.send_error_to_conn(msg.conn_id, err.code(), err.to_string());
                return;
            }
        };

        info!(room_code = %self.code, players = self.seats.len(), "game started");

        // The start payload carries the full hand, so the freshly dealt
        // dirty set is drained rather than re-sent as hand updates.
        engine.take_dirty_hands();
        let host = self.host.unwrap_or(player_id);
        for seat in &self.seats {
            let Some(conn) = &seat.conn else { continue };
            let state = engine.public_state(&self.code, host);
            let hand = engine
                .hand(seat.player_id)
                .map(<[Card]>::to_vec)
                .unwrap_or_default();
            conn.recipient
                .do_send(Outbound(ServerMsg::GameStarted { state, hand }));
            if let Ok(power) = engine.power_state(seat.player_id) {
                conn.recipient.do_send(Outbound(ServerMsg::PowerStateUpdate {
                    points: power.points,
                    cards: power.cards,
                    required_draws: power.required_draws,
                }));
            }
        }

        self.engine = Some(engine);
        self.schedule_timer(ctx);
    }
}

impl Handler<Action> for Room {
    type Result = ();

    fn handle(&mut self, msg: Action, ctx: &mut Self::Context) {
        let Some(idx) = self.seat_by_conn(msg.conn_id) else {
            return;
        };
        let player_id = self.seats[idx].player_id;

        let Some(engine) = self.engine.as_mut() else {
            let err = GameError::GameNotStarted;
            self.send_error_to_conn(msg.conn_id, err.code(), err.to_string());
            return;
        };

        let before = engine.hand_counts();
        let result = match msg.kind {
            ActionKind::PlayCard {
                card_id,
                chosen_color,
            } => engine.play_card(player_id, card_id, chosen_color).map(|_| ()),
            ActionKind::Draw => engine.draw(player_id).map(|_| ()),
            ActionKind::DrawPower => engine.draw_power_card(player_id).map(|_| ()),
            ActionKind::PlayPower(play) => engine.play_power_card(player_id, play).map(|_| ()),
        };

        match result {
            Ok(()) => self.after_mutation(ctx, player_id, before),
            Err(err) => {
                // Validation failures stay local to the origin connection.
                self.send_error_to_conn(msg.conn_id, err.code(), err.to_string());
            }
        }
    }
}

impl Handler<Leave> for Room {
    type Result = ();

    fn handle(&mut self, msg: Leave, ctx: &mut Self::Context) {
        if let Some(idx) = self.seat_by_conn(msg.conn_id) {
            self.remove_seat(ctx, idx);
        }
    }
}

impl Handler<Disconnect> for Room {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, ctx: &mut Self::Context) {
        let Some(idx) = self.seat_by_conn(msg.conn_id) else {
            return;
        };

        // The seat survives the connection so the player can rejoin by
        // name; in a running game their turns burn down via the timeout.
        self.seats[idx].conn = None;
        let player_id = self.seats[idx].player_id;
        info!(
            room_code = %self.code,
            player_id = %player_id,
            "player disconnected, seat retained"
        );

        if !self.any_connected() {
            self.evict(ctx);
            return;
        }

        if self.engine.is_none() {
            if self.host == Some(player_id) {
                self.promote_host();
            }
            self.broadcast_lobby();
        }
    }
}

impl Handler<UpdateAuth> for Room {
    type Result = ();

    fn handle(&mut self, msg: UpdateAuth, _ctx: &mut Self::Context) {
        if let Some(idx) = self.seat_by_conn(msg.conn_id) {
            self.seats[idx].user_id = msg.user_id;
        }
    }
}

impl Handler<SendEmote> for Room {
    type Result = ();

    fn handle(&mut self, msg: SendEmote, _ctx: &mut Self::Context) {
        if let Some(idx) = self.seat_by_conn(msg.conn_id) {
            let player_id = self.seats[idx].player_id;
            self.broadcast(ServerMsg::Emote {
                player_id,
                emote_type: msg.emote_type,
            });
        }
    }
}
