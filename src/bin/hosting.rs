//! Hosting server binary.
//!
//! Runs the HTTP + WebSocket front door for the engine: a thin actix
//! adapter translating wire `ClientMessage`s into `Command`s on a
//! table's single-writer inbox, and the resulting `ServerMessage`s
//! back out through the `Broadcaster`. Grounded on the teacher's
//! `hosting::Server` (route layout) and `hosting::Casino` (registry +
//! websocket bridge), generalized from a single in-process `Room` to
//! many independently spawned `TableActor`s.

use std::collections::HashMap;
use std::sync::RwLock;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer, Responder};
use futures::StreamExt;
use serde::Deserialize;
use tokio::sync::{mpsc, oneshot};

use poker_engine::action::{ActionIntent, ActionKind};
use poker_engine::broadcaster::{Broadcaster, Outbox};
use poker_engine::cards::Card;
use poker_engine::config::TableConfig;
use poker_engine::connection::ConnectionManager;
use poker_engine::ids::{ConnectionId, PlayerId, TableId};
use poker_engine::messages::{ClientMessage, ServerMessage, WinnerInfo};
use poker_engine::orchestrator::{ActionOutcome, Command, ShowdownOutcome, TableActor, TableSnapshot};
use poker_engine::player::Player;
use poker_engine::table::Table;
use poker_engine::timer::{ActionTimer, TableTimerSlot, TimerTickKind};

/// Fans a sanitized `ServerMessage` out to one registered session. The
/// registry is a plain `RwLock<HashMap>` since registration churns far
/// less than message volume; `send` itself never blocks on the
/// network, it only hands the write off to a detached task, matching
/// how the teacher's `bridge` forwards room output without letting a
/// slow client backpressure the room.
#[derive(Default)]
struct WsOutbox {
    sessions: RwLock<HashMap<ConnectionId, actix_ws::Session>>,
}

impl WsOutbox {
    fn register(&self, connection_id: ConnectionId, session: actix_ws::Session) {
        self.sessions.write().expect("outbox lock poisoned").insert(connection_id, session);
    }

    fn unregister(&self, connection_id: ConnectionId) {
        self.sessions.write().expect("outbox lock poisoned").remove(&connection_id);
    }
}

impl Outbox for WsOutbox {
    fn send(&self, connection_id: ConnectionId, message: ServerMessage) -> Result<(), String> {
        let session = self
            .sessions
            .read()
            .expect("outbox lock poisoned")
            .get(&connection_id)
            .cloned()
            .ok_or_else(|| "connection not registered".to_string())?;
        let json = serde_json::to_string(&message).map_err(|e| e.to_string())?;
        actix_web::rt::spawn(async move {
            let mut session = session;
            let _ = session.text(json).await;
        });
        Ok(())
    }
}

/// The process-wide table registry. Analogous to the teacher's
/// `Casino`, but each entry is a `TableActor`'s inbox rather than an
/// in-process `Room`, since a table's hand state lives behind its own
/// actor loop instead of the registry itself.
#[derive(Default)]
struct Lobby {
    tables: RwLock<HashMap<TableId, mpsc::UnboundedSender<Command>>>,
    connections: ConnectionManager,
    outbox: WsOutbox,
    /// One active countdown per table, ticked by that table's
    /// `run_timer_loop` task. Lives in the `Lobby` rather than inside
    /// `TableActor` since it's wall-clock driven from outside the
    /// actor's own mutation queue, the way §4.6/§5 describe the timer
    /// as a service sitting alongside the engine, not inside it.
    timers: RwLock<HashMap<TableId, TableTimerSlot>>,
}

impl Lobby {
    fn create_table(&self, name: String, config: TableConfig, host: PlayerId) -> Result<TableId, String> {
        config.validate().map_err(|e| e.to_string())?;
        let table_id = TableId::new();
        let table = Table::new(table_id, name, config, host);
        let sender = TableActor::spawn(table);
        self.tables.write().expect("lobby lock poisoned").insert(table_id, sender);
        log::info!("opened table {table_id}");
        Ok(table_id)
    }

    fn sender(&self, table_id: TableId) -> Option<mpsc::UnboundedSender<Command>> {
        self.tables.read().expect("lobby lock poisoned").get(&table_id).cloned()
    }

    async fn snapshot(&self, sender: &mpsc::UnboundedSender<Command>) -> Option<TableSnapshot> {
        let (tx, rx) = oneshot::channel();
        sender.send(Command::Snapshot { reply: tx }).ok()?;
        rx.await.ok()
    }

    async fn snapshot_and_broadcast(&self, table_id: TableId, sender: &mpsc::UnboundedSender<Command>, now_ms: u64, triggered_at_ms: u64) {
        let Some(snapshot) = self.snapshot(sender).await else { return };
        let broadcaster = Broadcaster::new(&self.connections, &self.outbox);
        broadcaster.broadcast_state(&snapshot.table, &snapshot.shown_cards, now_ms, triggered_at_ms);
        let _ = table_id;
    }

    /// Replaces whatever countdown `table_id` had with a fresh one for
    /// `player_id`, seeded from the table's configured action/time-bank
    /// seconds and that player's remaining time-bank reservoir. Returns
    /// `false` if the table has no action timer configured at all
    /// (`action_seconds == 0`, §4.6 "disabled; unlimited time").
    fn start_timer(&self, table_id: TableId, player_id: PlayerId, action_seconds: u32, time_bank_enabled: bool, time_bank_remaining: u32) -> bool {
        let timer = ActionTimer::start(player_id, action_seconds, time_bank_enabled, time_bank_remaining);
        let started = timer.is_some();
        let mut timers = self.timers.write().expect("timer lock poisoned");
        timers.entry(table_id).or_default().replace(timer);
        started
    }

    fn cancel_timer(&self, table_id: TableId) {
        let mut timers = self.timers.write().expect("timer lock poisoned");
        if let Some(slot) = timers.get_mut(&table_id) {
            slot.remove();
        }
    }

    fn disconnect(&self, connection_id: ConnectionId) {
        self.outbox.unregister(connection_id);
        if let Some(info) = self.connections.remove(connection_id) {
            if let Some(player_id) = info.player_id {
                self.broadcast_disconnect(info.table_id, player_id);
            }
        }
    }

    fn broadcast_disconnect(&self, table_id: TableId, player_id: PlayerId) {
        let broadcaster = Broadcaster::new(&self.connections, &self.outbox);
        broadcaster.broadcast_to_table(table_id, ServerMessage::PlayerDisconnected { player_id });
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[derive(Debug, Deserialize)]
struct CreateTableRequest {
    name: String,
    config: TableConfig,
}

async fn create_table(lobby: web::Data<Lobby>, body: web::Json<CreateTableRequest>) -> impl Responder {
    let host_player_id = PlayerId::new();
    let CreateTableRequest { name, config } = body.into_inner();
    match lobby.create_table(name, config, host_player_id) {
        Ok(table_id) => {
            actix_web::rt::spawn(run_timer_loop(lobby.clone(), table_id));
            HttpResponse::Ok().json(serde_json::json!({
                "table_id": table_id,
                "host_player_id": host_player_id,
            }))
        }
        Err(reason) => HttpResponse::BadRequest().body(reason),
    }
}

#[derive(Debug, Deserialize)]
struct EnterQuery {
    player_id: Option<PlayerId>,
    display_name: Option<String>,
    buy_in: Option<i64>,
    seat: Option<u8>,
    spectator: Option<bool>,
}

async fn enter(
    lobby: web::Data<Lobby>,
    path: web::Path<TableId>,
    query: web::Query<EnterQuery>,
    body: web::Payload,
    req: HttpRequest,
) -> impl Responder {
    let table_id = path.into_inner();
    let Some(sender) = lobby.sender(table_id) else {
        return HttpResponse::NotFound().body("table not found").map_into_right_body();
    };

    match actix_ws::handle(&req, body) {
        Ok((response, session, stream)) => {
            let connection_id = ConnectionId::new();
            let EnterQuery { player_id, display_name, buy_in, seat, spectator } = query.into_inner();

            if spectator.unwrap_or(false) {
                lobby.connections.add_spectator(connection_id, table_id);
                let broadcaster = Broadcaster::new(&lobby.connections, &lobby.outbox);
                broadcaster.broadcast_to_table(table_id, ServerMessage::SpectatorJoined);
            } else {
                let player_id = player_id.unwrap_or_default();
                let player = Player::new(
                    player_id,
                    display_name.unwrap_or_else(|| "player".to_string()),
                    buy_in.unwrap_or(0),
                    seat.unwrap_or(1),
                );
                let (seat_tx, seat_rx) = oneshot::channel();
                if sender.send(Command::SeatPlayer { seat: player.seat, player, reply: seat_tx }).is_ok() {
                    let _ = seat_rx.await;
                }
                lobby.connections.add_player(connection_id, table_id, player_id);
                let broadcaster = Broadcaster::new(&lobby.connections, &lobby.outbox);
                broadcaster.broadcast_to_table(table_id, ServerMessage::PlayerJoined { player_id });
                // A freshly seated player may be the second one at the
                // table; try to kick off a hand rather than waiting for
                // the next action/leave event to notice.
                try_start_next_hand(lobby.get_ref(), &sender, table_id).await;
            }

            lobby.outbox.register(connection_id, session.clone());
            actix_web::rt::spawn(handle_connection(lobby.clone(), table_id, connection_id, session, stream));
            response.map_into_left_body()
        }
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()).map_into_right_body(),
    }
}

/// Reads incoming frames for one connection until it disconnects,
/// translating each into a `Command` against its table. Unlike the
/// teacher's `bridge`, outbound traffic never flows through this task:
/// the `Broadcaster` fans results out through the `WsOutbox` registry
/// directly, so this loop only needs to pull, never select between a
/// room's own output channel and the socket.
async fn handle_connection(
    lobby: web::Data<Lobby>,
    table_id: TableId,
    connection_id: ConnectionId,
    mut session: actix_ws::Session,
    mut stream: actix_ws::MessageStream,
) {
    let Some(sender) = lobby.sender(table_id) else {
        lobby.disconnect(connection_id);
        return;
    };

    while let Some(Ok(frame)) = stream.next().await {
        match frame {
            actix_ws::Message::Text(text) => {
                let triggered_at_ms = now_ms();
                dispatch(&lobby, &sender, table_id, connection_id, &text, triggered_at_ms).await;
            }
            actix_ws::Message::Close(_) => break,
            actix_ws::Message::Ping(bytes) => {
                if session.pong(&bytes).await.is_err() {
                    break;
                }
            }
            _ => continue,
        }
    }

    lobby.disconnect(connection_id);
    let _ = session.close(None).await;
}

async fn dispatch(
    lobby: &Lobby,
    sender: &mpsc::UnboundedSender<Command>,
    table_id: TableId,
    connection_id: ConnectionId,
    text: &str,
    triggered_at_ms: u64,
) {
    let message: ClientMessage = match serde_json::from_str(text) {
        Ok(m) => m,
        Err(e) => {
            let _ = lobby.outbox.send(connection_id, ServerMessage::ActionRejected { reason: e.to_string() });
            return;
        }
    };

    let Some(player_id) = lobby.connections.lookup(connection_id).and_then(|info| info.player_id) else {
        let _ = lobby.outbox.send(connection_id, ServerMessage::ActionRejected {
            reason: "spectators may not act".into(),
        });
        return;
    };

    let intent = match message {
        ClientMessage::Fold => Some(ActionIntent { kind: ActionKind::Fold, amount: 0 }),
        ClientMessage::Check => Some(ActionIntent { kind: ActionKind::Check, amount: 0 }),
        ClientMessage::Call => Some(ActionIntent { kind: ActionKind::Call, amount: 0 }),
        ClientMessage::Raise { amount } => Some(ActionIntent { kind: ActionKind::Raise, amount }),
        ClientMessage::AllIn => Some(ActionIntent { kind: ActionKind::AllIn, amount: 0 }),
        ClientMessage::GetAvailableActions => {
            let (tx, rx) = oneshot::channel();
            if sender.send(Command::GetAvailableActions { player_id, reply: tx }).is_ok() {
                if let Ok(actions) = rx.await {
                    let _ = lobby.outbox.send(connection_id, ServerMessage::AvailableActions { actions });
                }
            }
            return;
        }
        ClientMessage::LeaveTable => {
            let (tx, rx) = oneshot::channel();
            if sender.send(Command::RemovePlayer { player_id, reply: tx }).is_ok() {
                let _ = rx.await;
            }
            let broadcaster = Broadcaster::new(&lobby.connections, &lobby.outbox);
            broadcaster.broadcast_to_table(table_id, ServerMessage::PlayerLeft { player_id });
            return;
        }
        ClientMessage::JoinTable { .. } | ClientMessage::JoinAsSpectator { .. } => {
            return;
        }
        ClientMessage::GetTimerState => {
            let snapshot = {
                let timers = lobby.timers.read().expect("timer lock poisoned");
                timers.get(&table_id).and_then(TableTimerSlot::peek).map(ActionTimer::snapshot)
            };
            let message = match snapshot {
                Some(tb) => ServerMessage::TimerTick {
                    player_id: tb.player,
                    remaining_seconds: tb.remaining_seconds,
                    is_time_bank_active: tb.is_time_bank_active,
                    time_bank_remaining: tb.time_bank_remaining,
                },
                // No countdown running for this table right now; reuse
                // `TimerCancelled` to mean "nothing to report" rather
                // than leave the request unanswered.
                None => ServerMessage::TimerCancelled { player_id },
            };
            let _ = lobby.outbox.send(connection_id, message);
            return;
        }
        ClientMessage::RequestMuck => {
            // `showdown.rs`'s muck policy is fully automatic
            // (must-show-if-can-win, else auto-muck); there is no
            // voluntary override to hook a client request into.
            let _ = lobby.outbox.send(
                connection_id,
                ServerMessage::ActionRejected {
                    reason: "muck is automatic at showdown; voluntary muck requests are not supported".into(),
                },
            );
            return;
        }
    };

    let Some(intent) = intent else { return };
    let now = now_ms();
    let (tx, rx) = oneshot::channel();
    if sender.send(Command::ExecutePlayerAction { player_id, intent, now_ms: now, reply: tx }).is_err() {
        return;
    }

    match rx.await {
        Ok(Ok(outcome)) => {
            handle_outcome(lobby, sender, table_id, now, triggered_at_ms, outcome).await;
        }
        Ok(Err(err)) => {
            let _ = lobby.outbox.send(connection_id, ServerMessage::ActionRejected { reason: err.to_string() });
        }
        Err(_) => {}
    }
}

/// Shared "what happens after an action landed" path: broadcast the
/// action, cancel the outgoing player's timer, chain into a showdown
/// when the hand just ended (and try to start the next one), or hand
/// the countdown to whoever is next to act. Used both for
/// client-submitted actions and for the timer loop's own forced folds
/// so the two drive identical broadcast sequences.
async fn handle_outcome(
    lobby: &Lobby,
    sender: &mpsc::UnboundedSender<Command>,
    table_id: TableId,
    now: u64,
    triggered_at_ms: u64,
    outcome: ActionOutcome,
) {
    let ActionOutcome { player_id, kind, amount, next_player_id, betting_round_complete, hand_complete, uncontested_winner } = outcome;
    lobby.cancel_timer(table_id);

    let broadcaster = Broadcaster::new(&lobby.connections, &lobby.outbox);
    broadcaster.broadcast_to_table(
        table_id,
        ServerMessage::ActionExecuted { player_id, kind, amount, next_player_id, betting_round_complete, hand_complete },
    );

    if hand_complete {
        // All-folded hands resolve inline inside `execute_player_action`
        // itself (§4.8 step 5: no showdown) and never leave a
        // `current_hand` for `ExecuteShowdown` to find; broadcast the
        // result directly from what the action already computed rather
        // than calling into showdown for a hand that never reached it.
        if let Some((winner, amount, hand_number)) = uncontested_winner {
            broadcaster.broadcast_to_table(
                table_id,
                ServerMessage::HandCompleted {
                    table_id,
                    hand_number,
                    winners: vec![WinnerInfo { player_id: winner, amount, shown_cards: None, hand_description: None }],
                    final_pot: amount,
                },
            );
            if let Some(snapshot) = lobby.snapshot(sender).await {
                broadcaster.broadcast_state(&snapshot.table, &snapshot.shown_cards, now_ms(), triggered_at_ms);
            }
            try_start_next_hand(lobby, sender, table_id).await;
            return;
        }

        let (show_tx, show_rx) = oneshot::channel();
        let showdown = if sender.send(Command::ExecuteShowdown { now_ms: now, reply: show_tx }).is_ok() {
            show_rx.await.ok().and_then(Result::ok)
        } else {
            None
        };
        if let Some(snapshot) = lobby.snapshot(sender).await {
            if let Some(showdown) = &showdown {
                broadcast_hand_completed(lobby, table_id, snapshot.table.hand_count, showdown, &snapshot.shown_cards);
            }
            let broadcaster = Broadcaster::new(&lobby.connections, &lobby.outbox);
            broadcaster.broadcast_state(&snapshot.table, &snapshot.shown_cards, now_ms(), triggered_at_ms);
        }
        try_start_next_hand(lobby, sender, table_id).await;
        return;
    }

    lobby.snapshot_and_broadcast(table_id, sender, now_ms(), triggered_at_ms).await;
    if let Some(next_player_id) = next_player_id {
        start_timer_for(lobby, sender, table_id, next_player_id).await;
    }
}

/// Translates a completed showdown into the wire-facing `HandCompleted`
/// message, pairing each winner's award with their revealed cards (if
/// any — a mucked winner of an uncontested pot never had cards added
/// to `shown_cards`) and hand description.
fn broadcast_hand_completed(
    lobby: &Lobby,
    table_id: TableId,
    hand_number: u64,
    showdown: &ShowdownOutcome,
    shown_cards: &HashMap<PlayerId, Vec<Card>>,
) {
    let result = &showdown.result;
    let winners: Vec<WinnerInfo> = result
        .awarded
        .iter()
        .map(|(player_id, amount)| WinnerInfo {
            player_id: *player_id,
            amount: *amount,
            shown_cards: shown_cards.get(player_id).cloned(),
            hand_description: result.hand_descriptions.get(player_id).cloned(),
        })
        .collect();
    let final_pot = result.awarded.values().sum();
    let broadcaster = Broadcaster::new(&lobby.connections, &lobby.outbox);
    broadcaster.broadcast_to_table(table_id, ServerMessage::HandCompleted { table_id, hand_number, winners, final_pot });
}

/// Best-effort: asks the table to begin its next hand (ordinary or
/// bomb pot, per `TableState::start_next_hand`'s own schedule check).
/// A "need at least two active players" rejection is the expected,
/// silent outcome between hands with only one player seated; the next
/// `enter` or completed hand retries it.
async fn try_start_next_hand(lobby: &Lobby, sender: &mpsc::UnboundedSender<Command>, table_id: TableId) {
    let now = now_ms();
    let (tx, rx) = oneshot::channel();
    if sender.send(Command::StartNewHand { now_ms: now, reply: tx }).is_err() {
        return;
    }
    let Ok(Ok(())) = rx.await else { return };

    let Some(snapshot) = lobby.snapshot(sender).await else { return };
    let broadcaster = Broadcaster::new(&lobby.connections, &lobby.outbox);
    broadcaster.broadcast_hand_started(&snapshot.table, &snapshot.shown_cards, now);

    if let Some(next_player_id) = snapshot.table.current_hand.as_ref().and_then(|h| h.current_player_id) {
        start_timer_for(lobby, sender, table_id, next_player_id).await;
    }
}

/// Announces whose turn it is and starts (or leaves disabled, per
/// `action_timer_seconds == 0`) their countdown.
async fn start_timer_for(lobby: &Lobby, sender: &mpsc::UnboundedSender<Command>, table_id: TableId, player_id: PlayerId) {
    let Some(snapshot) = lobby.snapshot(sender).await else { return };
    let config = snapshot.table.config;
    let time_bank_remaining = snapshot.table.player(player_id).map(|p| p.time_bank_seconds).unwrap_or(0);

    let broadcaster = Broadcaster::new(&lobby.connections, &lobby.outbox);
    broadcaster.broadcast_to_table(
        table_id,
        ServerMessage::ActionRequired { player_id, timeout_seconds: config.action_timer_seconds },
    );

    if lobby.start_timer(table_id, player_id, config.action_timer_seconds, config.time_bank_enabled, time_bank_remaining) {
        broadcaster.broadcast_to_table(
            table_id,
            ServerMessage::TimerStarted { player_id, total_seconds: config.action_timer_seconds, time_bank_available: time_bank_remaining },
        );
    }
}

/// Maps one `ActionTimer` tick's broadcasts onto the wire protocol.
fn broadcast_timer_event(lobby: &Lobby, table_id: TableId, event: poker_engine::timer::TimerBroadcast) {
    let broadcaster = Broadcaster::new(&lobby.connections, &lobby.outbox);
    let message = match event.kind {
        TimerTickKind::Tick => ServerMessage::TimerTick {
            player_id: event.player,
            remaining_seconds: event.remaining_seconds,
            is_time_bank_active: event.is_time_bank_active,
            time_bank_remaining: event.time_bank_remaining,
        },
        TimerTickKind::Warning => ServerMessage::TimerWarning { player_id: event.player, remaining_seconds: event.remaining_seconds },
        TimerTickKind::TimeBankActivated => ServerMessage::TimeBankActivated {
            player_id: event.player,
            time_bank_seconds_added: event.time_bank_remaining,
            time_bank_remaining: event.time_bank_remaining,
        },
        TimerTickKind::Expired => ServerMessage::TimerExpired { player_id: event.player },
    };
    broadcaster.broadcast_to_table(table_id, message);
}

/// Ticks the one active countdown for `table_id` once a second for as
/// long as its actor is alive, translating expiry into a forced fold
/// through the same `handle_outcome` path a client-submitted action
/// takes. Exits once the table's sender is gone (the actor dropped).
async fn run_timer_loop(lobby: web::Data<Lobby>, table_id: TableId) {
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(1));
    loop {
        interval.tick().await;
        let Some(sender) = lobby.sender(table_id) else { break };

        let tick_result = {
            let mut timers = lobby.timers.write().expect("timer lock poisoned");
            let Some(slot) = timers.get_mut(&table_id) else { continue };
            let Some(timer) = slot.get_mut() else { continue };
            let (events, done) = timer.tick();
            let player_id = timer.player();
            let consumed = timer.time_bank_consumed();
            if done {
                slot.remove();
            }
            (events, done, player_id, consumed)
        };
        let (events, done, player_id, consumed) = tick_result;
        for event in events {
            broadcast_timer_event(&lobby, table_id, event);
        }
        if !done {
            continue;
        }

        let now = now_ms();
        let (tx, rx) = oneshot::channel();
        if sender.send(Command::ForceTimeoutFold { player_id, time_bank_consumed: consumed, now_ms: now, reply: tx }).is_err() {
            continue;
        }
        if let Ok(Ok(outcome)) = rx.await {
            handle_outcome(&lobby, &sender, table_id, now, now, outcome).await;
        }
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    poker_engine::init_logging();
    let lobby = web::Data::new(Lobby::default());
    log::info!("starting hosting server");
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(Cors::default().allow_any_origin().allow_any_method().allow_any_header())
            .app_data(lobby.clone())
            .app_data(web::JsonConfig::default())
            .route("/tables", web::post().to(create_table))
            .route("/tables/{table_id}/enter", web::get().to(enter))
    })
    .workers(4)
    .bind(std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()))?
    .run()
    .await
}
