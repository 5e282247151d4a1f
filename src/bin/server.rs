use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use zocats::config::ServerConfig;
use zocats::engine::{GameBoard, GameBoardOptions};
use zocats::server_protocol::{parse_client_message, ParsedClientMessage};
use zocats::types::{Direction, Screen, TurnReport, Vec2};
use zocats::world::load_descriptions;

const OUTBOUND_QUEUE: usize = 256;
const SIGNAL_QUEUE: usize = 64;

#[derive(Debug)]
enum SessionSignal {
    Description {
        session_id: String,
        pos: Vec2,
        text: String,
    },
    Transition {
        session_id: String,
        screen: Screen,
    },
}

struct ConnectionSession {
    config: Arc<ServerConfig>,
    tx: mpsc::Sender<String>,
    signals: mpsc::Sender<SessionSignal>,
    screen: Screen,
    board: Option<GameBoard>,
    input_attached: bool,
}

impl ConnectionSession {
    fn new(
        config: Arc<ServerConfig>,
        tx: mpsc::Sender<String>,
        signals: mpsc::Sender<SessionSignal>,
    ) -> Self {
        Self {
            config,
            tx,
            signals,
            screen: Screen::Start,
            board: None,
            input_attached: false,
        }
    }

    fn send(&self, message: &Value) {
        if let Err(error) = self.tx.try_send(message.to_string()) {
            warn!(%error, "outbound message dropped");
        }
    }

    fn send_screen(&self) {
        self.send(&json!({
            "type": "screen",
            "screen": self.screen,
        }));
    }

    fn send_state(&self, report: Option<&TurnReport>) {
        let Some(board) = self.board.as_ref() else {
            return;
        };
        let events = report.map(|report| report.events.clone()).unwrap_or_default();
        self.send(&json!({
            "type": "state",
            "snapshot": board.build_snapshot(),
            "events": events,
        }));
    }

    fn handle_raw(&mut self, raw: &str) {
        let Some(message) = parse_client_message(raw) else {
            self.send(&json!({
                "type": "error",
                "message": "invalid message",
            }));
            return;
        };
        self.handle_message(message);
    }

    fn handle_message(&mut self, message: ParsedClientMessage) {
        match message {
            ParsedClientMessage::Start => self.start_game(),
            ParsedClientMessage::Ping { t } => self.send(&json!({
                "type": "pong",
                "t": t,
            })),
            key @ ParsedClientMessage::Key { .. } => self.handle_move(key.direction()),
        }
    }

    fn start_game(&mut self) {
        if self.screen == Screen::Game {
            self.send(&json!({
                "type": "error",
                "message": "game already running",
            }));
            return;
        }

        let board = GameBoard::new(rand::random::<u32>(), GameBoardOptions::default());
        let session_id = board.session_id.clone();
        let (width, height) = (board.map.width, board.map.height);
        self.board = Some(board);
        self.screen = Screen::Game;
        self.input_attached = true;

        self.send_screen();
        self.send(&json!({
            "type": "welcome",
            "sessionId": session_id,
            "startedAt": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }));
        self.send_state(None);

        let root = self.config.resource_dir.clone();
        let signals = self.signals.clone();
        tokio::spawn(async move {
            for (pos, text) in load_descriptions(&root, width, height).await {
                let signal = SessionSignal::Description {
                    session_id: session_id.clone(),
                    pos,
                    text,
                };
                if signals.send(signal).await.is_err() {
                    break;
                }
            }
        });
    }

    fn handle_move(&mut self, direction: Option<Direction>) {
        if !self.input_attached {
            return;
        }
        let Some(board) = self.board.as_mut() else {
            return;
        };
        let report = board.move_player(direction);
        let session_id = board.session_id.clone();
        if !report.moved {
            return;
        }

        for (cue, url) in report.sounds() {
            self.send(&json!({
                "type": "sound",
                "cue": cue,
                "url": url,
            }));
        }
        self.send_state(Some(&report));

        let Some(terminal) = report.terminal else {
            return;
        };
        self.input_attached = false;
        let screen = terminal.next_screen();
        let delay = Duration::from_millis(self.config.terminal_delay_ms);
        let signals = self.signals.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(error) = signals
                .send(SessionSignal::Transition { session_id, screen })
                .await
            {
                debug!(%error, "terminal transition dropped; connection closed");
            }
        });
    }

    fn handle_signal(&mut self, signal: SessionSignal) {
        match signal {
            SessionSignal::Description {
                session_id,
                pos,
                text,
            } => {
                let Some(board) = self.board.as_mut() else {
                    return;
                };
                if board.session_id != session_id {
                    return;
                }
                board.set_description(pos, text);
                if board.player_position() == pos {
                    self.send_state(None);
                }
            }
            SessionSignal::Transition { session_id, screen } => {
                let matches = self
                    .board
                    .as_ref()
                    .map(|board| board.session_id == session_id)
                    .unwrap_or(false);
                if !matches {
                    return;
                }
                info!(%session_id, ?screen, "session finished");
                self.board = None;
                self.screen = screen;
                self.send_screen();
            }
        }
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Arc::new(ServerConfig::from_env());

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/ws", get(ws_handler))
        .nest_service("/resources", ServeDir::new(&config.resource_dir))
        .with_state(config.clone());

    let app = if let Some(static_dir) = config.static_dir.clone() {
        let index_file = static_dir.join("index.html");
        info!(root = %static_dir.to_string_lossy(), "serving static client");
        app.fallback_service(
            ServeDir::new(static_dir).not_found_service(ServeFile::new(index_file)),
        )
    } else {
        warn!("static client root not found; only /ws and /resources are served");
        app
    };

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(port = config.port, resources = %config.resource_dir.to_string_lossy(), "listening");
    axum::serve(listener, app).await
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(config): State<Arc<ServerConfig>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(config, socket))
}

async fn handle_socket(config: Arc<ServerConfig>, socket: WebSocket) {
    let (tx, mut rx) = mpsc::channel::<String>(OUTBOUND_QUEUE);
    let (signal_tx, mut signal_rx) = mpsc::channel::<SessionSignal>(SIGNAL_QUEUE);

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let writer = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if ws_sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    let mut session = ConnectionSession::new(config, tx, signal_tx);
    session.send_screen();
    debug!("client connected");

    loop {
        tokio::select! {
            received = ws_receiver.next() => {
                let Some(Ok(message)) = received else {
                    break;
                };
                match message {
                    Message::Text(raw) => session.handle_raw(raw.as_str()),
                    Message::Binary(raw) => match String::from_utf8(raw.to_vec()) {
                        Ok(text) => session.handle_raw(&text),
                        Err(_) => session.send(&json!({
                            "type": "error",
                            "message": "invalid utf8 message",
                        })),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(signal) = signal_rx.recv() => session.handle_signal(signal),
        }
    }

    debug!("client disconnected");
    drop(session);
    let _ = writer.await;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_session(delay_ms: u64) -> (
        ConnectionSession,
        mpsc::Receiver<String>,
        mpsc::Receiver<SessionSignal>,
    ) {
        let config = Arc::new(ServerConfig {
            terminal_delay_ms: delay_ms,
            resource_dir: std::env::temp_dir().join("zocats-server-test-missing"),
            ..ServerConfig::default()
        });
        let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE);
        let (signal_tx, signal_rx) = mpsc::channel(SIGNAL_QUEUE);
        (ConnectionSession::new(config, tx, signal_tx), rx, signal_rx)
    }

    fn drain(rx: &mut mpsc::Receiver<String>) -> Vec<Value> {
        let mut out = Vec::new();
        while let Ok(raw) = rx.try_recv() {
            out.push(serde_json::from_str(&raw).expect("outbound messages are json"));
        }
        out
    }

    #[tokio::test]
    async fn start_switches_to_game_screen_and_sends_state() {
        let (mut session, mut rx, _signals) = make_session(0);
        session.handle_raw(r#"{"type":"start"}"#);

        let messages = drain(&mut rx);
        assert_eq!(messages[0]["type"], "screen");
        assert_eq!(messages[0]["screen"], "game");
        assert!(messages.iter().any(|m| m["type"] == "welcome"));
        let state = messages
            .iter()
            .find(|m| m["type"] == "state")
            .expect("state message");
        assert_eq!(state["snapshot"]["player"]["x"], 2);
        assert_eq!(state["snapshot"]["player"]["y"], 1);
        assert!(session.input_attached);
    }

    #[tokio::test]
    async fn second_start_during_game_is_rejected() {
        let (mut session, mut rx, _signals) = make_session(0);
        session.handle_message(ParsedClientMessage::Start);
        drain(&mut rx);
        session.handle_message(ParsedClientMessage::Start);
        let messages = drain(&mut rx);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["type"], "error");
    }

    #[tokio::test]
    async fn keys_before_start_are_ignored() {
        let (mut session, mut rx, _signals) = make_session(0);
        session.handle_raw(r#"{"type":"key","key":"ArrowLeft"}"#);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn valid_key_moves_player_and_publishes_state() {
        let (mut session, mut rx, _signals) = make_session(0);
        session.handle_message(ParsedClientMessage::Start);
        drain(&mut rx);

        session.handle_raw(r#"{"type":"key","key":"ArrowLeft"}"#);
        let messages = drain(&mut rx);
        let state = messages
            .iter()
            .find(|m| m["type"] == "state")
            .expect("state message");
        assert_eq!(state["snapshot"]["player"]["x"], 1);
        assert_eq!(state["snapshot"]["turn"], 1);
    }

    #[tokio::test]
    async fn unmapped_key_sends_nothing() {
        let (mut session, mut rx, _signals) = make_session(0);
        session.handle_message(ParsedClientMessage::Start);
        drain(&mut rx);
        session.handle_raw(r#"{"type":"key","key":"q"}"#);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn terminal_turn_detaches_input_until_transition() {
        let (mut session, mut rx, mut signals) = make_session(0);
        session.handle_message(ParsedClientMessage::Start);
        drain(&mut rx);

        // Walk around until the session ends; the board is random so play both directions.
        let keys = ["ArrowLeft", "ArrowRight", "ArrowUp", "ArrowDown"];
        let mut step = 0usize;
        while session.input_attached && step < 100_000 {
            let key = keys[(step / 3) % keys.len()];
            session.handle_message(ParsedClientMessage::Key {
                key: key.to_string(),
            });
            step += 1;
        }
        assert!(!session.input_attached);
        drain(&mut rx);

        let turn = session
            .board
            .as_ref()
            .map(|board| board.turn())
            .expect("board kept until transition");
        session.handle_message(ParsedClientMessage::Key {
            key: "ArrowLeft".to_string(),
        });
        assert!(drain(&mut rx).is_empty());
        assert_eq!(session.board.as_ref().map(|b| b.turn()), Some(turn));

        loop {
            let signal = signals.recv().await.expect("transition signal");
            if matches!(signal, SessionSignal::Transition { .. }) {
                session.handle_signal(signal);
                break;
            }
        }
        assert!(session.board.is_none());
        assert_ne!(session.screen, Screen::Game);
        let messages = drain(&mut rx);
        assert_eq!(messages.last().map(|m| m["type"].clone()), Some(json!("screen")));

        session.handle_message(ParsedClientMessage::Start);
        assert!(session.input_attached);
        assert_eq!(session.screen, Screen::Game);
    }

    #[tokio::test]
    async fn stale_signals_are_ignored() {
        let (mut session, mut rx, _signals) = make_session(0);
        session.handle_message(ParsedClientMessage::Start);
        drain(&mut rx);

        session.handle_signal(SessionSignal::Transition {
            session_id: "someone-else".to_string(),
            screen: Screen::End,
        });
        assert_eq!(session.screen, Screen::Game);
        assert!(session.board.is_some());
    }

    #[tokio::test]
    async fn description_for_current_cell_republishes_state() {
        let (mut session, mut rx, _signals) = make_session(0);
        session.handle_message(ParsedClientMessage::Start);
        drain(&mut rx);

        let session_id = session
            .board
            .as_ref()
            .map(|board| board.session_id.clone())
            .expect("board present");
        session.handle_signal(SessionSignal::Description {
            session_id,
            pos: Vec2::new(2, 1),
            text: "Monkeykind graveyard".to_string(),
        });
        let messages = drain(&mut rx);
        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages[0]["snapshot"]["location"]["description"],
            "Monkeykind graveyard"
        );
    }

    #[tokio::test]
    async fn ping_echoes_timestamp() {
        let (mut session, mut rx, _signals) = make_session(0);
        session.handle_raw(r#"{"type":"ping","t":12.5}"#);
        let messages = drain(&mut rx);
        assert_eq!(messages[0]["type"], "pong");
        assert_eq!(messages[0]["t"], 12.5);
    }

    #[tokio::test]
    async fn healthz_reports_ok() {
        let response = healthz().await.into_response();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let value: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(value, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn terminal_timer_survives_closed_connection() {
        let (mut session, mut rx, signals) = make_session(0);
        session.handle_message(ParsedClientMessage::Start);
        drop(signals);

        let keys = ["ArrowLeft", "ArrowRight", "ArrowUp", "ArrowDown"];
        let mut step = 0usize;
        while session.input_attached && step < 100_000 {
            let key = keys[(step / 3) % keys.len()];
            session.handle_message(ParsedClientMessage::Key {
                key: key.to_string(),
            });
            step += 1;
        }
        assert!(!session.input_attached);
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(session.screen, Screen::Game);
        assert!(session.board.is_some());
        drain(&mut rx);
    }
}
