use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;
use echo_crawler::config::{load_options, parse_weapon};
use echo_crawler::constants::TICK_MS;
use echo_crawler::engine::{GameEngine, GameEngineOptions};
use echo_crawler::error::HostError;
use echo_crawler::logging::{emit_log, log_runtime_event, LogLevel};
use echo_crawler::protocol::{parse_client_message, ParsedClientMessage};
use echo_crawler::types::InputSnapshot;
use futures_util::{SinkExt, StreamExt};
use rand::Rng;
use serde_json::{json, Value};
use tokio::sync::{mpsc, Mutex};
use tower_http::services::{ServeDir, ServeFile};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

const SERVER_LOG_ID: &str = "server";
const OUTBOUND_QUEUE: usize = 256;

type SharedState = Arc<Mutex<ServerState>>;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    port: Option<u16>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long)]
    weapon: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum QueuePolicy {
    DropOnFull,
    DisconnectOnFull,
}

struct Session {
    tx: mpsc::Sender<String>,
    engine: GameEngine,
    input: InputSnapshot,
}

struct ServerState {
    base_options: GameEngineOptions,
    fixed_seed: Option<u32>,
    sessions: HashMap<String, Session>,
}

impl ServerState {
    fn new(base_options: GameEngineOptions, fixed_seed: Option<u32>) -> Self {
        Self {
            base_options,
            fixed_seed,
            sessions: HashMap::new(),
        }
    }

    fn session_options(&self) -> GameEngineOptions {
        GameEngineOptions {
            seed: self
                .fixed_seed
                .unwrap_or_else(|| rand::rng().random::<u32>()),
            ..self.base_options.clone()
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            emit_log(
                LogLevel::Error,
                "server_failed",
                SERVER_LOG_ID,
                None,
                None,
                json!({ "error": error.to_string() }),
            );
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), HostError> {
    let port = cli
        .port
        .or_else(|| {
            std::env::var("PORT")
                .ok()
                .and_then(|value| value.parse::<u16>().ok())
        })
        .unwrap_or(8080);
    let base_options = resolve_options(&cli)?;
    let fixed_seed = cli.seed.or_else(|| {
        std::env::var("SEED")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
    });

    let state = Arc::new(Mutex::new(ServerState::new(base_options, fixed_seed)));
    start_tick_loop(state.clone());

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/ws", get(ws_handler))
        .with_state(state);

    let app = if let Some(static_dir) = resolve_static_dir() {
        let index_file = static_dir.join("index.html");
        emit_log(
            LogLevel::Info,
            "static_root",
            SERVER_LOG_ID,
            None,
            None,
            json!({ "path": static_dir.to_string_lossy() }),
        );
        app.fallback_service(
            ServeDir::new(static_dir).not_found_service(ServeFile::new(index_file)),
        )
    } else {
        emit_log(
            LogLevel::Warn,
            "static_root_missing",
            SERVER_LOG_ID,
            None,
            None,
            json!({ "hint": "set STATIC_DIR to a directory containing index.html" }),
        );
        app
    };

    let bind_addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|source| HostError::Bind {
            addr: bind_addr.clone(),
            source,
        })?;

    emit_log(
        LogLevel::Info,
        "listening",
        SERVER_LOG_ID,
        fixed_seed,
        None,
        json!({ "addr": bind_addr }),
    );
    axum::serve(listener, app).await.map_err(HostError::Serve)
}

fn resolve_options(cli: &Cli) -> Result<GameEngineOptions, HostError> {
    let config_path = cli
        .config
        .clone()
        .or_else(|| std::env::var("CONFIG_PATH").ok().map(PathBuf::from));
    let mut options = match config_path {
        Some(path) => load_options(&path)?,
        None => GameEngineOptions::default(),
    };
    if let Some(raw) = cli.weapon.as_deref() {
        options.starting_weapon = parse_weapon(raw)?;
    }
    Ok(options)
}

fn resolve_static_dir() -> Option<PathBuf> {
    if let Ok(raw) = std::env::var("STATIC_DIR") {
        let path = PathBuf::from(raw);
        if path.join("index.html").is_file() {
            return Some(path);
        }
    }

    let candidates = [PathBuf::from("dist"), PathBuf::from("static")];
    candidates
        .into_iter()
        .find(|path| path.join("index.html").is_file())
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: SharedState, socket: WebSocket) {
    let client_id = make_id("client");
    let (tx, mut rx) = mpsc::channel::<String>(OUTBOUND_QUEUE);

    {
        let mut guard = state.lock().await;
        let options = guard.session_options();
        let seed = options.seed;
        guard.sessions.insert(
            client_id.clone(),
            Session {
                tx: tx.clone(),
                engine: GameEngine::new(options),
                input: InputSnapshot::default(),
            },
        );
        emit_log(
            LogLevel::Info,
            "session_started",
            &client_id,
            Some(seed),
            None,
            json!({}),
        );
        send_state(&mut guard, &client_id, QueuePolicy::DisconnectOnFull);
    }

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let writer = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if ws_sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(received) = ws_receiver.next().await {
        let Ok(message) = received else {
            break;
        };

        match message {
            Message::Text(raw) => {
                handle_client_message(&state, &client_id, raw.as_str()).await;
            }
            Message::Binary(raw) => {
                if let Ok(text) = std::str::from_utf8(&raw) {
                    handle_client_message(&state, &client_id, text).await;
                } else {
                    send_error_to_client(&state, &client_id, "invalid utf8 message").await;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    {
        let mut guard = state.lock().await;
        disconnect_session(&mut guard, &client_id);
    }
    drop(tx);
    let _ = writer.await;
}

async fn handle_client_message(state: &SharedState, client_id: &str, raw: &str) {
    let Some(message) = parse_client_message(raw) else {
        send_error_to_client(state, client_id, "invalid message").await;
        return;
    };

    let mut guard = state.lock().await;
    let Some(session) = guard.sessions.get_mut(client_id) else {
        return;
    };
    match message {
        ParsedClientMessage::Ping { t } => {
            send_to_client(
                &mut guard,
                client_id,
                &json!({
                    "type": "pong",
                    "t": t,
                }),
                QueuePolicy::DisconnectOnFull,
            );
        }
        message @ ParsedClientMessage::Input { .. } => {
            if let Some(input) = message.into_input() {
                session.input = input;
            }
        }
        ParsedClientMessage::SelectUpgrade { item } => {
            session.engine.select_upgrade(item);
            send_state(&mut guard, client_id, QueuePolicy::DisconnectOnFull);
        }
        ParsedClientMessage::TogglePause => {
            session.engine.toggle_pause();
            send_state(&mut guard, client_id, QueuePolicy::DisconnectOnFull);
        }
        ParsedClientMessage::Restart => {
            session.engine.restart();
            session.input = InputSnapshot::default();
            let seed = session.engine.options().seed;
            emit_log(
                LogLevel::Info,
                "session_restarted",
                client_id,
                Some(seed),
                None,
                json!({}),
            );
            send_state(&mut guard, client_id, QueuePolicy::DisconnectOnFull);
        }
    }
}

fn start_tick_loop(state: SharedState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(TICK_MS));
        loop {
            interval.tick().await;
            let mut guard = state.lock().await;
            tick_sessions(&mut guard);
        }
    });
}

fn tick_sessions(state: &mut ServerState) {
    let client_ids: Vec<String> = state.sessions.keys().cloned().collect();
    for client_id in client_ids {
        let Some(session) = state.sessions.get_mut(&client_id) else {
            continue;
        };
        let input = session.input.clone();
        session.engine.step(&input);
        send_state(state, &client_id, QueuePolicy::DropOnFull);
    }
}

fn send_state(state: &mut ServerState, client_id: &str, policy: QueuePolicy) {
    let Some(session) = state.sessions.get_mut(client_id) else {
        return;
    };
    let snapshot = session.engine.build_snapshot(true);
    let hud = session.engine.build_hud();
    let seed = session.engine.options().seed;
    for event in &snapshot.events {
        log_runtime_event(client_id, seed, snapshot.tick, event);
    }
    let message = json!({
        "type": "state",
        "snapshot": snapshot,
        "hud": hud,
    });
    send_to_client(state, client_id, &message, policy);
}

fn send_to_client(state: &mut ServerState, client_id: &str, message: &Value, policy: QueuePolicy) {
    let send_failed = if let Some(session) = state.sessions.get(client_id) {
        session.tx.try_send(message.to_string()).is_err()
    } else {
        false
    };
    if send_failed && policy == QueuePolicy::DisconnectOnFull {
        disconnect_session(state, client_id);
    }
}

async fn send_error_to_client(state: &SharedState, client_id: &str, message: &str) {
    let mut guard = state.lock().await;
    send_to_client(
        &mut guard,
        client_id,
        &json!({
            "type": "error",
            "message": message,
        }),
        QueuePolicy::DisconnectOnFull,
    );
}

fn disconnect_session(state: &mut ServerState, client_id: &str) {
    let Some(session) = state.sessions.remove(client_id) else {
        return;
    };
    let stats = session.engine.run_stats();
    emit_log(
        LogLevel::Info,
        "session_closed",
        client_id,
        Some(session.engine.options().seed),
        Some(session.engine.tick()),
        json!({
            "floor": session.engine.floor(),
            "level": session.engine.player().level,
            "gameOver": session.engine.is_game_over(),
            "stats": stats,
        }),
    );
}

fn make_id(prefix: &str) -> String {
    let seq = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}_{seq}")
}
