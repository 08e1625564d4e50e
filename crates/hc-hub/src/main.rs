// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! harmonycode-server: the thin binary that wires the Connection Hub's
//! WebSocket accept loop to the rest of the workspace's crates. The CLI
//! front-end that consumes this wire protocol is out of scope here —
//! this binary only starts the server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use clap::Parser;
use futures::{Sink, SinkExt, StreamExt};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hc_core::{AgentId, SessionId};
use hc_hub::dispatch::{self, Outbound, Recipient, SessionCtx};
use hc_hub::hub::LiveSession;
use hc_hub::protocol::{ClientFrame, ServerFrame};
use hc_hub::queue::OutboundQueue;
use hc_hub::state::HubState;
use hc_storage::{Config, Workspace};

/// Background sweep/timeout tick interval; snapshot interval is
/// derived from the same cadence rather than a separate timer.
const SNAPSHOT_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Parser)]
#[command(name = "harmonycode-server", version, about = "HarmonyCode collaboration hub server")]
struct Args {
    /// Workspace root; state is persisted under <root>/.harmonycode/.
    #[arg(short = 'C', long, default_value = ".")]
    workspace: PathBuf,

    /// Address to bind the WebSocket listener on.
    #[arg(long, default_value = "127.0.0.1:8787")]
    bind: SocketAddr,

    /// Default `tracing` filter directive, overridden by `RUST_LOG` if set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level.clone())))
        .init();

    let workspace = Workspace::new(args.workspace);
    let config = Config::load(&workspace.config_path())?;

    let state = Arc::new(HubState::new(workspace, config));

    let _sweeper = hc_locks::spawn_sweeper(state.engine.locks().clone(), Duration::from_secs(state.config.lock_sweep_interval_secs), |expired| {
        info!(count = expired.len(), "swept expired task locks");
    });

    let timeout_state = state.clone();
    let _timeout_checker = hc_orchestration::spawn_timeout_checker(state.engine.clone(), Duration::from_secs(1), move |events| {
        for event in events {
            if let Some(frame) = dispatch::event_to_frame(event) {
                timeout_state.hub.broadcast(frame);
            }
        }
    });

    let snapshot_state = state.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SNAPSHOT_INTERVAL);
        loop {
            ticker.tick().await;
            snapshot_state.engine.save_snapshot();
        }
    });

    let app = Router::new().route("/ws", get(ws_upgrade)).with_state(state.clone());

    info!(bind = %args.bind, "starting harmonycode-server");
    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    state.engine.save_snapshot();
    info!("shutdown complete, final snapshot written");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler, falling back to ctrl-c only");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<HubState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

/// Drive one WebSocket connection end to end: the first frame must be
/// `auth`; everything after is dispatched against the shared
/// [`HubState`] until the socket closes or the session is evicted.
async fn handle_connection(socket: WebSocket, state: Arc<HubState>) {
    let (mut sink, mut stream) = socket.split();

    let first = match stream.next().await {
        Some(Ok(Message::Text(text))) => text,
        _ => return,
    };
    let Ok(ClientFrame::Auth { display_name, auth_token, role, perspective, new_agent }) = serde_json::from_str(&first) else {
        let _ = send_frame(&mut sink, &ServerFrame::AuthFailed { reason: "first frame must be auth".into() }).await;
        return;
    };

    let now_ms = state.now_ms();
    let outcome = state.identities.authenticate(
        hc_identity::AuthRequest { display_name, auth_token, role: role.clone(), perspective, new_agent },
        now_ms,
    );
    let identity = match outcome {
        Ok(outcome) => {
            let _ = send_frame(
                &mut sink,
                &ServerFrame::AuthSuccess {
                    agent_id: outcome.identity.agent_id.clone(),
                    auth_token: outcome.issued_token,
                    is_returning: outcome.is_returning,
                    total_sessions: outcome.identity.total_sessions,
                    total_contributions: outcome.identity.total_contributions,
                    last_seen: outcome.identity.last_seen_ms,
                },
            )
            .await;
            outcome.identity
        }
        Err(e) => {
            let err: hc_core::HubError = e.into();
            let _ = send_frame(&mut sink, &ServerFrame::AuthFailed { reason: err.to_string() }).await;
            return;
        }
    };

    let agent_id = identity.agent_id.clone();
    let session_id = SessionId::new(format!("sess-{}", hc_core::short_random()));

    if state.engine.get_agent(&agent_id).is_none() {
        state.engine.register_agent(agent_id.clone(), role);
    }
    if state.diversity.tracker().perspective_of(&agent_id).is_none() {
        state.diversity.tracker().assign_new_agent(agent_id.clone(), identity.perspective);
    }

    let queue = Arc::new(OutboundQueue::new(state.config.outbound_queue_capacity));
    let writer_queue = queue.clone();
    let writer = tokio::spawn(async move {
        loop {
            let frame = writer_queue.pop().await;
            if send_frame(&mut sink, &frame).await.is_err() {
                break;
            }
        }
    });

    let evicted = state.hub.register(agent_id.clone(), LiveSession::new(session_id.clone(), queue, vec![writer.abort_handle()]));
    if evicted.is_some() {
        info!(agent_id = %agent_id, "evicted prior session for reconnecting agent");
    }
    state.hub.broadcast_except(&agent_id, ServerFrame::SessionJoined { agent_id: agent_id.clone(), display_name: identity.display_name.clone() });

    let ctx = SessionCtx { session_id: session_id.clone(), agent_id: agent_id.clone() };
    while let Some(message) = stream.next().await {
        let Ok(Message::Text(text)) = message else { continue };
        let Ok(frame) = serde_json::from_str::<ClientFrame>(&text) else { continue };
        let outbound = dispatch::handle(&state, &ctx, frame);
        deliver(&state, &agent_id, outbound);
    }

    finish_session(&state, &agent_id, &session_id);
}

async fn send_frame<S>(sink: &mut S, frame: &ServerFrame) -> Result<(), ()>
where
    S: Sink<Message> + Unpin,
{
    let Ok(text) = serde_json::to_string(frame) else { return Err(()) };
    sink.send(Message::Text(text)).await.map_err(|_| ())
}

/// Route each dispatcher output to its recipient, force-closing any
/// session whose queue overflowed per the `SLOW_CONSUMER` policy.
fn deliver(state: &Arc<HubState>, caller: &AgentId, outbound: Vec<Outbound>) {
    for Outbound { to, frame } in outbound {
        let overflowed = match to {
            Recipient::Caller => state.hub.send_to(caller, frame).into_iter().collect(),
            Recipient::Agent(agent_id) => state.hub.send_to(&agent_id, frame).into_iter().collect(),
            Recipient::Broadcast => state.hub.broadcast(frame),
            Recipient::BroadcastExcept(exclude) => state.hub.broadcast_except(&exclude, frame),
        };
        for agent_id in overflowed {
            warn!(agent_id = %agent_id, "outbound queue overflowed, closing session");
            state.hub.force_close(&agent_id);
        }
    }
}

/// Clean up after a connection ends, whether by client disconnect or
/// forced slow-consumer closure: revert its in-progress tasks and
/// notify the rest of the workspace.
fn finish_session(state: &Arc<HubState>, agent_id: &AgentId, session_id: &SessionId) {
    if !state.hub.remove_if(agent_id, session_id) {
        return;
    }
    let events = state.engine.handle_agent_disconnect(agent_id);
    for event in events {
        if let Some(frame) = dispatch::event_to_frame(event) {
            state.hub.broadcast(frame);
        }
    }
}
