//! TCP server for the observation adapter
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, info, warn};

use crate::protocol::*;
use crate::runtime::{InboundCommand, InboundPayload, OutboundMessage};

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Bound on queued commands before clients get `backpressure` errors
    pub max_pending_commands: usize,
    pub disabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            max_pending_commands: 16,
            disabled: false,
        }
    }
}

impl ServerConfig {
    /// Overlay `BALANCE_ADAPTER_*` environment variables on the defaults.
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("BALANCE_ADAPTER_HOST")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = env::var("BALANCE_ADAPTER_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_commands = env::var("BALANCE_ADAPTER_MAX_PENDING")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.max_pending_commands);
        let disabled = env::var("BALANCE_ADAPTER_DISABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            host,
            port,
            max_pending_commands,
            disabled,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid adapter address {}:{}", self.host, self.port))
    }
}

/// Live connection counters, shared with the game loop for the status panel.
#[derive(Debug, Default)]
pub struct ServerStatus {
    clients: AtomicUsize,
    streaming: AtomicUsize,
}

impl ServerStatus {
    pub fn client_count(&self) -> usize {
        self.clients.load(Ordering::Relaxed)
    }

    pub fn streaming_count(&self) -> usize {
        self.streaming.load(Ordering::Relaxed)
    }
}

/// Handle to a connected client
struct ClientHandle {
    id: usize,
    stream_observations: bool,
    handshaken: bool,
    last_seq: Option<u64>,
    /// Serialized lines for this client's writer task
    tx: mpsc::UnboundedSender<String>,
}

struct ServerState {
    layout: LayoutInfo,
    clients: RwLock<Vec<ClientHandle>>,
    status: Arc<ServerStatus>,
}

impl ServerState {
    async fn send_to(&self, client_id: usize, line: String) {
        let clients = self.clients.read().await;
        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
            let _ = c.tx.send(line);
        }
    }

    async fn broadcast(&self, line: String) {
        let clients = self.clients.read().await;
        for c in clients.iter().filter(|c| c.stream_observations) {
            let _ = c.tx.send(line.clone());
        }
    }

    async fn is_handshaken(&self, client_id: usize) -> bool {
        let clients = self.clients.read().await;
        clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| c.handshaken)
            .unwrap_or(false)
    }

    /// Record `seq` if it is strictly greater than the last one seen.
    async fn check_and_update_seq(&self, client_id: usize, seq: u64) -> bool {
        let mut clients = self.clients.write().await;
        let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
            return true;
        };
        match client.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                client.last_seq = Some(seq);
                true
            }
        }
    }
}

fn to_line<T: serde::Serialize>(msg: &T) -> Option<String> {
    match serde_json::to_string(msg) {
        Ok(line) => Some(line),
        Err(e) => {
            warn!(error = %e, "failed to serialize adapter message");
            None
        }
    }
}

/// Start the TCP server
///
/// `ready_tx` receives the bound address once the listener is up, which lets
/// callers bind port 0.
pub async fn run_server(
    config: ServerConfig,
    layout: LayoutInfo,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    status: Arc<ServerStatus>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding adapter to {addr}"))?;
    let bound = listener.local_addr()?;
    info!(addr = %bound, "adapter listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState {
        layout,
        clients: RwLock::new(Vec::new()),
        status,
    });

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                match msg {
                    OutboundMessage::Ack { client_id, ack } => {
                        if let Some(line) = to_line(&ack) {
                            state.send_to(client_id, line).await;
                        }
                    }
                    OutboundMessage::Observation { client_id, obs } => {
                        if let Some(line) = to_line(&obs) {
                            state.send_to(client_id, line).await;
                        }
                    }
                    OutboundMessage::BroadcastObservation { obs } => {
                        if let Some(line) = to_line(&obs) {
                            state.broadcast(line).await;
                        }
                    }
                }
            }
        });
    }

    let mut client_id_counter = 0usize;
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        info!(client_id, %addr, "client connected");

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, client_id, Arc::clone(&state), command_tx).await {
                warn!(client_id, error = %e, "client error");
            }
            remove_client(&state, client_id).await;
            info!(client_id, "client disconnected");
        });
    }
}

async fn remove_client(state: &ServerState, client_id: usize) {
    let mut clients = state.clients.write().await;
    if let Some(pos) = clients.iter().position(|c| c.id == client_id) {
        let client = clients.remove(pos);
        state.status.clients.fetch_sub(1, Ordering::Relaxed);
        if client.stream_observations {
            state.status.streaming.fetch_sub(1, Ordering::Relaxed);
        }
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    client_id: usize,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    {
        let mut clients = state.clients.write().await;
        clients.push(ClientHandle {
            id: client_id,
            stream_observations: false,
            handshaken: false,
            last_seq: None,
            tx: tx.clone(),
        });
        state.status.clients.fetch_add(1, Ordering::Relaxed);
    }

    let write_task = tokio::spawn(async move {
        while let Some(mut line) = rx.recv().await {
            line.push('\n');
            if writer.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
    });

    let reply_error = |seq: u64, code: ErrorCode, message: &str| {
        if let Some(line) = to_line(&create_error(seq, code, message)) {
            let _ = tx.send(line);
        }
    };

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_message(trimmed) {
            Ok(ClientMessage::Hello(hello)) => {
                if state.is_handshaken(client_id).await
                    && !state.check_and_update_seq(client_id, hello.seq).await
                {
                    reply_error(hello.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }
                if !same_major(&hello.protocol_version) {
                    reply_error(
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("protocol version {} not supported", hello.protocol_version),
                    );
                    break;
                }

                {
                    let mut clients = state.clients.write().await;
                    if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                        client.handshaken = true;
                        client.last_seq = Some(hello.seq);
                        if hello.stream_observations != client.stream_observations {
                            if hello.stream_observations {
                                state.status.streaming.fetch_add(1, Ordering::Relaxed);
                            } else {
                                state.status.streaming.fetch_sub(1, Ordering::Relaxed);
                            }
                            client.stream_observations = hello.stream_observations;
                        }
                    }
                }
                debug!(client_id, name = %hello.client.name, "handshake");

                if let Some(line) = to_line(&create_welcome(hello.seq, client_id, state.layout)) {
                    let _ = tx.send(line);
                }
                if hello.stream_observations {
                    let _ = command_tx.try_send(InboundCommand {
                        client_id,
                        seq: hello.seq,
                        payload: InboundPayload::SnapshotRequest,
                    });
                }
            }

            Ok(ClientMessage::Command(cmd)) => {
                if !state.is_handshaken(client_id).await {
                    reply_error(cmd.seq, ErrorCode::HandshakeRequired, "send hello before command");
                    continue;
                }
                if !state.check_and_update_seq(client_id, cmd.seq).await {
                    reply_error(cmd.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }
                let intents = match cmd.parse_intents() {
                    Ok(intents) => intents,
                    Err(name) => {
                        reply_error(cmd.seq, ErrorCode::InvalidCommand, &format!("unknown intent: {name}"));
                        continue;
                    }
                };

                // Ack is sent by the game loop once the intents are applied.
                if command_tx
                    .try_send(InboundCommand {
                        client_id,
                        seq: cmd.seq,
                        payload: InboundPayload::Intents(intents),
                    })
                    .is_err()
                {
                    reply_error(cmd.seq, ErrorCode::Backpressure, "command queue is full");
                }
            }

            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                reply_error(seq, ErrorCode::ParseError, &e.to_string());
            }
        }
    }

    drop(reply_error);
    drop(tx);
    remove_client(&state, client_id).await;
    let _ = write_task.await;
    Ok(())
}

fn same_major(version: &str) -> bool {
    version.split('.').next() == PROTOCOL_VERSION.split('.').next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 7878);
        assert!(!config.disabled);
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:7878");
    }

    #[test]
    fn bad_host_is_an_error() {
        let config = ServerConfig {
            host: "not an address".into(),
            ..ServerConfig::default()
        };
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn protocol_major_must_match() {
        assert!(same_major("1.0.0"));
        assert!(same_major("1.4"));
        assert!(!same_major("2.0.0"));
        assert!(!same_major(""));
    }
}
