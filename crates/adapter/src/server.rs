//! TCP server for the adapter
//!
//! Accepts connections, runs the hello handshake, assigns the controller
//! role, validates commands and forwards them to the game loop. Replies that
//! depend on the game (acks, observations) come back through the outbound
//! channel and are routed to the right client here.

use std::hash::{Hash, Hasher};
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};

use crate::core::snapshot::Fnv1aHasher;
use crate::core::GameSnapshot;
use crate::protocol::*;
use crate::runtime::{AdapterStatus, InboundCommand, InboundPayload, OutboundMessage};
use crate::types::{CoreEvent, DEFAULT_BEST_TIME};

pub const DEFAULT_PORT: u16 = 7788;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    pub max_pending_commands: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands: 10,
        }
    }
}

impl ServerConfig {
    /// Read `MEMORY_ADAPTER_HOST`, `MEMORY_ADAPTER_PORT` and
    /// `MEMORY_ADAPTER_MAX_PENDING`; unset or unparsable values keep defaults.
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("MEMORY_ADAPTER_HOST")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = env::var("MEMORY_ADAPTER_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_commands = env::var("MEMORY_ADAPTER_MAX_PENDING")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.max_pending_commands);

        Self {
            host,
            port,
            protocol_version: defaults.protocol_version,
            max_pending_commands,
        }
    }

    /// Check if the adapter is disabled via environment
    pub fn is_disabled() -> bool {
        std::env::var("MEMORY_ADAPTER_DISABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid adapter address {}:{}", self.host, self.port))
    }
}

/// Handle to a connected client
struct ClientHandle {
    id: usize,
    addr: SocketAddr,
    is_controller: bool,
    /// False when the client asked to observe only.
    wants_control: bool,
    stream_observations: bool,
    handshaken: bool,
    last_seq: Option<u64>,
    tx: mpsc::UnboundedSender<ClientOutbound>,
}

#[derive(Debug, Clone)]
enum ClientOutbound {
    Welcome(WelcomeMessage),
    Ack(AckMessage),
    Error(ErrorMessage),
    Observation(ObservationMessage),
}

/// Shared server state
struct ServerState {
    config: ServerConfig,
    clients: RwLock<Vec<ClientHandle>>,
    controller: RwLock<Option<usize>>,
    status: Arc<AdapterStatus>,
}

impl ServerState {
    async fn is_handshaken(&self, client_id: usize) -> bool {
        let clients = self.clients.read().await;
        clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| c.handshaken)
            .unwrap_or(false)
    }

    async fn is_controller(&self, client_id: usize) -> bool {
        *self.controller.read().await == Some(client_id)
    }

    /// Record `seq` if it is strictly greater than the client's last one.
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

    fn publish_status(&self, clients: &[ClientHandle], controller: Option<usize>) {
        self.status.set_client_count(clients.len());
        self.status.set_controller(controller);
    }
}

/// Start the TCP server
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> Result<()> {
    let status = Arc::new(AdapterStatus::default());
    run_server_with_status(config, status, command_tx, out_rx, ready_tx).await
}

/// Start the TCP server, publishing connection counts into `status`.
pub async fn run_server_with_status(
    config: ServerConfig,
    status: Arc<AdapterStatus>,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding adapter on {}", addr))?;
    let bound = listener.local_addr()?;
    log::info!("adapter listening on {}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState {
        config,
        clients: RwLock::new(Vec::new()),
        controller: RwLock::new(None),
        status,
    });

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let clients = state.clients.read().await;
                let send_to = |client_id: usize, out: ClientOutbound| {
                    if let Some(c) = clients.iter().find(|c| c.id == client_id) {
                        let _ = c.tx.send(out);
                    }
                };
                match msg {
                    OutboundMessage::ToClientAck { client_id, ack } => {
                        send_to(client_id, ClientOutbound::Ack(ack));
                    }
                    OutboundMessage::ToClientError { client_id, err } => {
                        send_to(client_id, ClientOutbound::Error(err));
                    }
                    OutboundMessage::ToClientObservation { client_id, obs } => {
                        send_to(client_id, ClientOutbound::Observation(obs));
                    }
                    OutboundMessage::BroadcastObservation { obs } => {
                        for c in clients.iter().filter(|c| c.handshaken && c.stream_observations) {
                            let _ = c.tx.send(ClientOutbound::Observation(obs.clone()));
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
        log::info!("client {} connected from {}", client_id, addr);

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, addr, client_id, &state, command_tx).await {
                log::warn!("client {} error: {:#}", client_id, e);
            }
            remove_client(&state, client_id).await;
            log::info!("client {} disconnected", client_id);
        });
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    state: &ServerState,
    command_tx: mpsc::Sender<InboundCommand>,
) -> Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);
    let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();

    {
        let controller = state.controller.read().await;
        let mut clients = state.clients.write().await;
        clients.push(ClientHandle {
            id: client_id,
            addr,
            is_controller: false,
            wants_control: true,
            stream_observations: false,
            handshaken: false,
            last_seq: None,
            tx: tx.clone(),
        });
        state.publish_status(&clients, *controller);
    }

    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            buf.clear();
            let encoded = match &msg {
                ClientOutbound::Welcome(m) => serde_json::to_writer(&mut buf, m),
                ClientOutbound::Ack(m) => serde_json::to_writer(&mut buf, m),
                ClientOutbound::Error(m) => serde_json::to_writer(&mut buf, m),
                ClientOutbound::Observation(m) => serde_json::to_writer(&mut buf, m),
            };
            if encoded.is_err() {
                continue;
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() || writer.flush().await.is_err() {
                break;
            }
        }
    });

    let send_error = |seq: u64, code: ErrorCode, message: &str| {
        let _ = tx.send(ClientOutbound::Error(create_error(seq, code, message)));
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
        log::trace!("client {} <- {}", client_id, trimmed);

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                let handshaken = state.is_handshaken(client_id).await;
                if handshaken && !state.check_and_update_seq(client_id, hello.seq).await {
                    send_error(
                        hello.seq,
                        ErrorCode::InvalidCommand,
                        "seq must be strictly increasing",
                    );
                    continue;
                }

                if !is_compatible_version(&hello.protocol_version) {
                    send_error(
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("Protocol version {} not supported", hello.protocol_version),
                    );
                    break;
                }

                let wants_control = hello.requested.role != Some(RequestedRole::Observer);
                let (role, controller_id) = {
                    let mut controller = state.controller.write().await;
                    let mut clients = state.clients.write().await;
                    if controller.is_none() && wants_control {
                        *controller = Some(client_id);
                        log::info!("client {} is now controller", client_id);
                    }
                    if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                        client.handshaken = true;
                        client.last_seq = Some(hello.seq);
                        client.wants_control = wants_control;
                        client.stream_observations = hello.requested.stream_observations;
                        client.is_controller = *controller == Some(client_id);
                    }
                    state.publish_status(&clients, *controller);

                    let role = if *controller == Some(client_id) {
                        AssignedRole::Controller
                    } else {
                        AssignedRole::Observer
                    };
                    (role, controller.map(|id| id as u64))
                };

                let welcome = create_welcome(
                    hello.seq,
                    &state.config.protocol_version,
                    client_id as u64,
                    role,
                    controller_id,
                );
                let _ = tx.send(ClientOutbound::Welcome(welcome));

                if hello.requested.stream_observations {
                    let _ = command_tx.try_send(InboundCommand {
                        client_id,
                        seq: hello.seq,
                        payload: InboundPayload::SnapshotRequest,
                    });
                }
            }

            Ok(ParsedMessage::Command(cmd)) => {
                if !state.is_handshaken(client_id).await {
                    send_error(cmd.seq, ErrorCode::HandshakeRequired, "Send hello before command");
                    continue;
                }
                if !state.check_and_update_seq(client_id, cmd.seq).await {
                    send_error(
                        cmd.seq,
                        ErrorCode::InvalidCommand,
                        "seq must be strictly increasing",
                    );
                    continue;
                }
                if !state.is_controller(client_id).await {
                    send_error(
                        cmd.seq,
                        ErrorCode::NotController,
                        "Only controller may send commands",
                    );
                    continue;
                }

                let action = match cmd.to_game_action() {
                    Ok(a) => a,
                    Err((code, message)) => {
                        send_error(cmd.seq, code, &message);
                        continue;
                    }
                };

                // The ack is sent by the game loop once the action is applied.
                if command_tx
                    .try_send(InboundCommand {
                        client_id,
                        seq: cmd.seq,
                        payload: InboundPayload::Command(action),
                    })
                    .is_err()
                {
                    send_error(cmd.seq, ErrorCode::Backpressure, "Command queue is full");
                }
            }

            Ok(ParsedMessage::Unknown(unknown)) => {
                if state.is_handshaken(client_id).await
                    && !state.check_and_update_seq(client_id, unknown.seq).await
                {
                    send_error(
                        unknown.seq,
                        ErrorCode::InvalidCommand,
                        "seq must be strictly increasing",
                    );
                    continue;
                }
                send_error(unknown.seq, ErrorCode::InvalidCommand, "Unknown message type");
            }

            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                send_error(seq, ErrorCode::InvalidCommand, &format!("JSON parse error: {}", e));
            }
        }
    }

    drop(tx);
    remove_client(state, client_id).await;
    let _ = write_task.await;
    Ok(())
}

/// Drop the client; if it held control, promote the lowest-id handshaken
/// client that did not ask to observe only.
async fn remove_client(state: &ServerState, client_id: usize) {
    let mut controller = state.controller.write().await;
    let mut clients = state.clients.write().await;

    let before = clients.len();
    clients.retain(|c| c.id != client_id);
    if clients.len() == before {
        return;
    }

    if *controller == Some(client_id) {
        let next_id = clients
            .iter()
            .filter(|c| c.handshaken && c.wants_control)
            .map(|c| c.id)
            .min();
        *controller = next_id;
        match next_id {
            Some(new_id) => {
                for c in clients.iter_mut() {
                    c.is_controller = c.id == new_id;
                }
                log::info!("client {} promoted to controller", new_id);
            }
            None => log::info!("controller {} released", client_id),
        }
    }

    if let Some(c) = clients.iter().find(|c| c.is_controller) {
        log::debug!("controller is client {} ({})", c.id, c.addr);
    }
    state.publish_status(&clients, *controller);
}

/// Build an observation from a game snapshot.
///
/// Face-down cards carry no value, and nothing derived from the shuffle
/// (the RNG seed, hidden values) reaches the client, not even through
/// `state_hash`.
pub fn build_observation(
    snap: &GameSnapshot,
    seq: u64,
    last_event: Option<CoreEvent>,
) -> ObservationMessage {
    let state_hash = visible_state_hash(snap, last_event);

    let cards = snap
        .cards
        .iter()
        .enumerate()
        .map(|(index, card)| CardObservation {
            index,
            value: card.revealed().then_some(card.value.0),
            face_up: card.face_up,
            cleared: card.cleared,
            disabled: card.disabled,
        })
        .collect();

    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        episode_id: snap.episode_id,
        phase: snap.phase.into(),
        playable: snap.cards.iter().any(|c| !c.disabled),
        complete: snap.is_complete(),
        moves: snap.moves,
        elapsed: snap.elapsed.into(),
        pair_count: snap.pair_count,
        cleared_pairs: snap.cleared_pairs,
        cards,
        best: BestObservation {
            moves: snap.best.moves,
            time: snap.best.time.unwrap_or(DEFAULT_BEST_TIME).into(),
        },
        completion: snap.completion.map(|c| CompletionObservation {
            moves: c.moves,
            time: c.time.into(),
            new_best_moves: c.new_best_moves,
            new_best_time: c.new_best_time,
        }),
        last_event: last_event.map(LastEvent::from),
        state_hash,
        timers: TimersObservation {
            resolve_ms: snap.timers.resolve_ms,
            flip_back_ms: snap.timers.flip_back_ms,
        },
    }
}

/// Hash of what a client is allowed to see.
fn visible_state_hash(snap: &GameSnapshot, last_event: Option<CoreEvent>) -> StateHash {
    let mut hasher = Fnv1aHasher::new();
    snap.episode_id.hash(&mut hasher);
    snap.phase.hash(&mut hasher);
    snap.moves.hash(&mut hasher);
    snap.elapsed.hash(&mut hasher);
    snap.disabled.hash(&mut hasher);
    snap.pair_count.hash(&mut hasher);
    snap.cleared_pairs.hash(&mut hasher);
    for card in &snap.cards {
        card.revealed().then_some(card.value).hash(&mut hasher);
        card.face_up.hash(&mut hasher);
        card.cleared.hash(&mut hasher);
        card.disabled.hash(&mut hasher);
    }
    snap.completion.hash(&mut hasher);
    snap.best.hash(&mut hasher);
    snap.timers.hash(&mut hasher);
    last_event.hash(&mut hasher);
    StateHash(hasher.finish())
}
