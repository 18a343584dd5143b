//! TCP relay for synchronized matches
//!
//! Clients join a lobby by id; a lobby seats two. The relay assigns sides
//! (first seat plays One), announces when both seats are filled, and echoes
//! every `move` and `control` line verbatim to everyone in the lobby, sender
//! included. It never looks at the board: validation is the clients' job.
//! When a participant leaves or disconnects the other one gets `peer_left`.
//!
//! Uses tokio for async networking.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, info, warn};

use crate::protocol::{parse_message, Envelope, JoinedMessage, LobbyMessage, ParsedMessage, PlayerNumber};
use crate::types::Player;

pub const LOBBY_FULL: &str = "lobby is full";
pub const LOBBY_NOT_FOUND: &str = "lobby not found";

/// Relay configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    /// Append every line in and out to this file
    pub log_path: Option<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            log_path: None,
        }
    }
}

impl RelayConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        use std::env;

        let host = env::var("DRAUGHTS_RELAY_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("DRAUGHTS_RELAY_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(7878);

        let log_path = env::var("DRAUGHTS_RELAY_LOG_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .and_then(|s| if s.is_empty() { None } else { Some(s) });

        Self {
            host,
            port,
            log_path,
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// Handle to a connected client
struct ClientHandle {
    id: usize,
    lobby: Option<String>,
    tx: mpsc::UnboundedSender<String>,
}

#[derive(Debug, Clone, Copy)]
struct Seat {
    client_id: usize,
    role: Player,
}

#[derive(Debug, Default)]
struct Lobby {
    seats: Vec<Seat>,
}

impl Lobby {
    const CAPACITY: usize = 2;

    fn free_role(&self) -> Player {
        if self.seats.iter().any(|s| s.role == Player::One) {
            Player::Two
        } else {
            Player::One
        }
    }

    fn members(&self) -> Vec<usize> {
        self.seats.iter().map(|s| s.client_id).collect()
    }
}

/// Shared relay state
struct RelayState {
    clients: RwLock<Vec<ClientHandle>>,
    lobbies: RwLock<HashMap<String, Lobby>>,
    wire_log: Option<mpsc::UnboundedSender<WireRecord>>,
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    In,
    Out,
}

#[derive(Debug, Clone)]
struct WireRecord {
    ts: u64,
    client_id: usize,
    direction: Direction,
    line: String,
}

impl RelayState {
    fn log(&self, client_id: usize, direction: Direction, line: &str) {
        if let Some(tx) = self.wire_log.as_ref() {
            let _ = tx.send(WireRecord {
                ts: current_timestamp_ms(),
                client_id,
                direction,
                line: line.to_string(),
            });
        }
    }

    async fn send_line(&self, client_id: usize, line: &str) {
        let clients = self.clients.read().await;
        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
            if c.tx.send(line.to_string()).is_ok() {
                self.log(client_id, Direction::Out, line);
            }
        }
    }

    async fn send(&self, client_id: usize, env: &Envelope) {
        match env.to_line() {
            Ok(line) => self.send_line(client_id, &line).await,
            Err(e) => warn!(client_id, error = %e, "could not encode relay message"),
        }
    }

    async fn send_error(&self, client_id: usize, message: &str) {
        self.send(client_id, &Envelope::error(message)).await;
    }

    async fn lobby_of(&self, client_id: usize) -> Option<String> {
        let clients = self.clients.read().await;
        clients
            .iter()
            .find(|c| c.id == client_id)
            .and_then(|c| c.lobby.clone())
    }

    async fn set_lobby(&self, client_id: usize, lobby: Option<String>) {
        let mut clients = self.clients.write().await;
        if let Some(c) = clients.iter_mut().find(|c| c.id == client_id) {
            c.lobby = lobby;
        }
    }

    async fn join(&self, client_id: usize, lobby_id: String) {
        match self.lobby_of(client_id).await {
            Some(current) if current == lobby_id => {}
            Some(_) => self.leave(client_id).await,
            None => {}
        }

        let (role, started) = {
            let mut lobbies = self.lobbies.write().await;
            let lobby = lobbies.entry(lobby_id.clone()).or_default();
            if let Some(seat) = lobby.seats.iter().find(|s| s.client_id == client_id) {
                (seat.role, None)
            } else if lobby.seats.len() >= Lobby::CAPACITY {
                drop(lobbies);
                info!(client_id, lobby = %lobby_id, "join refused, lobby full");
                self.send_error(client_id, LOBBY_FULL).await;
                return;
            } else {
                let role = lobby.free_role();
                lobby.seats.push(Seat { client_id, role });
                let started = (lobby.seats.len() == Lobby::CAPACITY).then(|| lobby.members());
                (role, started)
            }
        };

        self.set_lobby(client_id, Some(lobby_id.clone())).await;
        info!(client_id, lobby = %lobby_id, role = role.number(), "joined lobby");
        self.send(
            client_id,
            &Envelope::Joined(JoinedMessage {
                lobby_id: lobby_id.clone(),
                role: PlayerNumber(role),
            }),
        )
        .await;

        if let Some(members) = started {
            info!(lobby = %lobby_id, "game started");
            let env = Envelope::GameStarted(LobbyMessage { lobby_id });
            for id in members {
                self.send(id, &env).await;
            }
        }
    }

    /// Drop the client's seat and tell whoever is left
    async fn leave(&self, client_id: usize) {
        let Some(lobby_id) = self.lobby_of(client_id).await else {
            return;
        };
        self.set_lobby(client_id, None).await;

        let remaining = {
            let mut lobbies = self.lobbies.write().await;
            let Some(lobby) = lobbies.get_mut(&lobby_id) else {
                return;
            };
            lobby.seats.retain(|s| s.client_id != client_id);
            let remaining = lobby.members();
            if remaining.is_empty() {
                lobbies.remove(&lobby_id);
                debug!(lobby = %lobby_id, "lobby closed");
            }
            remaining
        };

        info!(client_id, lobby = %lobby_id, "left lobby");
        for id in remaining {
            self.send(id, &Envelope::PeerLeft).await;
        }
    }

    /// Echo `line` to every member of `lobby_id`, if the sender sits there
    async fn relay(&self, client_id: usize, lobby_id: &str, line: &str) {
        if self.lobby_of(client_id).await.as_deref() != Some(lobby_id) {
            debug!(client_id, lobby = %lobby_id, "message for a lobby the client is not in");
            self.send_error(client_id, LOBBY_NOT_FOUND).await;
            return;
        }

        let members = {
            let lobbies = self.lobbies.read().await;
            lobbies.get(lobby_id).map(Lobby::members).unwrap_or_default()
        };
        for id in members {
            self.send_line(id, line).await;
        }
    }
}

/// Start the relay
///
/// `ready_tx` receives the bound address once the listener is up, which is
/// how callers using port 0 learn the real port.
pub async fn run_relay(
    config: RelayConfig,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let wire_log = config.log_path.clone().map(spawn_wire_log);

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr).await?;
    let bound = listener.local_addr()?;
    info!(%bound, "relay listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(RelayState {
        clients: RwLock::new(Vec::new()),
        lobbies: RwLock::new(HashMap::new()),
        wire_log,
    });
    let mut client_id_counter = 0usize;

    // Accept incoming connections
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;

        info!(client_id, %addr, "client connected");

        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, client_id, Arc::clone(&state)).await {
                warn!(client_id, error = %e, "client error");
            }
            state.leave(client_id).await;
            state.clients.write().await.retain(|c| c.id != client_id);
            info!(client_id, "client disconnected");
        });
    }
}

fn spawn_wire_log(path: String) -> mpsc::UnboundedSender<WireRecord> {
    let (tx, mut rx) = mpsc::unbounded_channel::<WireRecord>();
    tokio::spawn(async move {
        use tokio::fs::OpenOptions;

        let mut file = match OpenOptions::new().create(true).append(true).open(&path).await {
            Ok(f) => f,
            Err(e) => {
                warn!(%path, error = %e, "wire log disabled");
                return;
            }
        };

        while let Some(rec) = rx.recv().await {
            let dir = match rec.direction {
                Direction::In => "<-",
                Direction::Out => "->",
            };
            let entry = format!("{} {} {} {}\n", rec.ts, rec.client_id, dir, rec.line);
            if file.write_all(entry.as_bytes()).await.is_err() {
                break;
            }
        }

        let _ = file.flush().await;
    });
    tx
}

/// Handle a single client connection
async fn handle_client(socket: TcpStream, client_id: usize, state: Arc<RelayState>) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);

    // Channel to send lines to this client
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    state.clients.write().await.push(ClientHandle {
        id: client_id,
        lobby: None,
        tx,
    });

    let write_task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if writer.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if writer.write_all(b"\n").await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
    });

    let mut line = String::new();
    let result = loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => break Ok(()),
            Ok(_) => {}
            Err(e) => break Err(e.into()),
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        state.log(client_id, Direction::In, trimmed);

        match parse_message(trimmed) {
            Ok(ParsedMessage::Envelope(Envelope::Join(m))) => state.join(client_id, m.lobby_id).await,
            Ok(ParsedMessage::Envelope(Envelope::Leave(_))) => state.leave(client_id).await,
            Ok(ParsedMessage::Envelope(env @ (Envelope::Move(_) | Envelope::Control(_)))) => {
                if let Some(lobby_id) = env.lobby_id() {
                    state.relay(client_id, lobby_id, trimmed).await;
                }
            }
            Ok(ParsedMessage::Envelope(_)) => {
                state.send_error(client_id, "message is relay-only").await;
            }
            Ok(ParsedMessage::Unknown(u)) => {
                debug!(client_id, msg_type = %u.msg_type, "unknown message type");
                state
                    .send_error(client_id, &format!("unknown message type: {}", u.msg_type))
                    .await;
            }
            Err(e) => {
                debug!(client_id, error = %e, "invalid message");
                state.send_error(client_id, &format!("invalid message: {e}")).await;
            }
        }
    };

    write_task.abort();
    result
}

/// Get current timestamp in milliseconds
fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = RelayConfig::default();
        assert_eq!(config.port, 7878);
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:7878");
        assert!(config.log_path.is_none());
    }

    #[test]
    fn test_bad_host_is_an_error() {
        let config = RelayConfig {
            host: "not a host".to_string(),
            ..RelayConfig::default()
        };
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn test_roles_fill_free_seat() {
        let mut lobby = Lobby::default();
        assert_eq!(lobby.free_role(), Player::One);
        lobby.seats.push(Seat {
            client_id: 1,
            role: Player::One,
        });
        assert_eq!(lobby.free_role(), Player::Two);

        // First player left; the newcomer takes their side
        lobby.seats = vec![Seat {
            client_id: 2,
            role: Player::Two,
        }];
        assert_eq!(lobby.free_role(), Player::One);
    }
}
