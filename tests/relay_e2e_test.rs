use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

use draughts::core::MatchState;
use draughts::types::{Move, Pos};
use draughts::sync::{build_move_message, create_join, create_leave, run_relay, Envelope, RelayConfig};

struct Peer {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Peer {
    async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect failed");
        let (read_half, writer) = stream.into_split();
        Self {
            lines: BufReader::new(read_half).lines(),
            writer,
        }
    }

    async fn send_raw(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
        self.writer.flush().await.unwrap();
    }

    async fn send(&mut self, env: &Envelope) {
        let line = env.to_line().unwrap();
        self.send_raw(&line).await;
    }

    async fn recv(&mut self) -> serde_json::Value {
        let line = tokio::time::timeout(Duration::from_secs(2), self.lines.next_line())
            .await
            .expect("timed out waiting for relay")
            .unwrap()
            .expect("relay closed the connection");
        serde_json::from_str(&line).unwrap()
    }

    async fn recv_line(&mut self) -> String {
        tokio::time::timeout(Duration::from_secs(2), self.lines.next_line())
            .await
            .expect("timed out waiting for relay")
            .unwrap()
            .expect("relay closed the connection")
    }
}

async fn start_relay() -> SocketAddr {
    let config = RelayConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        log_path: None,
    };
    let (ready_tx, ready_rx) = oneshot::channel();
    tokio::spawn(async move {
        let _ = run_relay(config, Some(ready_tx)).await;
    });
    tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .expect("relay did not signal ready")
        .expect("ready channel dropped")
}

async fn seated_pair(addr: SocketAddr, lobby: &str) -> (Peer, Peer) {
    let mut amy = Peer::connect(addr).await;
    let mut bob = Peer::connect(addr).await;

    amy.send(&create_join(lobby)).await;
    let joined = amy.recv().await;
    assert_eq!(joined["type"], "joined");
    assert_eq!(joined["lobbyId"], lobby);
    assert_eq!(joined["role"], 1);

    bob.send(&create_join(lobby)).await;
    let joined = bob.recv().await;
    assert_eq!(joined["type"], "joined");
    assert_eq!(joined["role"], 2);

    assert_eq!(amy.recv().await["type"], "game_started");
    assert_eq!(bob.recv().await["type"], "game_started");
    (amy, bob)
}

#[tokio::test]
async fn relay_seats_two_and_echoes_moves_to_both() {
    let addr = start_relay().await;
    let (mut amy, mut bob) = seated_pair(addr, "L1").await;

    let mut state = MatchState::new();
    state
        .play(Pos::new(5, 0), Move::step(Pos::new(4, 1)))
        .unwrap();
    let line = Envelope::Move(build_move_message("L1", &state)).to_line().unwrap();
    amy.send_raw(&line).await;

    // Verbatim, sender included
    assert_eq!(amy.recv_line().await, line);
    assert_eq!(bob.recv_line().await, line);

    let v: serde_json::Value = serde_json::from_str(&line).unwrap();
    assert_eq!(v["turn"], 2);
    assert!(v["winner"].is_null());
    assert_eq!(v["board"][4][1]["player"], 1);
    assert_eq!(v["board"][4][1]["isKing"], false);
}

#[tokio::test]
async fn relay_refuses_a_third_seat() {
    let addr = start_relay().await;
    let (_amy, _bob) = seated_pair(addr, "full").await;

    let mut carl = Peer::connect(addr).await;
    carl.send(&create_join("full")).await;
    let reply = carl.recv().await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["message"], "lobby is full");
}

#[tokio::test]
async fn relay_rejects_moves_for_a_lobby_not_joined() {
    let addr = start_relay().await;
    let mut amy = Peer::connect(addr).await;

    let line = Envelope::Move(build_move_message("nowhere", &MatchState::new()))
        .to_line()
        .unwrap();
    amy.send_raw(&line).await;
    let reply = amy.recv().await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["message"], "lobby not found");
}

#[tokio::test]
async fn relay_reports_unknown_and_invalid_lines() {
    let addr = start_relay().await;
    let mut amy = Peer::connect(addr).await;

    amy.send_raw(r#"{"type":"teleport","lobbyId":"L1"}"#).await;
    let reply = amy.recv().await;
    assert_eq!(reply["type"], "error");
    assert!(reply["message"].as_str().unwrap().contains("teleport"));

    amy.send_raw("not json").await;
    let reply = amy.recv().await;
    assert_eq!(reply["type"], "error");
}

#[tokio::test]
async fn relay_tells_the_other_seat_when_a_peer_goes() {
    let addr = start_relay().await;

    let (mut amy, bob) = seated_pair(addr, "L2").await;
    drop(bob);
    assert_eq!(amy.recv().await["type"], "peer_left");

    let (mut amy, mut bob) = seated_pair(addr, "L3").await;
    bob.send(&create_leave("L3")).await;
    assert_eq!(amy.recv().await["type"], "peer_left");

    // The freed seat can be taken again
    let mut carl = Peer::connect(addr).await;
    carl.send(&create_join("L3")).await;
    let joined = carl.recv().await;
    assert_eq!(joined["role"], 2);
    assert_eq!(amy.recv().await["type"], "game_started");
}
