//! Relay link runtime integration.
//!
//! Bridges a synchronous game loop with the async TCP connection to the relay.
//! The link owns its tokio runtime; received lines arrive as
//! [`ChannelEvent`]s through a channel polled with [`RelayLink::try_recv`].

use std::net::SocketAddr;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::client::{ChannelEvent, ClientConfig, MatchClient};
use crate::protocol::Envelope;

/// Reported when the relay closes the connection
pub const CONNECTION_CLOSED: &str = "relay connection closed";

/// Running connection to a relay.
pub struct RelayLink {
    _rt: Runtime,
    in_rx: mpsc::UnboundedReceiver<ChannelEvent>,
    out_tx: mpsc::UnboundedSender<String>,
}

impl RelayLink {
    /// Connect using environment configuration.
    pub fn connect_from_env() -> anyhow::Result<Self> {
        let config = ClientConfig::from_env();
        Self::connect(config.socket_addr()?)
    }

    /// Connect to the relay at `addr`.
    pub fn connect(addr: SocketAddr) -> anyhow::Result<Self> {
        let rt = Runtime::new()?;
        let stream = rt.block_on(TcpStream::connect(addr))?;
        let (reader, mut writer) = stream.into_split();

        let (in_tx, in_rx) = mpsc::unbounded_channel::<ChannelEvent>();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();

        rt.spawn(async move {
            let mut lines = BufReader::new(reader).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => match ChannelEvent::from_line(&line) {
                        Ok(event) => {
                            if in_tx.send(event).is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!(error = %e, "dropping undecodable line from relay"),
                    },
                    Ok(None) => {
                        let _ = in_tx.send(ChannelEvent::Error(CONNECTION_CLOSED.to_string()));
                        break;
                    }
                    Err(e) => {
                        let _ = in_tx.send(ChannelEvent::Error(e.to_string()));
                        break;
                    }
                }
            }
        });

        rt.spawn(async move {
            while let Some(line) = out_rx.recv().await {
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

        debug!(%addr, "connected to relay");
        Ok(Self {
            _rt: rt,
            in_rx,
            out_tx,
        })
    }

    pub fn try_recv(&mut self) -> Option<ChannelEvent> {
        self.in_rx.try_recv().ok()
    }

    /// Queue an envelope for the relay.
    pub fn send(&self, env: &Envelope) -> anyhow::Result<()> {
        let line = env.to_line()?;
        self.out_tx.send(line)?;
        Ok(())
    }

    /// Send everything `client` has queued; returns how many went out.
    pub fn flush_from(&self, client: &mut MatchClient) -> anyhow::Result<usize> {
        let mut sent = 0;
        while let Some(env) = client.take_outbound() {
            self.send(&env)?;
            sent += 1;
        }
        Ok(sent)
    }
}
