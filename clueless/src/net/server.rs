//! TCP front end.
//!
//! Accepts connections, splits each socket into a reader task feeding
//! the session actor and a writer task draining the connection's
//! outbox. The protocol is one UTF-8 line per message in both
//! directions.

use std::io;
use std::net::SocketAddr;

use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream, tcp::OwnedWriteHalf},
    sync::mpsc,
};

use crate::session::{ConnId, SessionActor, SessionConfig, SessionHandle, SessionMessage};

const OUTBOX_CAPACITY: usize = 64;

/// A bound listener with its session actor already running.
pub struct Server {
    listener: TcpListener,
    handle: SessionHandle,
}

impl Server {
    /// Binds `addr` and spawns the session actor. Use port 0 to let
    /// the OS pick a free port, then read it back with
    /// [`Server::local_addr`].
    pub async fn bind(addr: &str, config: SessionConfig) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let (actor, handle) = SessionActor::new(config);
        tokio::spawn(actor.run());
        Ok(Self { listener, handle })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections forever.
    pub async fn serve(self) -> io::Result<()> {
        let mut next_conn_id: ConnId = 0;
        loop {
            let (socket, peer) = self.listener.accept().await?;
            next_conn_id += 1;
            let conn_id = next_conn_id;
            log::info!("connection {conn_id} accepted from {peer}");
            tokio::spawn(handle_connection(conn_id, socket, self.handle.clone()));
        }
    }
}

/// Convenience entry point: bind and serve in one call.
pub async fn run(addr: &str, config: SessionConfig) -> io::Result<()> {
    let server = Server::bind(addr, config).await?;
    log::info!("listening on {}", server.local_addr()?);
    server.serve().await
}

async fn handle_connection(conn_id: ConnId, socket: TcpStream, handle: SessionHandle) {
    let (reader, writer) = socket.into_split();
    let (outbox, outbox_rx) = mpsc::channel(OUTBOX_CAPACITY);
    if handle
        .send(SessionMessage::Connect { conn_id, outbox })
        .await
        .is_err()
    {
        return;
    }

    let writer_task = tokio::spawn(drain_outbox(outbox_rx, writer));

    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                // An orderly goodbye closes the connection.
                let leaving = line.trim() == "PLAYER_LEFT";
                if handle
                    .send(SessionMessage::Command { conn_id, line })
                    .await
                    .is_err()
                    || leaving
                {
                    break;
                }
            }
            Ok(None) => break,
            Err(error) => {
                log::debug!("connection {conn_id} read error: {error}");
                break;
            }
        }
    }

    let _ = handle.send(SessionMessage::Disconnect { conn_id }).await;
    // The session drops this connection's outbox on disconnect, which
    // ends the writer task once the queue is flushed.
    let _ = writer_task.await;
}

async fn drain_outbox(mut outbox_rx: mpsc::Receiver<String>, mut writer: OwnedWriteHalf) {
    while let Some(line) = outbox_rx.recv().await {
        let result = async {
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await
        }
        .await;
        if result.is_err() {
            break;
        }
    }
}
