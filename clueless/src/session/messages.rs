//! Messages accepted by the session actor.

use tokio::sync::mpsc;

/// Identifies one client connection for the lifetime of its socket.
pub type ConnId = u64;

/// Everything a connection task can tell the session actor. Replies
/// and broadcasts flow back through the per-connection outbox
/// registered at connect time, which keeps each client's lines in
/// delivery order.
#[derive(Debug)]
pub enum SessionMessage {
    /// A client connected; `outbox` carries its outgoing wire lines.
    Connect {
        conn_id: ConnId,
        outbox: mpsc::Sender<String>,
    },
    /// A raw command line from a client.
    Command { conn_id: ConnId, line: String },
    /// The client's socket closed or errored.
    Disconnect { conn_id: ConnId },
}
