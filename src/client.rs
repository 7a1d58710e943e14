use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::{commands::CommandHandler, resp::RespValue};

pub type ClientId = u64;

static CLIENT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

pub fn next_client_id() -> ClientId {
    CLIENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Where a connection's commands come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientKind {
    Normal,
    /// The link a replica holds to its primary: writes are applied, replies are dropped.
    MasterLink,
}

/// Per-connection state that lives as long as the socket.
#[derive(Debug)]
pub struct ClientSession {
    pub id: ClientId,
    pub kind: ClientKind,
    pub user: String,
    pub authenticated: bool,
    /// `Some` between MULTI and EXEC/DISCARD.
    pub transaction: Option<Vec<CommandHandler>>,
    pub subscriptions: usize,
    /// Bytes of the primary's stream applied so far, only used on a master link.
    pub replication_offset: u64,
    outbound: mpsc::UnboundedSender<Bytes>,
}

impl ClientSession {
    pub fn new(kind: ClientKind, authenticated: bool, outbound: mpsc::UnboundedSender<Bytes>) -> Self {
        Self {
            id: next_client_id(),
            kind,
            user: "default".to_string(),
            authenticated,
            transaction: None,
            subscriptions: 0,
            replication_offset: 0,
            outbound,
        }
    }

    pub fn outbound(&self) -> mpsc::UnboundedSender<Bytes> {
        self.outbound.clone()
    }

    /// Queues a reply for the connection's writer task.
    pub fn send(&self, value: &RespValue) {
        self.send_bytes(Bytes::from(value.encode()));
    }

    pub fn send_bytes(&self, bytes: Bytes) {
        // The writer only goes away together with the socket.
        let _ = self.outbound.send(bytes);
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscriptions > 0
    }

    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }
}
