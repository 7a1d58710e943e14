//! Primary to replica replication.
//!
//! The primary keeps a registry of replica links with the offset each one last
//! acknowledged. Every forwarded frame advances the primary's offset by its encoded
//! length, whether or not anyone is listening.

pub mod replica;

use std::collections::HashMap;

use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::debug;

use crate::{client::ClientId, resp::RespValue};

#[derive(Debug)]
struct ReplicaHandle {
    outbound: mpsc::UnboundedSender<Bytes>,
    acked_offset: u64,
}

#[derive(Debug)]
pub struct ReplicationState {
    replication_id: String,
    offset: u64,
    replicas: HashMap<ClientId, ReplicaHandle>,
}

impl ReplicationState {
    pub fn new(replication_id: String) -> Self {
        Self {
            replication_id,
            offset: 0,
            replicas: HashMap::new(),
        }
    }

    pub fn replication_id(&self) -> &str {
        &self.replication_id
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Starts streaming to a replica that has just been sent its snapshot.
    pub fn register(&mut self, client: ClientId, outbound: mpsc::UnboundedSender<Bytes>) {
        self.replicas.insert(
            client,
            ReplicaHandle {
                outbound,
                acked_offset: 0,
            },
        );
    }

    pub fn is_replica(&self, client: ClientId) -> bool {
        self.replicas.contains_key(&client)
    }

    pub fn forward(&mut self, command: &RespValue) {
        let payload = command.encode();
        self.offset += payload.len() as u64;

        let payload = Bytes::from(payload);
        for handle in self.replicas.values() {
            let _ = handle.outbound.send(payload.clone());
        }
    }

    /// Records `REPLCONF ACK <offset>`. Offsets never move backwards.
    pub fn record_ack(&mut self, client: ClientId, offset: u64) -> bool {
        let Some(handle) = self.replicas.get_mut(&client) else {
            return false;
        };

        handle.acked_offset = handle.acked_offset.max(offset);
        true
    }

    /// Drops replicas whose connection is gone.
    pub fn prune_closed(&mut self) {
        self.replicas.retain(|client, handle| {
            let open = !handle.outbound.is_closed();
            if !open {
                debug!(client, "pruning disconnected replica");
            }
            open
        });
    }

    pub fn remove(&mut self, client: ClientId) {
        self.replicas.remove(&client);
    }

    pub fn connected_replicas(&self) -> usize {
        self.replicas.len()
    }

    pub fn replicas_acked(&self, target: u64) -> usize {
        self.replicas
            .values()
            .filter(|handle| handle.acked_offset >= target)
            .count()
    }
}
