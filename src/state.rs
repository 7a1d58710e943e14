//! Shared server state.
//!
//! Four independent lock domains: `db` (keyspace plus blocking queues, which must
//! change together), `pub_sub`, `replication` and `users`. When two are needed the
//! order is always `db` before `replication`.

use rand::{Rng, distributions::Alphanumeric};
use tokio::sync::{Mutex, MutexGuard, Notify};

use crate::{
    auth::UserStore,
    blocking::BlockingCoordinator,
    key_value_store::{DataType, KeyValueStore},
    pub_sub::PubSubBroker,
    replication::ReplicationState,
    resp::RespValue,
    server::{Config, RedisRole},
};

#[derive(Debug, Default)]
pub struct Database {
    pub store: KeyValueStore,
    pub blocking: BlockingCoordinator,
}

impl Database {
    /// Hands `key` to its oldest blocked popper if the list has elements to give.
    pub fn wake_list_waiters(&mut self, key: &str) {
        let has_elements = matches!(
            self.store.get(key).map(|value| &value.data),
            Some(DataType::List(list)) if !list.is_empty()
        );

        if has_elements {
            self.blocking.notify_list(key);
        }
    }
}

pub fn generate_replication_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(40)
        .map(char::from)
        .collect()
}

#[derive(Debug)]
pub struct ServerState {
    pub config: Config,
    pub role: RedisRole,
    pub db: Mutex<Database>,
    pub pub_sub: Mutex<PubSubBroker>,
    pub replication: Mutex<ReplicationState>,
    /// Signalled whenever a replica acknowledges a new offset.
    pub replication_acks: Notify,
    pub users: Mutex<UserStore>,
}

impl ServerState {
    pub fn new(config: Config) -> Self {
        let role = match &config.replicaof {
            Some(primary) => RedisRole::Replica(primary.clone()),
            None => RedisRole::Master,
        };

        Self {
            config,
            role,
            db: Mutex::new(Database::default()),
            pub_sub: Mutex::new(PubSubBroker::new()),
            replication: Mutex::new(ReplicationState::new(generate_replication_id())),
            replication_acks: Notify::new(),
            users: Mutex::new(UserStore::new()),
        }
    }

    pub fn is_replica(&self) -> bool {
        matches!(self.role, RedisRole::Replica(_))
    }

    /// Forwards a write to every replica and advances the replication offset.
    ///
    /// Takes the keyspace guard so that the stream replicas see is in the same order the
    /// keyspace applied the writes.
    pub async fn propagate(&self, _db: &MutexGuard<'_, Database>, command: &RespValue) {
        self.replication.lock().await.forward(command);
    }
}
