//! Startup configuration and the accept loop.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::Parser;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::{connection::handle_client, rdb::load_rdb_file, replication, state::ServerState};

#[derive(Error, Debug, PartialEq)]
pub enum CliError {
    #[error("--replicaof expects \"<host> <port>\"")]
    InvalidReplicaOf,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "redcore", about = "In-memory data-structure server")]
pub struct Config {
    /// Port to listen on.
    #[arg(long, default_value_t = 6379)]
    pub port: u16,

    /// Directory holding the snapshot file.
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// Snapshot file name inside `--dir`.
    #[arg(long, default_value = "dump.rdb")]
    pub dbfilename: String,

    /// Run as a replica of `"<host> <port>"`.
    #[arg(long, value_parser = parse_replica_of)]
    pub replicaof: Option<ReplicaOf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplicaOf {
    pub host: String,
    pub port: u16,
}

fn parse_replica_of(input: &str) -> Result<ReplicaOf, CliError> {
    let mut parts = input.split_whitespace();

    let (Some(host), Some(port), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(CliError::InvalidReplicaOf);
    };

    let port = port.parse::<u16>().map_err(|_| CliError::InvalidReplicaOf)?;

    Ok(ReplicaOf {
        host: host.to_string(),
        port,
    })
}

impl Config {
    pub fn rdb_path(&self) -> PathBuf {
        self.dir.join(&self.dbfilename)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 6379,
            dir: PathBuf::from("."),
            dbfilename: "dump.rdb".to_string(),
            replicaof: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RedisRole {
    Master,
    Replica(ReplicaOf),
}

impl RedisRole {
    pub fn as_info_str(&self) -> &'static str {
        match self {
            RedisRole::Master => "master",
            RedisRole::Replica(_) => "slave",
        }
    }
}

/// Loads the snapshot, binds the configured port and serves until the process exits.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let state = Arc::new(ServerState::new(config.clone()));

    match load_rdb_file(&config.rdb_path()).await {
        Ok(entries) => state.db.lock().await.store.extend(entries),
        Err(e) => warn!(path = %config.rdb_path().display(), "could not load snapshot: {e}"),
    }

    let listener = TcpListener::bind(("127.0.0.1", config.port))
        .await
        .with_context(|| format!("binding port {}", config.port))?;
    info!(port = config.port, role = state.role.as_info_str(), "listening");

    if let RedisRole::Replica(primary) = &state.role {
        let state = Arc::clone(&state);
        let primary = primary.clone();
        tokio::spawn(async move {
            if let Err(e) = replication::replica::run(state, primary).await {
                error!("replication link failed: {e:#}");
            }
        });
    }

    serve(listener, state).await
}

/// Accepts connections on `listener`, one task per client.
pub async fn serve(listener: TcpListener, state: Arc<ServerState>) -> anyhow::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await.context("accepting connection")?;
        let state = Arc::clone(&state);

        tokio::spawn(async move {
            if let Err(e) = handle_client(stream, state).await {
                warn!(%peer, "connection ended with error: {e:#}");
            }
        });
    }
}
