//! An in-memory, Redis-compatible data-structure server.
//!
//! The crate provides:
//!
//! - A RESP2 codec with incremental decoding and inline commands
//! - Strings (GET, SET, INCR), lists (LPUSH, RPUSH, LPOP, BLPOP, LRANGE, LLEN)
//! - Sorted sets (ZADD, ZRANK, ZRANGE, ZCARD, ZSCORE, ZREM) and GEO commands on top of them
//! - Streams (XADD, XRANGE, XREAD with BLOCK)
//! - Pub/sub, MULTI/EXEC transactions, AUTH and a minimal ACL
//! - Primary/replica replication with full resync and WAIT
//! - Loading an RDB snapshot at startup
//!
//! Every connection runs on its own Tokio task and shares one [`state::ServerState`].

pub mod auth;
pub mod blocking;
pub mod client;
pub mod commands;
pub mod connection;
pub mod input;
pub mod key_value_store;
pub mod pub_sub;
pub mod rdb;
pub mod replication;
pub mod resp;
pub mod server;
pub mod state;
pub mod types;
