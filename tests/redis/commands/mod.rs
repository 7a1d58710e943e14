mod auth;
mod command_dispatcher;
mod keys;
mod lrange;
mod replication;
mod transaction;
mod xadd;
mod xrange;
mod xread;
mod zset;
