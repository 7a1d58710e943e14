use std::sync::Arc;

use tracing::debug;

use crate::{
    client::{ClientKind, ClientSession},
    commands::{
        acl::{AclArguments, acl},
        auth::{AuthArguments, auth},
        blpop::{BlpopArguments, blpop},
        command_error::CommandError,
        config_get::{ConfigGetArguments, config_get},
        echo::{EchoArguments, echo},
        geo::{
            GeoaddArguments, GeodistArguments, GeoposArguments, GeosearchArguments, geoadd,
            geodist, geopos, geosearch,
        },
        get::{GetArguments, get},
        incr::{IncrArguments, incr},
        info::{InfoArguments, info},
        keys::{KeysArguments, keys},
        llen::{LlenArguments, llen},
        lpop::{LpopArguments, lpop},
        lrange::{LrangeArguments, lrange},
        ping::{PingArguments, ping},
        pub_sub::{
            PublishArguments, SubscribeArguments, UnsubscribeArguments, publish, subscribe,
            subscribed_ping, unsubscribe,
        },
        replication::{PsyncArguments, ReplconfArguments, WaitArguments, psync, replconf, wait},
        rpush_and_lpush::{PushArguments, lpush, rpush},
        set::{SetArguments, set},
        transactions::{DiscardArguments, ExecArguments, MultiArguments, discard, exec, multi},
        type_command::{TypeArguments, type_command},
        xadd::{XaddArguments, xadd},
        xrange::{XrangeArguments, xrange},
        xread::{XreadArguments, xread},
        zset::{
            ZaddArguments, ZcardArguments, ZrangeArguments, ZrankArguments, ZremArguments,
            ZscoreArguments, zadd, zcard, zrange, zrank, zrem, zscore,
        },
    },
    resp::RespValue,
    state::ServerState,
};

#[derive(Debug, PartialEq)]
pub enum CommandResult {
    /// Nothing goes back to the client (replica acknowledgements, PSYNC which writes its
    /// own reply).
    NoResponse,
    Response(RespValue),
}

/// Commands that mutate the keyspace. These are forwarded to replicas and refused on a
/// replica's client connections.
const WRITE_COMMANDS: [&str; 10] = [
    "SET", "INCR", "RPUSH", "LPUSH", "LPOP", "BLPOP", "ZADD", "ZREM", "GEOADD", "XADD",
];

const SUBSCRIBED_MODE_COMMANDS: [&str; 4] = ["SUBSCRIBE", "UNSUBSCRIBE", "PING", "QUIT"];

#[derive(Debug, PartialEq, Clone)]
pub struct CommandHandler {
    pub name: String,
    pub arguments: Vec<String>,
    pub input: RespValue,
}

impl CommandHandler {
    pub fn new(input: RespValue) -> Result<Self, CommandError> {
        let RespValue::Array(elements) = &input else {
            return Err(CommandError::InvalidCommand);
        };

        let name = match elements.first() {
            Some(RespValue::BulkString(s)) => s.to_uppercase(),
            _ => return Err(CommandError::InvalidCommand),
        };

        let (name, rest_of_data) = match name.as_str() {
            "CONFIG" => {
                let sub_command = match elements.get(1) {
                    Some(RespValue::BulkString(s)) => s.to_uppercase(),
                    _ => return Err(CommandError::WrongNumberOfArguments("config".into())),
                };

                if sub_command != "GET" {
                    return Err(CommandError::UnknownCommand(format!(
                        "config|{}",
                        sub_command.to_lowercase()
                    )));
                }

                ("CONFIG GET".to_string(), &elements[2..])
            }
            _ => (name, &elements[1..]),
        };

        let arguments = rest_of_data
            .iter()
            .map(|element| match element {
                RespValue::BulkString(s) => Ok(s.clone()),
                _ => Err(CommandError::InvalidCommand),
            })
            .collect::<Result<Vec<String>, CommandError>>()?;

        Ok(Self {
            name,
            arguments,
            input,
        })
    }

    pub fn is_write(&self) -> bool {
        WRITE_COMMANDS.contains(&self.name.as_str())
    }

    /// Whether the command may park the connection until another client acts.
    pub fn may_block(&self) -> bool {
        match self.name.as_str() {
            "BLPOP" | "WAIT" => true,
            "XREAD" => self
                .arguments
                .iter()
                .any(|argument| argument.eq_ignore_ascii_case("block")),
            _ => false,
        }
    }

    /// Arity and syntax check used when a command is queued inside MULTI.
    pub fn validate_command_arguments(&self) -> Option<CommandError> {
        let arguments = self.arguments.clone();

        match self.name.as_str() {
            "PING" => PingArguments::parse(arguments).err(),
            "ECHO" => EchoArguments::parse(arguments).err(),
            "GET" => GetArguments::parse(arguments).err(),
            "SET" => SetArguments::parse(arguments).err(),
            "INCR" => IncrArguments::parse(arguments).err(),
            "RPUSH" | "LPUSH" => PushArguments::parse(arguments, &self.name).err(),
            "LPOP" => LpopArguments::parse(arguments).err(),
            "LLEN" => LlenArguments::parse(arguments).err(),
            "LRANGE" => LrangeArguments::parse(arguments).err(),
            "BLPOP" => BlpopArguments::parse(arguments).err(),
            "ZADD" => ZaddArguments::parse(arguments).err(),
            "ZRANK" => ZrankArguments::parse(arguments).err(),
            "ZRANGE" => ZrangeArguments::parse(arguments).err(),
            "ZCARD" => ZcardArguments::parse(arguments).err(),
            "ZSCORE" => ZscoreArguments::parse(arguments).err(),
            "ZREM" => ZremArguments::parse(arguments).err(),
            "GEOADD" => GeoaddArguments::parse(arguments).err(),
            "GEOPOS" => GeoposArguments::parse(arguments).err(),
            "GEODIST" => GeodistArguments::parse(arguments).err(),
            "GEOSEARCH" => GeosearchArguments::parse(arguments).err(),
            "XADD" => XaddArguments::parse(arguments).err(),
            "XRANGE" => XrangeArguments::parse(arguments).err(),
            "XREAD" => XreadArguments::parse(arguments).err(),
            "TYPE" => TypeArguments::parse(arguments).err(),
            "KEYS" => KeysArguments::parse(arguments).err(),
            "CONFIG GET" => ConfigGetArguments::parse(arguments).err(),
            "INFO" => InfoArguments::parse(arguments).err(),
            "SUBSCRIBE" => SubscribeArguments::parse(arguments).err(),
            "UNSUBSCRIBE" => UnsubscribeArguments::parse(arguments).err(),
            "PUBLISH" => PublishArguments::parse(arguments).err(),
            "AUTH" => AuthArguments::parse(arguments).err(),
            "ACL" => AclArguments::parse(arguments).err(),
            "REPLCONF" => ReplconfArguments::parse(arguments).err(),
            "PSYNC" => PsyncArguments::parse(arguments).err(),
            "WAIT" => WaitArguments::parse(arguments).err(),
            "MULTI" => MultiArguments::parse(arguments).err(),
            "EXEC" => ExecArguments::parse(arguments).err(),
            "DISCARD" => DiscardArguments::parse(arguments).err(),
            "QUIT" => None,
            _ => Some(CommandError::UnknownCommand(self.display_name())),
        }
    }

    fn display_name(&self) -> String {
        self.name.to_lowercase()
    }

    /// Runs the connection-level gates (authentication, subscribed mode, MULTI
    /// queueing) before the command itself.
    async fn handle(
        &self,
        state: &Arc<ServerState>,
        session: &mut ClientSession,
    ) -> Result<CommandResult, CommandError> {
        let name = self.name.as_str();

        if !session.authenticated && !matches!(name, "AUTH" | "QUIT") {
            return Err(CommandError::NoAuth);
        }

        if session.is_subscribed() && !SUBSCRIBED_MODE_COMMANDS.contains(&name) {
            return Err(CommandError::NotAllowedWhileSubscribed(self.display_name()));
        }

        match name {
            "QUIT" => return Ok(CommandResult::Response(RespValue::ok())),
            "MULTI" => return multi(session, self.arguments.clone()),
            "EXEC" => return exec(state, session, self.arguments.clone()).await,
            "DISCARD" => return discard(session, self.arguments.clone()),
            _ => {}
        }

        if session.in_transaction() {
            if let Some(error) = self.validate_command_arguments() {
                return Err(error);
            }

            if let Some(queue) = session.transaction.as_mut() {
                queue.push(self.clone());
            }

            return Ok(CommandResult::Response(RespValue::SimpleString(
                "QUEUED".to_string(),
            )));
        }

        self.execute(state, session, false).await
    }

    /// Executes the command itself. Inside EXEC `in_transaction` is set, which makes the
    /// blocking commands answer immediately instead of waiting.
    pub async fn execute(
        &self,
        state: &Arc<ServerState>,
        session: &mut ClientSession,
        in_transaction: bool,
    ) -> Result<CommandResult, CommandError> {
        if self.is_write() && session.kind == ClientKind::Normal && state.is_replica() {
            return Err(CommandError::ReadOnlyReplica);
        }

        let arguments = self.arguments.clone();

        match self.name.as_str() {
            "PING" if session.is_subscribed() => subscribed_ping(arguments),
            "PING" => ping(arguments),
            "ECHO" => echo(arguments),
            "GET" => get(state, arguments).await,
            "SET" => set(state, arguments).await,
            "INCR" => incr(state, arguments).await,
            "RPUSH" => rpush(state, arguments).await,
            "LPUSH" => lpush(state, arguments).await,
            "LPOP" => lpop(state, arguments).await,
            "LLEN" => llen(state, arguments).await,
            "LRANGE" => lrange(state, arguments).await,
            "BLPOP" => blpop(state, session, arguments, in_transaction).await,
            "ZADD" => zadd(state, arguments).await,
            "ZRANK" => zrank(state, arguments).await,
            "ZRANGE" => zrange(state, arguments).await,
            "ZCARD" => zcard(state, arguments).await,
            "ZSCORE" => zscore(state, arguments).await,
            "ZREM" => zrem(state, arguments).await,
            "GEOADD" => geoadd(state, arguments).await,
            "GEOPOS" => geopos(state, arguments).await,
            "GEODIST" => geodist(state, arguments).await,
            "GEOSEARCH" => geosearch(state, arguments).await,
            "XADD" => xadd(state, arguments).await,
            "XRANGE" => xrange(state, arguments).await,
            "XREAD" => xread(state, session, arguments, in_transaction).await,
            "TYPE" => type_command(state, arguments).await,
            "KEYS" => keys(state, arguments).await,
            "CONFIG GET" => config_get(state, arguments),
            "INFO" => info(state, arguments).await,
            "SUBSCRIBE" => subscribe(state, session, arguments).await,
            "UNSUBSCRIBE" => unsubscribe(state, session, arguments).await,
            "PUBLISH" => publish(state, arguments).await,
            "AUTH" => auth(state, session, arguments).await,
            "ACL" => acl(state, session, arguments).await,
            "REPLCONF" => replconf(state, session, arguments).await,
            "PSYNC" => psync(state, session, arguments).await,
            "WAIT" => wait(state, arguments).await,
            _ => Err(CommandError::UnknownCommand(self.display_name())),
        }
    }
}

/// Runs one command for a session and turns its outcome into the reply to send, if any.
///
/// Command failures become RESP error replies; the connection stays usable.
pub async fn dispatch(
    state: &Arc<ServerState>,
    session: &mut ClientSession,
    handler: CommandHandler,
) -> Option<RespValue> {
    match handler.handle(state, session).await {
        Ok(CommandResult::Response(reply)) => Some(reply),
        Ok(CommandResult::NoResponse) => None,
        Err(error) => {
            debug!(client = session.id, command = %handler.name, "command failed: {error}");
            Some(error.to_resp())
        }
    }
}
