use crate::{
    commands::{command_error::CommandError, command_handler::CommandResult, replicated},
    key_value_store::{DataType, Value, now_ms},
    resp::RespValue,
    state::ServerState,
    types::stream::{RequestedId, Stream, StreamFields},
};

#[derive(Debug, PartialEq)]
pub struct XaddArguments {
    pub key: String,
    pub id: RequestedId,
    pub fields: StreamFields,
}

impl XaddArguments {
    /// Parses `key id field value [field value ...]`, where `id` is `ms-seq`, `ms-*`
    /// or `*`.
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.len() < 4 || arguments.len() % 2 != 0 {
            return Err(CommandError::WrongNumberOfArguments("xadd".into()));
        }

        let fields = arguments[2..]
            .chunks_exact(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect();

        Ok(Self {
            key: arguments[0].clone(),
            id: RequestedId::parse(&arguments[1])?,
            fields,
        })
    }
}

/// Handles the Redis XADD command.
///
/// Appends an entry and replies with its ID. A rejected ID leaves the keyspace
/// untouched, including not creating the stream. Replicas receive the concrete ID
/// rather than `*`, so both sides store the same entry. Every XREAD BLOCK reader on
/// the key is woken.
pub async fn xadd(state: &ServerState, arguments: Vec<String>) -> Result<CommandResult, CommandError> {
    let xadd_arguments = XaddArguments::parse(arguments)?;
    let now = now_ms();

    let mut db = state.db.lock().await;

    let id = match db.store.stream_mut(&xadd_arguments.key)? {
        Some(stream) => stream.append(xadd_arguments.id, xadd_arguments.fields.clone(), now)?,
        None => {
            let mut stream = Stream::new();
            let id = stream.append(xadd_arguments.id, xadd_arguments.fields.clone(), now)?;
            db.store.insert(
                xadd_arguments.key.clone(),
                Value::new(DataType::Stream(stream)),
            );
            id
        }
    };

    let mut forwarded = vec![xadd_arguments.key.clone(), id.to_string()];
    forwarded.extend(
        xadd_arguments
            .fields
            .into_iter()
            .flat_map(|(field, value)| [field, value]),
    );
    state.propagate(&db, &replicated("XADD", &forwarded)).await;

    db.blocking.notify_stream(&xadd_arguments.key);

    Ok(CommandResult::Response(RespValue::BulkString(id.to_string())))
}
