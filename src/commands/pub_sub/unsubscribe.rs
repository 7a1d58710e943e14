use crate::{
    client::ClientSession,
    commands::{CommandError, CommandResult, pub_sub::reply_per_channel},
    resp::RespValue,
    state::ServerState,
};

pub struct UnsubscribeArguments {
    /// Empty means every channel the client is subscribed to.
    pub channels: Vec<String>,
}

impl UnsubscribeArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        Ok(Self {
            channels: arguments,
        })
    }
}

pub async fn unsubscribe(
    state: &ServerState,
    session: &mut ClientSession,
    arguments: Vec<String>,
) -> Result<CommandResult, CommandError> {
    let unsubscribe_arguments = UnsubscribeArguments::parse(arguments)?;

    let mut broker = state.pub_sub.lock().await;

    let channels = if unsubscribe_arguments.channels.is_empty() {
        broker.channels_of(session.id)
    } else {
        unsubscribe_arguments.channels
    };

    if channels.is_empty() {
        return Ok(CommandResult::Response(RespValue::Array(vec![
            RespValue::bulk("unsubscribe"),
            RespValue::Null,
            RespValue::Integer(0),
        ])));
    }

    let mut replies = Vec::with_capacity(channels.len());

    for channel in channels {
        let remaining = broker.unsubscribe(session.id, &channel);
        session.subscriptions = remaining;

        replies.push(RespValue::Array(vec![
            RespValue::bulk("unsubscribe"),
            RespValue::BulkString(channel),
            RespValue::Integer(remaining as i64),
        ]));
    }

    Ok(reply_per_channel(session, replies))
}
