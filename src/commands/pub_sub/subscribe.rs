use crate::{
    client::ClientSession,
    commands::{CommandError, CommandResult, pub_sub::reply_per_channel},
    resp::RespValue,
    state::ServerState,
};

pub struct SubscribeArguments {
    pub channels: Vec<String>,
}

impl SubscribeArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.is_empty() {
            return Err(CommandError::WrongNumberOfArguments("subscribe".into()));
        }

        Ok(Self {
            channels: arguments,
        })
    }
}

/// Subscribes to each channel in turn, confirming every one with
/// `["subscribe", channel, subscription_count]`. Subscribing twice to the same channel
/// is harmless.
pub async fn subscribe(
    state: &ServerState,
    session: &mut ClientSession,
    arguments: Vec<String>,
) -> Result<CommandResult, CommandError> {
    let subscribe_arguments = SubscribeArguments::parse(arguments)?;

    let mut broker = state.pub_sub.lock().await;
    let mut replies = Vec::with_capacity(subscribe_arguments.channels.len());

    for channel in subscribe_arguments.channels {
        let count = broker.subscribe(session.id, &channel, session.outbound());
        session.subscriptions = count;

        replies.push(RespValue::Array(vec![
            RespValue::bulk("subscribe"),
            RespValue::BulkString(channel),
            RespValue::Integer(count as i64),
        ]));
    }

    Ok(reply_per_channel(session, replies))
}
