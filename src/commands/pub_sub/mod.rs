mod ping;
mod publish;
mod subscribe;
mod unsubscribe;

pub use ping::subscribed_ping;
pub use publish::{PublishArguments, publish};
pub use subscribe::{SubscribeArguments, subscribe};
pub use unsubscribe::{UnsubscribeArguments, unsubscribe};

use crate::{client::ClientSession, commands::CommandResult, resp::RespValue};

/// SUBSCRIBE and UNSUBSCRIBE confirm each channel with its own frame. All but the last
/// go straight onto the connection's queue and the last one is the command's reply.
fn reply_per_channel(session: &ClientSession, mut replies: Vec<RespValue>) -> CommandResult {
    let last = replies.pop();

    for reply in &replies {
        session.send(reply);
    }

    match last {
        Some(reply) => CommandResult::Response(reply),
        None => CommandResult::NoResponse,
    }
}
