use std::sync::Arc;

use crate::{
    client::ClientSession,
    commands::{CommandError, command_handler::CommandResult},
    resp::RespValue,
    state::ServerState,
};

pub struct ExecArguments;

impl ExecArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if !arguments.is_empty() {
            return Err(CommandError::WrongNumberOfArguments("exec".into()));
        }

        Ok(Self)
    }
}

/// Runs the queued commands in order and replies with one array holding each reply.
///
/// A command that fails contributes its error reply to the array; the commands after it
/// still run. Other clients may interleave between queued commands.
pub async fn exec(
    state: &Arc<ServerState>,
    session: &mut ClientSession,
    arguments: Vec<String>,
) -> Result<CommandResult, CommandError> {
    ExecArguments::parse(arguments)?;

    let Some(queued) = session.transaction.take() else {
        return Err(CommandError::ExecWithoutMulti);
    };

    let mut replies = Vec::with_capacity(queued.len());

    for handler in queued {
        match handler.execute(state, session, true).await {
            Ok(CommandResult::Response(reply)) => replies.push(reply),
            Ok(CommandResult::NoResponse) => {}
            Err(error) => replies.push(error.to_resp()),
        }
    }

    Ok(CommandResult::Response(RespValue::Array(replies)))
}
