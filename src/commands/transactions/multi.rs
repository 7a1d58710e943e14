use crate::{
    client::ClientSession,
    commands::{CommandError, command_handler::CommandResult},
    resp::RespValue,
};

pub struct MultiArguments;

impl MultiArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if !arguments.is_empty() {
            return Err(CommandError::WrongNumberOfArguments("multi".into()));
        }

        Ok(Self)
    }
}

/// Starts queueing: every following command except EXEC and DISCARD is checked and
/// stored instead of run.
pub fn multi(session: &mut ClientSession, arguments: Vec<String>) -> Result<CommandResult, CommandError> {
    MultiArguments::parse(arguments)?;

    if session.in_transaction() {
        return Err(CommandError::NestedMulti);
    }

    session.transaction = Some(Vec::new());

    Ok(CommandResult::Response(RespValue::ok()))
}
