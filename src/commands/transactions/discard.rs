use crate::{
    client::ClientSession,
    commands::{CommandError, command_handler::CommandResult},
    resp::RespValue,
};

pub struct DiscardArguments;

impl DiscardArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if !arguments.is_empty() {
            return Err(CommandError::WrongNumberOfArguments("discard".into()));
        }

        Ok(Self)
    }
}

pub fn discard(session: &mut ClientSession, arguments: Vec<String>) -> Result<CommandResult, CommandError> {
    DiscardArguments::parse(arguments)?;

    if session.transaction.take().is_none() {
        return Err(CommandError::DiscardWithoutMulti);
    }

    Ok(CommandResult::Response(RespValue::ok()))
}
