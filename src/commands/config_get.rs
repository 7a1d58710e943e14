use crate::{
    commands::{CommandError, CommandResult},
    resp::RespValue,
    state::ServerState,
};

pub struct ConfigGetArguments {
    pub parameters: Vec<String>,
}

impl ConfigGetArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.is_empty() {
            return Err(CommandError::WrongNumberOfArguments("config|get".into()));
        }

        Ok(ConfigGetArguments {
            parameters: arguments,
        })
    }
}

/// Replies with a flat `[name, value, ...]` array. Unknown parameters are left out.
pub fn config_get(state: &ServerState, arguments: Vec<String>) -> Result<CommandResult, CommandError> {
    let config_get_arguments = ConfigGetArguments::parse(arguments)?;
    let mut response = Vec::new();

    for parameter in config_get_arguments.parameters {
        let value = match parameter.to_lowercase().as_str() {
            "dir" => state.config.dir.to_string_lossy().into_owned(),
            "dbfilename" => state.config.dbfilename.clone(),
            "port" => state.config.port.to_string(),
            _ => continue,
        };

        response.push(RespValue::BulkString(parameter.to_lowercase()));
        response.push(RespValue::BulkString(value));
    }

    Ok(CommandResult::Response(RespValue::Array(response)))
}
