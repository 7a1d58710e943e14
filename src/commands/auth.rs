use crate::{
    auth::DEFAULT_USER,
    client::ClientSession,
    commands::{CommandError, CommandResult},
    resp::RespValue,
    state::ServerState,
};

pub struct AuthArguments {
    pub username: String,
    pub password: String,
}

impl AuthArguments {
    /// Parses `[username] password`; a lone password authenticates as `default`.
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        match <[String; 2]>::try_from(arguments) {
            Ok([username, password]) => Ok(Self { username, password }),
            Err(arguments) => match <[String; 1]>::try_from(arguments) {
                Ok([password]) => Ok(Self {
                    username: DEFAULT_USER.to_string(),
                    password,
                }),
                Err(_) => Err(CommandError::WrongNumberOfArguments("auth".into())),
            },
        }
    }
}

pub async fn auth(
    state: &ServerState,
    session: &mut ClientSession,
    arguments: Vec<String>,
) -> Result<CommandResult, CommandError> {
    let auth_arguments = AuthArguments::parse(arguments)?;

    let accepted = state
        .users
        .lock()
        .await
        .authenticate(&auth_arguments.username, &auth_arguments.password);

    if !accepted {
        return Err(CommandError::WrongPass);
    }

    session.authenticated = true;
    session.user = auth_arguments.username;

    Ok(CommandResult::Response(RespValue::ok()))
}
